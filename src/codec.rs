//! Line-oriented text persistence for [`WeightedBag`].
//!
//! Two record layouts are supported:
//!
//! - [`RecordFormat::Lines`]: the key on one line, its weight on the next, and a
//!   blank line after the last record. Several bags can be written to the same
//!   stream and read back one `read` call at a time.
//! - [`RecordFormat::Delimited`]: `<key><delim><weight>` per line, terminated by
//!   the end of the stream. Every line must be a record, blank ones included.
//!
//! Weights are always base-10 `u64`. Keys are written with `Display` and parsed
//! back by a caller-supplied function.

use std::collections::hash_map::Entry;
use std::fmt::Display;
use std::hash::Hash;
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{debug, trace, warn};

use crate::bag::{Weight, WeightedBag};
use crate::error::{BagError, KeyParseError};

/// Records rendered in memory before being handed to the writer.
pub const RECORDS_PER_BATCH: usize = 1000;

/// On-stream layout of a bag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordFormat {
    /// `<key>\n<weight>\n` per record, then `\n`.
    #[default]
    Lines,
    /// `<key><delim><weight>\n` per record.
    Delimited(char),
}

impl RecordFormat {
    fn validate(self) -> Result<(), BagError> {
        match self {
            Self::Delimited(d @ ('\n' | '\r')) => Err(BagError::InvalidDelimiter(d)),
            _ => Ok(()),
        }
    }

    fn check_key(self, key: &str) -> Result<(), BagError> {
        let reason = if key.contains(['\n', '\r']) {
            Some("contains a line break")
        } else {
            match self {
                Self::Lines if key.is_empty() => Some("empty keys read back as the terminator"),
                Self::Delimited(d) if key.contains(d) => Some("contains the delimiter"),
                _ => None,
            }
        };

        match reason {
            Some(reason) => Err(BagError::UnencodableKey {
                key: key.to_owned(),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn encode(self, key: &str, weight: Weight, out: &mut String) {
        out.push_str(key);
        match self {
            Self::Lines => out.push('\n'),
            Self::Delimited(d) => out.push(d),
        }
        out.push_str(&weight.to_string());
        out.push('\n');
    }
}

impl<T: Display> WeightedBag<T> {
    /// Write every `(item, weight)` record to `writer`.
    ///
    /// Records go out in batches of [`RECORDS_PER_BATCH`]; the writer is flushed
    /// before this returns `Ok`.
    pub async fn write<W>(&self, writer: &mut W, format: RecordFormat) -> Result<(), BagError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        format.validate()?;

        let mut batch = String::new();
        let mut pending = 0usize;
        let mut records = 0usize;

        for (item, weight) in self.entries() {
            let key = item.to_string();
            format.check_key(&key)?;
            format.encode(&key, weight, &mut batch);
            pending += 1;
            records += 1;

            if pending == RECORDS_PER_BATCH {
                writer.write_all(batch.as_bytes()).await?;
                trace!(records = pending, "wrote record batch");
                batch.clear();
                pending = 0;
            }
        }

        if format == RecordFormat::Lines {
            batch.push('\n');
        }
        writer.write_all(batch.as_bytes()).await?;
        writer.flush().await?;

        debug!(records, total = self.count_contents(), ?format, "wrote bag");
        Ok(())
    }
}

impl<T: Eq + Hash> WeightedBag<T> {
    /// Read one bag's worth of records from `reader` into this bag.
    ///
    /// Stops after the terminator, leaving anything that follows unread, so
    /// consecutive calls on the same reader parse consecutive bags. A key that
    /// is already in the bag is an error; weights are never merged.
    ///
    /// On error the bag keeps whatever records were accepted before the
    /// failure and should not be relied upon.
    pub async fn read<R, F, E>(
        &mut self,
        reader: &mut R,
        format: RecordFormat,
        mut parse_key: F,
    ) -> Result<(), BagError>
    where
        R: AsyncBufRead + Unpin + ?Sized,
        F: FnMut(&str) -> Result<T, E>,
        E: Into<KeyParseError>,
    {
        format.validate()?;

        let mut lines = LineReader::new(&mut *reader);
        let mut total = self.count_contents();
        let mut records = 0usize;

        while let Some(first) = lines.next_line().await? {
            // Only the two-line layout has a terminator; in the delimited one a
            // blank line fails to split below.
            if first.is_empty() && format == RecordFormat::Lines {
                break;
            }
            let line = lines.number();

            let (key, value) = match format {
                RecordFormat::Lines => match lines.next_line().await? {
                    Some(value) => (first, value),
                    None => return Err(BagError::MissingValue { line, key: first }),
                },
                RecordFormat::Delimited(d) => split_record(first, d, line)?,
            };

            let weight: Weight = value.parse().map_err(|_| BagError::InvalidWeight {
                line: lines.number(),
                value: value.clone(),
            })?;

            let item = parse_key(&key).map_err(|source| BagError::KeyParse {
                line,
                key: key.clone(),
                source: source.into(),
            })?;

            let next_total = total
                .checked_add(weight)
                .ok_or(BagError::WeightOverflow { line })?;

            match self.map_mut().entry(item) {
                Entry::Occupied(existing) => {
                    warn!(line, key = %key, existing = *existing.get(), weight, "duplicate key in bag stream");
                    return Err(BagError::DuplicateKey { line, key });
                }
                Entry::Vacant(slot) => {
                    slot.insert(weight);
                }
            }

            total = next_total;
            self.set_total(total);
            records += 1;
        }

        debug!(records, total, ?format, "read bag");
        Ok(())
    }

    /// Read a single bag from `reader` into a new bag.
    pub async fn read_from<R, F, E>(
        reader: &mut R,
        format: RecordFormat,
        parse_key: F,
    ) -> Result<Self, BagError>
    where
        R: AsyncBufRead + Unpin + ?Sized,
        F: FnMut(&str) -> Result<T, E>,
        E: Into<KeyParseError>,
    {
        let mut bag = Self::new();
        bag.read(reader, format, parse_key).await?;
        Ok(bag)
    }
}

fn split_record(record: String, delim: char, line: usize) -> Result<(String, String), BagError> {
    if let Some((key, value)) = record.split_once(delim) {
        if !value.contains(delim) {
            return Ok((key.to_owned(), value.to_owned()));
        }
    }
    Err(BagError::MalformedRecord { line, record })
}

/// Line-numbering wrapper over [`Lines`].
///
/// `Lines` reads no further than the line it returns, so the wrapped reader
/// can be handed to the next `read` call afterwards.
struct LineReader<R> {
    lines: Lines<R>,
    number: usize,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            number: 0,
        }
    }

    /// Number of the line most recently returned.
    fn number(&self) -> usize {
        self.number
    }

    /// Next line without its `\n` / `\r\n` ending, or `None` at end of stream.
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        let line = self.lines.next_line().await?;
        if line.is_some() {
            self.number += 1;
        }
        Ok(line)
    }
}
