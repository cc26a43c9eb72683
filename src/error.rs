//! Errors raised while persisting or restoring a bag.

use std::io;

/// Boxed error returned by a caller's key parser.
pub type KeyParseError = Box<dyn std::error::Error + Send + Sync>;

/// A bag's total weight would exceed `u64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("total weight overflows u64")]
pub struct WeightOverflow;

/// Errors for [`WeightedBag::write`](crate::WeightedBag::write) and
/// [`WeightedBag::read`](crate::WeightedBag::read).
///
/// Line numbers are 1-based and count from the first line consumed by the
/// current `read` call.
#[derive(Debug, thiserror::Error)]
pub enum BagError {
    /// The underlying stream failed.
    #[error("stream error: {0}")]
    Io(#[from] io::Error),

    /// A key line was the last line of the stream.
    #[error("line {line}: key {key:?} has no value line")]
    MissingValue { line: usize, key: String },

    /// A delimited line was not exactly `<key><delim><weight>`.
    #[error("line {line}: malformed record {record:?}")]
    MalformedRecord { line: usize, record: String },

    /// The weight text was not a base-10 `u64`.
    #[error("line {line}: invalid weight {value:?}")]
    InvalidWeight { line: usize, value: String },

    /// The key was already present in the bag being populated.
    #[error("line {line}: key {key:?} already present in bag")]
    DuplicateKey { line: usize, key: String },

    /// The caller's key parser rejected the key text.
    #[error("line {line}: failed to parse key {key:?}: {source}")]
    KeyParse {
        line: usize,
        key: String,
        #[source]
        source: KeyParseError,
    },

    /// Sum of weights exceeds `u64::MAX`.
    #[error("line {line}: total weight overflows u64")]
    WeightOverflow { line: usize },

    /// The key's text form would not survive a round trip.
    #[error("key {key:?} cannot be written: {reason}")]
    UnencodableKey { key: String, reason: &'static str },

    /// Line breaks cannot separate a key from its weight.
    #[error("delimiter {0:?} is a line break")]
    InvalidDelimiter(char),
}

impl BagError {
    /// True for errors caused by the stream contents rather than I/O or the caller.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::MissingValue { .. } | Self::MalformedRecord { .. } | Self::InvalidWeight { .. }
        )
    }
}
