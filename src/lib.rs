//! `fukuro`: a weighted draw bag.
//!
//! A [`WeightedBag`] counts how often each item was added and draws items with
//! probability proportional to those counts. Bags can be written to and read
//! back from any async text stream.
//!
//! Exposed modules:
//! - `bag`: the bag itself and cumulative-weight sampling.
//! - `codec`: line-oriented persistence (`write` / `read`).
//! - `queue`: a small FIFO queue with amortized O(1) dequeue.
//! - `error`: codec errors.

#![forbid(unsafe_code)]

pub mod bag;
pub mod codec;
pub mod error;
pub mod queue;

pub use bag::{Weight, WeightedBag};
pub use codec::{RecordFormat, RECORDS_PER_BATCH};
pub use error::{BagError, KeyParseError, WeightOverflow};
pub use queue::{Queue, QueueError};
