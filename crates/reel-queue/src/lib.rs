//! Sequential batch queue for vertical reel conversion.
//!
//! A [`BatchQueue`] is edited freely while idle. [`BatchQueue::start`] moves
//! it onto a background worker that converts every pending job in order,
//! reporting through [`QueueEvent`]s and job-list snapshots. The queue comes
//! back from [`BatchRun::wait`] together with a [`BatchSummary`].

pub mod error;
pub mod events;
pub mod logging;
pub mod metrics;
pub mod queue;
mod worker;

pub use error::{QueueError, QueueResult, StartError};
pub use events::{BatchSummary, EventSender, QueueEvent, DEFAULT_EVENT_CAPACITY};
pub use logging::JobLogger;
pub use queue::{BatchQueue, BatchRun, BatchSettings};
