//! Command-line front ends for vertical reel conversion.
//!
//! - `reel`: convert one file, reporting on a line protocol
//! - `reel-batch`: convert many files through the batch queue

pub mod batch;
pub mod config;
pub mod logging;
pub mod single;

pub use batch::{describe_event, run_batch, BatchArgs, Stream};
pub use config::ReelConfig;
pub use logging::init_tracing;
pub use single::{progress_line, run_single, SingleArgs};
