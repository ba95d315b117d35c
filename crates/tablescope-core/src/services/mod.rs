//! Services orchestrating reads, writes, and background store I/O.

pub mod jobs;
pub mod read;
pub mod write;

pub use jobs::{JobHandle, JobRunner};
pub use read::{ReadError, TableReadService};
pub use write::{BulkWriteOutcome, TableWriteService, WriteError};
