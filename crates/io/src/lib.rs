// File I/O operations around the incident engine

pub mod cache;
pub mod error;
pub mod export;
pub mod snapshot;
pub mod workbook;

pub use cache::{LoadOptions, TableCache};
pub use error::LoadError;

/// Snapshot format version, embedded in the snapshot envelope.
/// Increment when the canonical schema changes in a way old snapshots can't satisfy.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;
