//! `fleetlens-engine`: incident reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded raw rows, returns the canonical
//! incident table and projections. No file or network IO.

pub mod classify;
pub mod config;
pub mod dates;
pub mod error;
pub mod extract;
pub mod filter;
pub mod link;
pub mod materialize;
pub mod model;
pub mod pareto;
pub mod schema;

pub use config::EngineConfig;
pub use error::EngineError;
pub use materialize::materialize;
pub use model::{IncidentRecord, IncidentTable, RawTable, RawValue};
