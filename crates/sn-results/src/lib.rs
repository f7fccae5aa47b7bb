//! sn-results: result emission.
//!
//! - per-element CSV streams (velocity, head, pressure, friction, gas
//!   fraction) fed from transient samples
//! - end-of-run human-readable summary
//! - machine-readable run manifest

pub mod csv;
pub mod error;
pub mod manifest;
pub mod summary;

pub use csv::CsvEmitter;
pub use error::{ResultsError, ResultsResult};
pub use manifest::{RunKind, RunManifest, compute_run_id};
pub use summary::write_summary;
