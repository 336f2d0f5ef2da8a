//! hero-select library interface
//!
//! Batch engine that picks one main (hero) display image per hotel from a
//! pool of candidates, diffs the result against the previous assignment,
//! and reports run metrics.
//!
//! Stage order: assembler -> scoring -> selector -> {cdc, snapshot, metrics}.
//! The last three are independent consumers of the selector output.

pub mod assembler;
pub mod cdc;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod scoring;
pub mod selector;
pub mod snapshot;
pub mod types;

pub use crate::error::{SelectError, SelectResult};
pub use crate::pipeline::{run, RunInputs, RunOutput};
