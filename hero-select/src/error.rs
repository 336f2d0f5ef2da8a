//! Error types for hero-select
//!
//! Data-quality anomalies are not errors: they are recovered locally and
//! counted in `AnomalyCounts`. The variants here are the fatal outcomes —
//! a run that hits one produces no outputs at all.

use thiserror::Error;

/// Engine error type
#[derive(Debug, Error)]
pub enum SelectError {
    /// Selection came out with two winners for one hotel. Downstream CDC
    /// correctness depends on selection being a function of hotel_id, so
    /// this aborts the run instead of emitting an inconsistent output.
    #[error("duplicate hotel_id {0} in selection output")]
    DuplicateHotel(String),

    /// Too many image records were dropped for missing join keys.
    #[error("dropped {dropped} of {seen} image records, over the {max_rate} drop-rate limit")]
    DropRateExceeded {
        dropped: u64,
        seen: u64,
        max_rate: f64,
    },

    /// Shared boundary error (I/O, config, serialization)
    #[error("Common error: {0}")]
    Common(#[from] hero_common::Error),
}

/// Result type for engine operations
pub type SelectResult<T> = Result<T, SelectError>;
