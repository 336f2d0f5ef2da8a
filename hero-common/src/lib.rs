//! # Hero Common Library
//!
//! Shared code for the hero-image selection pipeline:
//! - Record model (input and output shapes for all three streams each way)
//! - Common error types
//! - Line-delimited JSON reading/writing
//! - Configuration file loading

pub mod config;
pub mod error;
pub mod jsonl;
pub mod records;

pub use error::{Error, Result};
