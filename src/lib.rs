//! Crypto market analytics: turns raw funding, listing and exchange-parity
//! rows from a third-party API into dashboard payloads.

pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod source;
pub mod transform;

pub use error::{RadarError, Result};
