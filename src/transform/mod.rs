//! Pure, synchronous reshaping of raw API rows into dashboard payloads.
//!
//! Nothing here fails: malformed values fall back to defaults (0, today,
//! empty text) and the fallback is surfaced on the output where it matters.

pub mod funding;
pub mod listings;
pub mod parity;
pub mod parsers;

pub use funding::{aggregate_funding, build_funding_dashboard, normalize_funding};
pub use listings::{build_listings_dashboard, dedupe_listings};
pub use parity::{build_parity_dashboard, comparison_match, missing_from_any};
