//! Text extraction and filtering for search-result entries.
//!
//! Every function here is pure: the caller supplies "now" where the result
//! depends on the wall clock, so the pipeline resolves all dates of an entry
//! against the same instant.
//!
//! # Submodules
//!
//! - [`date`]: relative (`3 hours ago`) and absolute (`March 5, 2024`) date tokens
//! - [`description`]: splits the date fragment out of a result's description text
//! - [`signals`]: keyword occurrence counting and monetary amount detection
//! - [`recency`]: the trailing N-month window (30 days per month)

pub mod date;
pub mod description;
pub mod recency;
pub mod signals;
