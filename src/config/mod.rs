//! # Configuration Module
//!
//! Centralizes configuration constants for the crate. Values are grouped
//! here so interdependent settings stay co-located and their invariants
//! can be checked at compile time.
//!
//! - [`constants`]: numeric configuration values with invariant assertions

pub mod constants;
pub use constants::*;
