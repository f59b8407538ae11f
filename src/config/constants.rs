//! # Configuration Constants
//!
//! Centralizes the crate's configuration values. Constants that other
//! modules depend on live here rather than next to their use sites, and
//! their invariants are enforced through compile-time assertions.
//!
//! ## Usage
//!
//! Import constants from this module rather than defining them locally:
//!
//! ```ignore
//! use crate::config::{NEW_FILE_MODE, ZERO_FILL_CHUNK};
//! ```

/// Permission bits for newly created backing files (owner read/write only).
///
/// Pre-existing files are reused with their permissions unchanged; this
/// mode applies only on the exclusive-creation path.
pub const NEW_FILE_MODE: u32 = 0o600;

/// Chunk size used when extending a backing file by writing zeroes.
///
/// Extension is performed with writes rather than truncation so that the
/// added bytes are physically realized before they are mapped. Larger
/// chunks mean fewer write syscalls per extension at the cost of a larger
/// transient buffer.
pub const ZERO_FILL_CHUNK: usize = 64 * 1024;

const _: () = assert!(ZERO_FILL_CHUNK > 0, "extension must make progress");

const _: () = assert!(
    NEW_FILE_MODE & 0o077 == 0,
    "fresh backing files must be owner-only"
);
