//! # permap - Crash-Surviving Values on Memory-Mapped Files
//!
//! permap persists fixed-layout values by overlaying them directly onto
//! memory-mapped files: a single value ([`PersistentValue`]) and a
//! fixed-stride sequence ([`PersistentArray`]). Writes land in the shared
//! mapping immediately and outlive the process; reopening the same path
//! picks the data back up exactly as it was left.
//!
//! The core of the crate is the initialization-tracking open protocol. An
//! open must answer one question correctly: *how much of this file already
//! holds live data from a previous run?* That carried prefix is never
//! touched again - the file is grown underneath it with zero-writes, the
//! mapping is laid over it, and only the genuinely new suffix is seeded
//! with the caller's initial value. Seeding therefore happens at most once
//! per byte range across the entire history of a file, and teardown never
//! destroys anything: dropping a handle unmaps and stops.
//!
//! ## Quick Start
//!
//! ```ignore
//! use permap::{PersistentArray, PersistentValue};
//! use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
//!
//! #[repr(C)]
//! #[derive(FromBytes, IntoBytes, Immutable, KnownLayout)]
//! struct Checkpoint {
//!     generation: u64,
//!     cursor: u64,
//! }
//!
//! // First run seeds the file; every later run ignores the seed and
//! // resumes from whatever the previous run left behind.
//! let mut ckpt = PersistentValue::open(
//!     "app.ckpt",
//!     Checkpoint { generation: 0, cursor: 0 },
//! )?;
//! ckpt.get_mut()?.cursor += 1;
//!
//! // Growing an array preserves existing elements byte-for-byte and
//! // seeds only the new tail.
//! let slots = PersistentArray::open("slots.bin", 1024, 0u64)?;
//! assert_eq!(slots.len(), 1024);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  PersistentValue<T>  PersistentArray<T> │  typed overlays
//! ├─────────────────────────────────────────┤
//! │  Record contract (zerocopy bounds)      │  bytes <-> values
//! ├─────────────────────────────────────────┤
//! │  Region / FixedRegion (memmap2)         │  RAII shared mappings
//! ├─────────────────────────────────────────┤
//! │  BackingFile (open / zero-extend)       │  carried-length protocol
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## File Format
//!
//! A value's file is exactly `size_of::<T>()` bytes; an array's is exactly
//! `len * size_of::<T>()`. No header, no magic, no version: the bytes are
//! the literal in-memory layout of the record, which ties a file to the
//! build that wrote it (matching size, alignment, and byte order). That is
//! the accepted trade for process-local persistence; it is not a wire
//! format. A file whose length ends mid-element is rejected as torn rather
//! than silently rounded down.
//!
//! ## Concurrency and Durability
//!
//! Fully synchronous and single-threaded by contract. The mapping is a
//! shared OS resource: this crate adds no locking, in-process or cross-
//! process, and two processes opening the same new path can race on
//! creation and seeding. Durability is opportunistic - the OS writes dirty
//! pages back on its own schedule. Callers needing stronger guarantees
//! must layer them on top.
//!
//! ## Module Overview
//!
//! - [`storage`]: backing file and mapped regions (the carried-length
//!   protocol lives here)
//! - [`record`]: the fixed-width byte contract a persisted type must meet
//! - [`value`]: single persisted value
//! - [`array`]: persisted fixed-stride sequence
//! - [`config`]: file-mode and extension constants

pub mod array;
pub mod config;
pub mod record;
pub mod storage;
pub mod value;

pub use array::PersistentArray;
pub use record::Record;
pub use storage::{BackingFile, FixedRegion, Region, Sizing};
pub use value::PersistentValue;
