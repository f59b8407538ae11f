//! # Storage Module
//!
//! The foundational layer of the crate: opening and sizing the on-disk
//! persistence file, and overlaying it into the process address space.
//!
//! ## Layering
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  PersistentValue<T> / PersistentArray│   typed overlays (crate root)
//! ├──────────────────────────────────────┤
//! │  Region / FixedRegion                │   RAII shared mappings
//! ├──────────────────────────────────────┤
//! │  BackingFile                         │   open / create / zero-extend
//! └──────────────────────────────────────┘
//! ```
//!
//! The key piece of state flowing up this stack is the **carried length**:
//! how many leading bytes of the file already held live data when it was
//! opened. `BackingFile` computes it, `Region` reports it, and the typed
//! overlays use it to decide which suffix still needs seeding.

mod backing;
mod region;

pub use backing::{BackingFile, Sizing};
pub use region::{FixedRegion, Region};
