//! # Record Contract
//!
//! The fixed-width byte contract that lets a mapped region be read as typed
//! values without pointer casts. A [`Record`] is any sized type for which
//! zerocopy can prove both directions of the reinterpretation:
//!
//! - `FromBytes`: every byte pattern of the right length is a valid value,
//!   so bytes inherited from a previous run (or zeroes from a fresh file
//!   extension) can be overlaid without inspection;
//! - `IntoBytes` + `Immutable`: the value has no padding or interior
//!   mutability that could leak or tear when its bytes are written to the
//!   shared mapping;
//! - `KnownLayout`: the layout is known well enough to check size and
//!   alignment at the conversion site.
//!
//! Mappings are page-aligned and a Rust type's size is always a multiple of
//! its alignment, so elements laid out at stride `size_of::<T>()` stay
//! aligned; the fallible zerocopy conversions are the entire
//! reinterpretation surface of the crate.
//!
//! The file holds the literal in-memory layout of the record: no header, no
//! byte-order normalization. Callers who want a defined on-disk byte order
//! can build records from `zerocopy::little_endian` field types; the
//! contract itself does not impose one.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// A fixed-layout value that may live directly in a mapped region.
///
/// Blanket-implemented for every qualifying type; deriving the four
/// zerocopy traits is all a caller needs:
///
/// ```ignore
/// use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
///
/// #[repr(C)]
/// #[derive(FromBytes, IntoBytes, Immutable, KnownLayout)]
/// struct Checkpoint {
///     generation: u64,
///     cursor: u64,
/// }
/// ```
pub trait Record: FromBytes + IntoBytes + KnownLayout + Immutable + Sized {
    /// Distance in bytes between consecutive elements of this type.
    const STRIDE: usize = size_of::<Self>();
}

impl<T> Record for T where T: FromBytes + IntoBytes + KnownLayout + Immutable {}
