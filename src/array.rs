//! # Persistent Array
//!
//! A fixed-stride sequence of values overlaid on a mapped file of exactly
//! `len * stride` bytes. The open protocol is where the crate earns its
//! keep: the carried prefix reported by the storage layer tells the array
//! how many *whole elements* already hold live data, and only the elements
//! beyond that point are seeded. Growing an array across runs therefore
//! leaves every previously-live element byte-for-byte untouched.
//!
//! ## Torn Files
//!
//! A carried length that is not an exact multiple of the stride means the
//! file was cut mid-element (a crash during a previous extension, or an
//! unrelated tool rewrote the file). Both open modes reject such a file
//! outright rather than guessing which bytes of the torn element to trust.
//!
//! ## Partial Seeding
//!
//! Seeding runs in ascending index order with no progress marker on disk.
//! The file reaches its full length before the first element is seeded, so
//! a crash mid-seeding makes the next open treat the zero-filled remainder
//! as carried data. The format has no header to record more (the file is
//! the raw element layout and nothing else); callers who need to detect
//! that case must make "all zeroes" invalid in their own record type.

use std::any::type_name;
use std::marker::PhantomData;
use std::path::Path;

use eyre::{ensure, Result};
use tracing::debug;
use zerocopy::FromBytes;
use zerocopy::IntoBytes;

use crate::record::Record;
use crate::storage::Region;

/// `len` contiguous `T` persisted in a mapped file.
///
/// Not clonable; movable; unmaps on drop without altering the file.
#[derive(Debug)]
pub struct PersistentArray<T: Record> {
    region: Region,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Record> PersistentArray<T> {
    /// Opens (creating or growing if needed) an array of exactly `len`
    /// elements at `path`.
    ///
    /// Elements carried over from a previous run keep their values; every
    /// element past the carried prefix is seeded with a copy of `fill`, in
    /// ascending index order. Fails if the carried prefix ends mid-element.
    pub fn open<P: AsRef<Path>>(path: P, len: usize, fill: T) -> Result<Self> {
        ensure!(
            T::STRIDE > 0,
            "cannot persist zero-sized type {}",
            type_name::<T>()
        );
        let byte_len = len.checked_mul(T::STRIDE).ok_or_else(|| {
            eyre::eyre!(
                "array of {} x {}-byte {} overflows",
                len,
                T::STRIDE,
                type_name::<T>()
            )
        })?;

        let mut region = Region::open(path, byte_len as u64)?;

        let carried = region.carried_len();
        ensure!(
            carried % T::STRIDE == 0,
            "'{}' carries {} bytes, which ends mid-element (stride {}); the file is torn",
            region.path().display(),
            carried,
            T::STRIDE
        );

        if carried < byte_len {
            debug!(
                path = %region.path().display(),
                first = carried / T::STRIDE,
                len,
                "seeding array suffix"
            );
            for slot in region.as_bytes_mut()[carried..].chunks_exact_mut(T::STRIDE) {
                slot.copy_from_slice(fill.as_bytes());
            }
        }

        Ok(Self {
            region,
            len,
            _marker: PhantomData,
        })
    }

    /// Opens an existing array by path alone, deriving the element count
    /// from the file length. Nothing is seeded: the whole file is taken as
    /// already live. Fails if the length is not a multiple of the stride.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        ensure!(
            T::STRIDE > 0,
            "cannot persist zero-sized type {}",
            type_name::<T>()
        );

        let region = Region::discover(path)?;

        ensure!(
            region.len() % T::STRIDE == 0,
            "'{}' holds {} bytes, not a whole number of {}-byte elements",
            region.path().display(),
            region.len(),
            T::STRIDE
        );

        Ok(Self {
            len: region.len() / T::STRIDE,
            region,
            _marker: PhantomData,
        })
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The element at `index`.
    pub fn get(&self, index: usize) -> Result<&T> {
        ensure!(
            index < self.len,
            "index {} out of bounds (len={})",
            index,
            self.len
        );

        let start = index * T::STRIDE;
        T::ref_from_bytes(&self.region.as_bytes()[start..start + T::STRIDE])
            .map_err(|e| eyre::eyre!("failed to overlay {}: {:?}", type_name::<T>(), e))
    }

    /// The element at `index`, writable in place.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        ensure!(
            index < self.len,
            "index {} out of bounds (len={})",
            index,
            self.len
        );

        let start = index * T::STRIDE;
        T::mut_from_bytes(&mut self.region.as_bytes_mut()[start..start + T::STRIDE])
            .map_err(|e| eyre::eyre!("failed to overlay {}: {:?}", type_name::<T>(), e))
    }

    /// All live elements as one slice; iterate this for forward traversal.
    pub fn as_slice(&self) -> Result<&[T]> {
        <[T]>::ref_from_bytes(self.region.as_bytes())
            .map_err(|e| eyre::eyre!("failed to overlay [{}]: {:?}", type_name::<T>(), e))
    }

    /// All live elements as one writable slice.
    pub fn as_mut_slice(&mut self) -> Result<&mut [T]> {
        <[T]>::mut_from_bytes(self.region.as_bytes_mut())
            .map_err(|e| eyre::eyre!("failed to overlay [{}]: {:?}", type_name::<T>(), e))
    }

    pub fn path(&self) -> &Path {
        self.region.path()
    }
}
