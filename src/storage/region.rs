//! # Mapped Regions
//!
//! This module implements the crate's RAII mapping owners: [`Region`] for
//! sizes known at run time and [`FixedRegion`] for sizes known at compile
//! time. A region maps the leading bytes of a backing file read-write and
//! *shared*, so writes land in the file's page cache immediately and are
//! persisted by the OS on its own schedule.
//!
//! ## Safety Model
//!
//! Mapping a file that another process may mutate is the classic mmap
//! hazard, and `memmap2::MmapMut::map_mut` is `unsafe` for that reason.
//! This crate confines that single `unsafe` call here; everything above it
//! sees the region as a plain `&[u8]` / `&mut [u8]` and reinterprets bytes
//! only through the zerocopy-based [`Record`](crate::record::Record)
//! contract. A region's length is fixed at open and never remapped, so a
//! slice borrowed from it stays valid for the borrow's lifetime under the
//! usual borrow rules.
//!
//! ## Lifetime and Teardown
//!
//! The backing descriptor is dropped as soon as the map succeeds; the
//! mapping is independent of it. Drop unmaps and nothing else: bytes on
//! disk are never written, truncated, or zeroed on teardown, which is what
//! lets the next open of the same path carry the data forward.
//!
//! A zero-length region holds no OS mapping at all (the mmap syscall
//! rejects empty ranges) and exposes empty slices.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use memmap2::{MmapMut, MmapOptions};
use tracing::trace;

use super::backing::{BackingFile, Sizing};

/// A read-write shared mapping of the leading bytes of a backing file.
///
/// Exclusively owns the mapping: not clonable, movable, unmapped on drop.
#[derive(Debug)]
pub struct Region {
    map: Option<MmapMut>,
    path: PathBuf,
    carried: usize,
}

impl Region {
    /// Opens `path` sized to exactly `len` bytes, creating or growing the
    /// backing file as needed. Bytes already present keep their values and
    /// are reported through [`carried_len`](Self::carried_len).
    pub fn open<P: AsRef<Path>>(path: P, len: u64) -> Result<Self> {
        Self::map_backing(BackingFile::open(path, Sizing::Exact(len))?)
    }

    /// Opens an existing file, adopting its current length as both the
    /// mapped length and the carried length.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::map_backing(BackingFile::open(path, Sizing::Discover)?)
    }

    fn map_backing(backing: BackingFile) -> Result<Self> {
        let len = usize::try_from(backing.len()).wrap_err_with(|| {
            format!(
                "backing file '{}' is larger than the address space",
                backing.path().display()
            )
        })?;
        let carried = backing.carried_len() as usize;

        let map = if len == 0 {
            None
        } else {
            // SAFETY: MmapMut::map_mut is unsafe because another process can
            // mutate the mapped file underneath us. This crate's contract
            // explicitly leaves cross-process coordination to the caller:
            // the mapping is plain bytes, every typed view goes through
            // zerocopy (any byte pattern is a valid value), and the region
            // is never remapped, so no Rust-side invariant depends on the
            // file staying quiescent.
            let map = unsafe { MmapOptions::new().len(len).map_mut(backing.file()) }
                .wrap_err_with(|| {
                    format!("failed to memory-map '{}'", backing.path().display())
                })?;
            Some(map)
        };

        trace!(
            path = %backing.path().display(),
            len,
            carried,
            "mapped region"
        );

        // The descriptor is released here; the mapping outlives it.
        Ok(Self {
            map,
            path: backing.into_path(),
            carried,
        })
    }

    /// Mapped length in bytes.
    pub fn len(&self) -> usize {
        self.map.as_ref().map_or(0, |m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_none()
    }

    /// Leading bytes that already held data from a previous run when this
    /// region was opened. Always `<= len()`.
    pub fn carried_len(&self) -> usize {
        self.carried
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.map.as_deref_mut().unwrap_or(&mut [])
    }

    /// Advises the kernel that the whole region will be needed soon.
    ///
    /// Purely a hint; never fails and does nothing on non-unix targets or
    /// empty regions.
    pub fn prefetch(&self) {
        let Some(map) = &self.map else { return };

        #[cfg(unix)]
        // SAFETY: the pointer and length describe exactly the live mapping,
        // and MADV_WILLNEED is advisory (it cannot invalidate the mapping
        // or alter its contents).
        unsafe {
            libc::madvise(
                map.as_ptr() as *mut libc::c_void,
                map.len(),
                libc::MADV_WILLNEED,
            );
        }

        #[cfg(not(unix))]
        let _ = map;
    }
}

/// A [`Region`] whose length is fixed at compile time.
///
/// The run-time form exists because a type's size cannot be lifted into a
/// const generic on stable Rust; this wrapper keeps the compile-time-sized
/// shape available for raw byte areas.
#[derive(Debug)]
pub struct FixedRegion<const LEN: usize> {
    inner: Region,
}

impl<const LEN: usize> FixedRegion<LEN> {
    /// Opens `path` sized to exactly `LEN` bytes, creating or growing the
    /// backing file as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            inner: Region::open(path, LEN as u64)?,
        })
    }

    pub fn carried_len(&self) -> usize {
        self.inner.carried_len()
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.inner.as_bytes_mut()
    }

    pub fn into_inner(self) -> Region {
        self.inner
    }
}
