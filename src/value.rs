//! # Persistent Value
//!
//! A single fixed-layout value overlaid on a mapped file of exactly its
//! size. The file's bytes *are* the value: mutations through
//! [`PersistentValue::get_mut`] land in the shared mapping immediately and
//! survive the process, and reopening the same path picks the value back up
//! without touching it.
//!
//! Seeding happens at most once per file, ever: only when the open finds
//! the carried prefix shorter than the value (a brand-new file) is the
//! caller's initial value written. On every later open the initial value is
//! ignored, which is the mechanism by which state outlives a restart.
//!
//! Teardown unmaps and nothing more; the value is never logically
//! destroyed, because its bytes must still be a valid value for the next
//! mapping of the same file.

use std::any::type_name;
use std::marker::PhantomData;
use std::path::Path;

use eyre::{ensure, Result};
use tracing::debug;
use zerocopy::IntoBytes;

use crate::record::Record;
use crate::storage::Region;

/// A single `T` persisted in a mapped file.
///
/// Not clonable; movable; unmaps on drop without altering the file.
#[derive(Debug)]
pub struct PersistentValue<T: Record> {
    region: Region,
    _marker: PhantomData<T>,
}

impl<T: Record> PersistentValue<T> {
    /// Opens (creating if absent) the value persisted at `path`.
    ///
    /// `init` is written only if the file did not already hold a complete
    /// value; otherwise it is ignored and the stored value wins.
    pub fn open<P: AsRef<Path>>(path: P, init: T) -> Result<Self> {
        ensure!(
            T::STRIDE > 0,
            "cannot persist zero-sized type {}",
            type_name::<T>()
        );

        let mut region = Region::open(path, T::STRIDE as u64)?;

        if region.carried_len() < T::STRIDE {
            debug!(
                path = %region.path().display(),
                bytes = T::STRIDE,
                "seeding fresh persistent value"
            );
            region.as_bytes_mut().copy_from_slice(init.as_bytes());
        }

        Ok(Self {
            region,
            _marker: PhantomData,
        })
    }

    /// The live value.
    pub fn get(&self) -> Result<&T> {
        T::ref_from_bytes(self.region.as_bytes())
            .map_err(|e| eyre::eyre!("failed to overlay {}: {:?}", type_name::<T>(), e))
    }

    /// The live value, writable in place.
    pub fn get_mut(&mut self) -> Result<&mut T> {
        T::mut_from_bytes(self.region.as_bytes_mut())
            .map_err(|e| eyre::eyre!("failed to overlay {}: {:?}", type_name::<T>(), e))
    }

    pub fn path(&self) -> &Path {
        self.region.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
    struct Counter {
        hits: u64,
        misses: u64,
    }

    #[test]
    fn fresh_value_is_seeded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counter.bin");

        let value = PersistentValue::open(
            &path,
            Counter {
                hits: 7,
                misses: 3,
            },
        )
        .unwrap();

        assert_eq!(
            *value.get().unwrap(),
            Counter {
                hits: 7,
                misses: 3
            }
        );
    }

    #[test]
    fn reopen_keeps_mutations_and_ignores_the_new_seed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counter.bin");

        {
            let mut value =
                PersistentValue::open(&path, Counter { hits: 0, misses: 0 }).unwrap();
            value.get_mut().unwrap().hits = 41;
            value.get_mut().unwrap().hits += 1;
        }

        let value = PersistentValue::open(
            &path,
            Counter {
                hits: 999,
                misses: 999,
            },
        )
        .unwrap();

        assert_eq!(
            *value.get().unwrap(),
            Counter {
                hits: 42,
                misses: 0
            }
        );
    }

    #[test]
    fn plain_integers_persist_too() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.bin");

        {
            let mut value = PersistentValue::open(&path, 0u32).unwrap();
            *value.get_mut().unwrap() = 0xDEAD_BEEF;
        }

        let value = PersistentValue::open(&path, 0u32).unwrap();

        assert_eq!(*value.get().unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn zero_sized_types_are_rejected() {
        #[repr(C)]
        #[derive(FromBytes, IntoBytes, Immutable, KnownLayout)]
        struct Nothing;

        let dir = tempdir().unwrap();

        let result = PersistentValue::open(dir.path().join("zst.bin"), Nothing);

        assert!(result.is_err());
    }
}
