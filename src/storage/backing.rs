//! # Backing File
//!
//! This module implements `BackingFile`, the on-disk half of a persistent
//! region. It owns the open/create/extend protocol that makes reopening a
//! region safe: the file is brought up to the requested length without ever
//! disturbing bytes it already holds, and the caller learns exactly how many
//! leading bytes pre-existed (the *carried* length) so higher layers can
//! seed only what is genuinely new.
//!
//! ## Open Protocol
//!
//! For a sized request the file is first created exclusively with owner-only
//! permissions; if it already exists, it is reopened read-write instead. A
//! discovery request reopens an existing file and adopts its current length
//! as the target (a missing file is an error in that mode).
//!
//! After opening, the file is extended to the target length by *writing*
//! zero bytes at the end, never by truncation, so the extension is
//! physically realized before the region is mapped. The carried length is
//! `min(original length, target)` and the file position is rewound to the
//! start.
//!
//! ## What This Module Does Not Do
//!
//! No locking: two processes opening the same new path may race on creation
//! and both believe they created the file. No shrinking: a request smaller
//! than the file only narrows the negotiated length, the file itself keeps
//! its bytes.

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use tracing::debug;

use crate::config::ZERO_FILL_CHUNK;

#[cfg(unix)]
use crate::config::NEW_FILE_MODE;

/// How much of the backing file the caller wants negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    /// Bring the file up to exactly this many bytes, creating it if needed.
    Exact(u64),
    /// Adopt the current length of an existing file; growth never happens.
    Discover,
}

/// An open persistence file, already sized for mapping.
///
/// The descriptor is only needed until the region is mapped; dropping a
/// `BackingFile` after a successful map leaves the mapping valid.
#[derive(Debug)]
pub struct BackingFile {
    path: PathBuf,
    file: File,
    len: u64,
    carried: u64,
}

impl BackingFile {
    /// Opens or creates the file at `path` and negotiates its length.
    pub fn open<P: AsRef<Path>>(path: P, sizing: Sizing) -> Result<Self> {
        let path = path.as_ref();

        let file = match sizing {
            Sizing::Exact(_) => {
                let mut create = OpenOptions::new();
                create.read(true).write(true).create_new(true);
                #[cfg(unix)]
                {
                    use std::os::unix::fs::OpenOptionsExt;
                    create.mode(NEW_FILE_MODE);
                }

                match create.open(path) {
                    Ok(file) => {
                        debug!(path = %path.display(), "created backing file");
                        file
                    }
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => OpenOptions::new()
                        .read(true)
                        .write(true)
                        .open(path)
                        .wrap_err_with(|| {
                            format!("failed to reopen backing file '{}'", path.display())
                        })?,
                    Err(e) => {
                        return Err(e).wrap_err_with(|| {
                            format!("failed to create backing file '{}'", path.display())
                        })
                    }
                }
            }
            Sizing::Discover => OpenOptions::new()
                .read(true)
                .write(true)
                .open(path)
                .wrap_err_with(|| {
                    format!(
                        "failed to open backing file '{}' for discovery",
                        path.display()
                    )
                })?,
        };

        Self::negotiate_len(file, path, sizing)
    }

    /// Reads the current end of file, extends to the target by writing
    /// zeroes, and records how many leading bytes pre-existed.
    fn negotiate_len(mut file: File, path: &Path, sizing: Sizing) -> Result<Self> {
        let original = file
            .seek(SeekFrom::End(0))
            .wrap_err_with(|| format!("failed to seek to end of '{}'", path.display()))?;

        let target = match sizing {
            Sizing::Exact(len) => len,
            Sizing::Discover => original,
        };

        if original < target {
            let zeroes = vec![0u8; (target - original).min(ZERO_FILL_CHUNK as u64) as usize];
            let mut remaining = target - original;
            while remaining > 0 {
                let step = remaining.min(zeroes.len() as u64) as usize;
                file.write_all(&zeroes[..step]).wrap_err_with(|| {
                    format!(
                        "failed to extend '{}' from {} to {} bytes",
                        path.display(),
                        original,
                        target
                    )
                })?;
                remaining -= step as u64;
            }
            debug!(
                path = %path.display(),
                original,
                target,
                "extended backing file with zeroes"
            );
        }

        file.seek(SeekFrom::Start(0))
            .wrap_err_with(|| format!("failed to rewind '{}'", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len: target,
            carried: original.min(target),
        })
    }

    /// Negotiated length in bytes; the byte range a mapping should cover.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Leading bytes that already existed before this open.
    pub fn carried_len(&self) -> u64 {
        self.carried
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The open descriptor, exposed for mapping.
    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn create_reports_nothing_carried() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.bin");

        let backing = BackingFile::open(&path, Sizing::Exact(100)).unwrap();

        assert_eq!(backing.len(), 100);
        assert_eq!(backing.carried_len(), 0);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 100);
    }

    #[test]
    fn reopen_carries_existing_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.bin");

        drop(BackingFile::open(&path, Sizing::Exact(100)).unwrap());
        let backing = BackingFile::open(&path, Sizing::Exact(100)).unwrap();

        assert_eq!(backing.len(), 100);
        assert_eq!(backing.carried_len(), 100);
    }

    #[test]
    fn growth_carries_only_the_original_prefix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.bin");

        drop(BackingFile::open(&path, Sizing::Exact(40)).unwrap());
        let backing = BackingFile::open(&path, Sizing::Exact(100)).unwrap();

        assert_eq!(backing.len(), 100);
        assert_eq!(backing.carried_len(), 40);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 100);
    }

    #[test]
    fn extension_writes_zeroes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.bin");

        {
            let backing = BackingFile::open(&path, Sizing::Exact(4)).unwrap();
            let mut file = backing.file();
            file.write_all(&[0xAA, 0xBB, 0xCC, 0xDD]).unwrap();
        }

        drop(BackingFile::open(&path, Sizing::Exact(8)).unwrap());

        let mut bytes = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, [0xAA, 0xBB, 0xCC, 0xDD, 0, 0, 0, 0]);
    }

    #[test]
    fn shrinking_request_never_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.bin");

        drop(BackingFile::open(&path, Sizing::Exact(100)).unwrap());
        let backing = BackingFile::open(&path, Sizing::Exact(40)).unwrap();

        assert_eq!(backing.len(), 40);
        assert_eq!(backing.carried_len(), 40);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 100);
    }

    #[test]
    fn discovery_adopts_the_full_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.bin");

        drop(BackingFile::open(&path, Sizing::Exact(64)).unwrap());
        let backing = BackingFile::open(&path, Sizing::Discover).unwrap();

        assert_eq!(backing.len(), 64);
        assert_eq!(backing.carried_len(), 64);
    }

    #[test]
    fn discovery_requires_an_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.bin");

        let result = BackingFile::open(&path, Sizing::Discover);

        assert!(result.is_err());
    }

    #[test]
    fn open_fails_when_directory_is_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("state.bin");

        let result = BackingFile::open(&path, Sizing::Exact(16));

        assert!(result.is_err());
    }

    #[test]
    fn zero_byte_request_creates_an_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.bin");

        let backing = BackingFile::open(&path, Sizing::Exact(0)).unwrap();

        assert!(backing.is_empty());
        assert_eq!(backing.carried_len(), 0);
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn fresh_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("state.bin");

        drop(BackingFile::open(&path, Sizing::Exact(16)).unwrap());

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, NEW_FILE_MODE);
    }
}
