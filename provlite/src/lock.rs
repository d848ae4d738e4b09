// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cross-process named lock
//!
//! A lock is a file under the configured lock directory. Holding it means
//! holding both an in-process mutex (threads sharing one handle) and an
//! exclusive `flock` on the handle's own open file description (other
//! handles, in this process or any other).
//!
//! The kernel drops a `flock` when its holder exits, so a crashed holder
//! does not wedge later callers.
//!
//! Lock files are never removed. Another process may still have the file
//! open, and unlinking it would let a newcomer lock a fresh inode alongside
//! it. Releasing a [`SharedLock`] handle is all the teardown there is.

use crate::config::ProvConfig;
use crate::error::ProvResult;
use log::{debug, warn};
use parking_lot::{Mutex, MutexGuard};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Validate the lock settings and create the lock directory
///
/// Idempotent. Nothing here needs undoing later: the directory and lock
/// file outlive every handle.
pub(crate) fn initialize(config: &ProvConfig) -> ProvResult<()> {
    config.validate()?;
    std::fs::create_dir_all(&config.lock_dir)?;
    debug!("Lock subsystem ready in '{}'", config.lock_dir.display());
    Ok(())
}

/// Handle to a named cross-process lock
#[derive(Debug)]
pub struct SharedLock {
    path: PathBuf,
    file: File,
    local: Mutex<()>,
}

/// Held lock; released on drop
#[derive(Debug)]
pub struct SharedLockGuard<'a> {
    lock: &'a SharedLock,
    _local: MutexGuard<'a, ()>,
}

impl SharedLock {
    /// Open (creating if needed) the lock file at `path`
    pub fn open(path: impl AsRef<Path>) -> ProvResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        debug!("Opened shared lock '{}'", path.display());
        Ok(Self {
            path,
            file,
            local: Mutex::new(()),
        })
    }

    /// Open the lock named by `config`
    pub fn from_config(config: &ProvConfig) -> ProvResult<Self> {
        Self::open(config.lock_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the lock is held
    pub fn acquire(&self) -> ProvResult<SharedLockGuard<'_>> {
        let local = self.local.lock();
        sys::lock_exclusive(&self.file)?;
        Ok(SharedLockGuard {
            lock: self,
            _local: local,
        })
    }

    /// Take the lock only if nobody holds it
    pub fn try_acquire(&self) -> ProvResult<Option<SharedLockGuard<'_>>> {
        let Some(local) = self.local.try_lock() else {
            return Ok(None);
        };
        if !sys::try_lock_exclusive(&self.file)? {
            return Ok(None);
        }
        Ok(Some(SharedLockGuard {
            lock: self,
            _local: local,
        }))
    }
}

impl Drop for SharedLockGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = sys::unlock(&self.lock.file) {
            warn!(
                "Failed to release shared lock '{}': {}",
                self.lock.path.display(),
                e
            );
        }
    }
}

#[cfg(unix)]
mod sys {
    use super::io;
    use std::fs::File;
    use std::os::unix::io::AsRawFd;

    fn flock(file: &File, operation: libc::c_int) -> io::Result<()> {
        loop {
            let rc = unsafe { libc::flock(file.as_raw_fd(), operation) };
            if rc == 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    pub(super) fn lock_exclusive(file: &File) -> io::Result<()> {
        flock(file, libc::LOCK_EX)
    }

    pub(super) fn try_lock_exclusive(file: &File) -> io::Result<bool> {
        match flock(file, libc::LOCK_EX | libc::LOCK_NB) {
            Ok(()) => Ok(true),
            Err(e) if e.raw_os_error() == Some(libc::EWOULDBLOCK) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub(super) fn unlock(file: &File) -> io::Result<()> {
        flock(file, libc::LOCK_UN)
    }
}

// Without flock only threads sharing one handle exclude each other
#[cfg(not(unix))]
mod sys {
    use super::io;
    use std::fs::File;

    pub(super) fn lock_exclusive(_file: &File) -> io::Result<()> {
        Ok(())
    }

    pub(super) fn try_lock_exclusive(_file: &File) -> io::Result<bool> {
        Ok(true)
    }

    pub(super) fn unlock(_file: &File) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_guard_releases_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        let lock = SharedLock::open(temp_dir.path().join("a.lock")).unwrap();

        let guard = lock.acquire().unwrap();
        assert!(lock.try_acquire().unwrap().is_none());
        drop(guard);
        assert!(lock.try_acquire().unwrap().is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_separate_handles_exclude_each_other() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("b.lock");
        let first = SharedLock::open(&path).unwrap();
        let second = SharedLock::open(&path).unwrap();

        let guard = first.acquire().unwrap();
        assert!(second.try_acquire().unwrap().is_none());
        drop(guard);
        let guard = second.try_acquire().unwrap();
        assert!(guard.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_lock_file_outlives_handles() {
        let temp_dir = TempDir::new().unwrap();
        let config = ProvConfig::default().with_lock_dir(temp_dir.path());
        initialize(&config).unwrap();

        let survivor = SharedLock::from_config(&config).unwrap();
        let dropped = SharedLock::from_config(&config).unwrap();
        drop(dropped.acquire().unwrap());
        drop(dropped);
        assert!(config.lock_path().exists());

        // Initializing again keeps the file, so handles still share one lock
        initialize(&config).unwrap();
        let newcomer = SharedLock::from_config(&config).unwrap();
        let guard = survivor.acquire().unwrap();
        assert!(newcomer.try_acquire().unwrap().is_none());
        drop(guard);
        assert!(newcomer.try_acquire().unwrap().is_some());
    }

    #[test]
    fn test_initialize_creates_lock_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = ProvConfig::default().with_lock_dir(temp_dir.path().join("nested/locks"));
        initialize(&config).unwrap();
        assert!(config.lock_dir.is_dir());
        let lock = SharedLock::from_config(&config).unwrap();
        assert!(lock.path().exists());
    }
}
