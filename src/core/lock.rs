//! Destination lock management
//!
//! Provides exclusive locking so only one run populates a destination at a time.

use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};

use super::error::{AcquireError, Result};
use crate::internal::fs_utils;

/// How old a lock file can be before it's considered stale (2 hours)
const STALE_LOCK_AGE_SECS: u64 = 7200;

/// Check if a lock file is stale (older than STALE_LOCK_AGE_SECS)
fn is_stale_lock(lock_path: &Path) -> bool {
    if let Ok(metadata) = std::fs::metadata(lock_path)
        && let Ok(modified) = metadata.modified()
        && let Ok(age) = std::time::SystemTime::now().duration_since(modified)
    {
        return age.as_secs() > STALE_LOCK_AGE_SECS;
    }
    false
}

/// Path of the lock file guarding `dest`.
///
/// The lock lives next to the destination, never inside it, so the
/// destination tree only ever holds extracted content. `.` and `..`
/// components are resolved first so the sibling is taken from the
/// directory's real name.
pub fn lock_path_for(dest: &Path) -> Result<PathBuf> {
    let resolved = match dest.canonicalize() {
        Ok(path) => path,
        Err(_) => fs_utils::normalize_lexical(&std::path::absolute(dest)?),
    };

    match (resolved.parent(), resolved.file_name()) {
        (Some(parent), Some(name)) => {
            Ok(parent.join(format!(".{}.acquire-lock", name.to_string_lossy())))
        }
        _ => Err(AcquireError::Configuration(format!(
            "destination {} has no parent directory to hold its lock",
            dest.display()
        ))),
    }
}

/// Acquire an exclusive lock on a destination directory.
/// Returns a guard that releases the lock when dropped.
pub fn acquire_destination_lock(dest: &Path) -> Result<DestinationLock> {
    let lock_path = lock_path_for(dest)?;

    if lock_path.exists() && is_stale_lock(&lock_path) {
        let _ = std::fs::remove_file(&lock_path);
    }

    if let Some(parent) = lock_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let lock_file = File::create(&lock_path)?;

    if lock_file.try_lock_exclusive().is_err() {
        return Err(AcquireError::DestinationBusy {
            path: dest.to_path_buf(),
        });
    }

    Ok(DestinationLock {
        _file: lock_file,
        path: lock_path,
    })
}

/// RAII guard for a destination lock - releases lock and deletes lock file when dropped
#[derive(Debug)]
pub struct DestinationLock {
    _file: File,
    path: PathBuf,
}

impl Drop for DestinationLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
