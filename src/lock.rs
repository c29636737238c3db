//! Per-collection advisory locking
//!
//! Commands that load-mutate-save a collection hold an exclusive `flock` on
//! `.lock.<name>` for the duration, so concurrent invocations serialize
//! instead of interleaving their writes. The lock is advisory: it only
//! protects against other wallshelf processes, not against editors touching
//! the state files directly. The root-wide pointer file is not covered;
//! pointer writes are single atomic renames.

use std::path::Path;

use crate::error::Error;

pub use imp::CollectionLock;

/// Take the exclusive lock for one collection, creating the configuration
/// root and the lock file as needed. Blocks until any current holder
/// releases it; the lock is released when the returned guard drops.
pub fn acquire(root: &Path, name: &str) -> Result<CollectionLock, Error> {
    imp::acquire(root, name)
}

#[cfg(unix)]
mod imp {
    use std::fs::{self, File, OpenOptions};
    use std::path::Path;

    use nix::fcntl::{Flock, FlockArg};
    use tracing::debug;

    use crate::error::Error;
    use crate::storage;

    pub struct CollectionLock {
        _lock: Flock<File>,
    }

    pub fn acquire(root: &Path, name: &str) -> Result<CollectionLock, Error> {
        let path = storage::lock_file(root, name);
        fs::create_dir_all(root).map_err(|err| Error::io(root, err))?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)
            .map_err(|err| Error::io(&path, err))?;

        debug!("Locking {:?}", path);
        match Flock::lock(file, FlockArg::LockExclusive) {
            Ok(lock) => Ok(CollectionLock { _lock: lock }),
            Err((_, errno)) => Err(Error::io(
                &path,
                std::io::Error::from_raw_os_error(errno as i32),
            )),
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use std::fs;
    use std::path::Path;

    use crate::error::Error;

    /// No flock off Unix; saves still replace files atomically.
    pub struct CollectionLock;

    pub fn acquire(root: &Path, _name: &str) -> Result<CollectionLock, Error> {
        fs::create_dir_all(root).map_err(|err| Error::io(root, err))?;
        Ok(CollectionLock)
    }
}
