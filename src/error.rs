//! Error types for wallshelf.
//!
//! Every state-machine failure is funnelled through [`Error`], which uses
//! `thiserror` for `Display` and `Error` derives. Command handlers bubble
//! these through `anyhow` at the binary boundary.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Top-level error type for the collection state machine.
#[derive(Debug, Error)]
pub enum Error {
    /// Navigation or display was requested on a collection with no images.
    #[error("collection '{0}' has no images")]
    EmptyCollection(String),

    /// A named collection has no file in the configuration root.
    #[error("collection '{0}' does not exist")]
    CollectionNotFound(String),

    /// Cycling the current collection when the configuration root holds none.
    #[error("no collections exist yet")]
    NoCollections,

    /// The pointer file names a collection that is not in the listing.
    #[error("current collection '{0}' is not in the collection list")]
    CurrentNotInList(String),

    /// An operation needed a current collection but the pointer file is
    /// absent or blank.
    #[error("no current collection is set")]
    NoCurrentCollection,

    /// A collection name that can never exist: empty, reserved-prefixed or
    /// containing a path separator.
    #[error("invalid collection name '{0}'")]
    InvalidName(String),

    /// A state file exists but cannot be interpreted.
    #[error("corrupt state in {}: {reason}", .path.display())]
    CorruptState { path: PathBuf, reason: String },

    /// After a refresh, the previously current image is gone from the
    /// re-expanded list. The refreshed state has already been saved with the
    /// index clamped into range.
    #[error("image '{}' is no longer part of collection '{collection}' after refresh", .image.display())]
    ImageNotFoundAfterRefresh { collection: String, image: PathBuf },

    /// Filesystem failure, tagged with the path being touched.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Error::CorruptState {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }
}
