//! Collection discovery and the current-collection pointer
//!
//! The registry is a view over the configuration root: every non-dot file
//! there is a collection, and the `.current` pointer file names the one
//! navigation commands act on. A registry is built per invocation and handed
//! to the command handlers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::constants::{config, files};
use crate::error::Error;
use crate::storage;

/// Direction for cycling through the sorted collection list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Forward,
    Backward,
}

pub struct Registry {
    root: PathBuf,
}

impl Registry {
    pub fn new(root: PathBuf) -> Registry {
        Registry { root }
    }

    /// Default configuration root: `$WALLSHELF_CONFIG_DIR` if set, otherwise
    /// `wallshelf/` under the platform config directory.
    pub fn default_root() -> PathBuf {
        if let Some(dir) = std::env::var_os(config::ROOT_ENV) {
            return PathBuf::from(dir);
        }
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(config::APP_DIR);
        path
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All collection names, sorted. Dot-prefixed bookkeeping files are
    /// filtered out; a missing configuration root just means no collections
    /// exist yet.
    pub fn list_collections(&self) -> Result<Vec<String>, Error> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(Error::io(&self.root, err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| Error::io(&self.root, err))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(files::RESERVED_PREFIX) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Whether a collection file with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        storage::paths_file(&self.root, name).is_file()
    }

    /// The name in the pointer file, if any.
    pub fn current_name(&self) -> Result<Option<String>, Error> {
        let Some(contents) = storage::read_opt(&storage::pointer_file(&self.root))? else {
            return Ok(None);
        };
        let name = contents.lines().next().unwrap_or("").trim();
        if name.is_empty() {
            Ok(None)
        } else {
            Ok(Some(name.to_string()))
        }
    }

    /// Point the pointer file at `name`.
    ///
    /// Pointing at a collection that does not exist is allowed (it may be
    /// created afterwards) but warned about, so stale pointers stay visible.
    pub fn set_current(&self, name: &str) -> Result<(), Error> {
        validate_name(name)?;
        if !self.contains(name) {
            warn!("Collection '{name}' does not exist (yet); pointing at it anyway");
        }
        self.write_pointer(name)
    }

    /// Move the pointer to the neighbouring collection in the sorted list,
    /// wrapping at either end. Returns the new current name.
    pub fn cycle_current(&self, direction: CycleDirection) -> Result<String, Error> {
        let names = self.list_collections()?;
        if names.is_empty() {
            return Err(Error::NoCollections);
        }
        let current = self.current_name()?.ok_or(Error::NoCurrentCollection)?;
        let position = names
            .iter()
            .position(|name| *name == current)
            .ok_or_else(|| Error::CurrentNotInList(current.clone()))?;

        let position = match direction {
            CycleDirection::Forward => (position + 1) % names.len(),
            CycleDirection::Backward => (position + names.len() - 1) % names.len(),
        };
        let name = names[position].clone();
        self.write_pointer(&name)?;
        Ok(name)
    }

    fn write_pointer(&self, name: &str) -> Result<(), Error> {
        storage::write_atomic(&storage::pointer_file(&self.root), &format!("{name}\n"))?;
        info!("Current collection is now '{name}'");
        Ok(())
    }
}

/// Reject names that can never be collections: empty, dot-prefixed (the
/// bookkeeping namespace) or containing a path separator.
pub fn validate_name(name: &str) -> Result<(), Error> {
    if name.is_empty()
        || name.starts_with(files::RESERVED_PREFIX)
        || name.contains('/')
        || name.contains(std::path::MAIN_SEPARATOR)
    {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}
