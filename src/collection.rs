//! A named wallpaper collection and its persisted state
//!
//! Three files under the configuration root back each collection: the raw
//! source entries, the expanded image list and the stored index. Loading
//! tolerates missing files (a collection nobody created yet is just empty);
//! saving rewrites all three atomically.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::expansion;
use crate::storage;

#[derive(Debug)]
pub struct Collection {
    name: String,
    root: PathBuf,
    paths: Vec<PathBuf>,
    images: Vec<PathBuf>,
    current_index: usize,
}

impl Collection {
    /// Load a collection's state files from the configuration root.
    ///
    /// A missing paths file yields a fresh empty collection. A missing image
    /// list is rebuilt by expanding the source entries and cached on disk
    /// right away, unless there is nothing to expand (loading an empty
    /// collection writes no files).
    pub fn load(root: &Path, name: &str) -> Result<Collection, Error> {
        let paths: Vec<PathBuf> = match storage::read_lines(&storage::paths_file(root, name))? {
            Some(lines) => lines.into_iter().map(PathBuf::from).collect(),
            None => Vec::new(),
        };

        let images_path = storage::images_file(root, name);
        let images: Vec<PathBuf> = match storage::read_lines(&images_path)? {
            Some(lines) => lines.into_iter().map(|line| root.join(line)).collect(),
            None => {
                let images = expansion::expand(&paths);
                if !paths.is_empty() {
                    debug!("Caching {} expanded image(s) for '{name}'", images.len());
                    storage::write_lines_atomic(
                        &images_path,
                        images.iter().map(|image| image.to_string_lossy()),
                    )?;
                }
                images
            }
        };

        let current_index = Self::load_index(root, name, images.len())?;

        Ok(Collection {
            name: name.to_string(),
            root: root.to_path_buf(),
            paths,
            images,
            current_index,
        })
    }

    fn load_index(root: &Path, name: &str, len: usize) -> Result<usize, Error> {
        let index_path = storage::index_file(root, name);
        let Some(contents) = storage::read_opt(&index_path)? else {
            return Ok(0);
        };
        let index: usize = contents.trim().parse().map_err(|_| {
            Error::corrupt(
                &index_path,
                format!("expected an integer index, found {:?}", contents.trim()),
            )
        })?;

        // The image list may have shrunk behind our back; a well-formed but
        // out-of-range index is recoverable
        let clamped = index.min(len.saturating_sub(1));
        if index != clamped {
            warn!("Stored index {index} out of range for '{name}' ({len} image(s)), clamping");
        }
        Ok(clamped)
    }

    /// Persist all three state files, each replaced atomically.
    pub fn save(&self) -> Result<(), Error> {
        storage::write_lines_atomic(
            &storage::paths_file(&self.root, &self.name),
            self.paths.iter().map(|path| path.to_string_lossy()),
        )?;
        storage::write_lines_atomic(
            &storage::images_file(&self.root, &self.name),
            self.images.iter().map(|image| image.to_string_lossy()),
        )?;
        storage::write_atomic(
            &storage::index_file(&self.root, &self.name),
            &format!("{}\n", self.current_index),
        )?;
        debug!(
            "Saved collection '{}' ({} image(s), index {})",
            self.name,
            self.images.len(),
            self.current_index
        );
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// The image the stored index points at.
    pub fn current(&self) -> Result<&Path, Error> {
        self.images
            .get(self.current_index)
            .map(PathBuf::as_path)
            .ok_or_else(|| Error::EmptyCollection(self.name.clone()))
    }

    /// Advance to the next image, wrapping at the end of the list.
    pub fn next(&mut self) -> Result<&Path, Error> {
        if self.images.is_empty() {
            return Err(Error::EmptyCollection(self.name.clone()));
        }
        self.current_index = (self.current_index + 1) % self.images.len();
        Ok(&self.images[self.current_index])
    }

    /// Step back to the previous image, wrapping at the start of the list.
    pub fn previous(&mut self) -> Result<&Path, Error> {
        if self.images.is_empty() {
            return Err(Error::EmptyCollection(self.name.clone()));
        }
        self.current_index = (self.current_index + self.images.len() - 1) % self.images.len();
        Ok(&self.images[self.current_index])
    }

    /// Jump to a uniformly random image (possibly the current one).
    pub fn random_pick(&mut self) -> Result<&Path, Error> {
        if self.images.is_empty() {
            return Err(Error::EmptyCollection(self.name.clone()));
        }
        let mut rng = rand::rng();
        self.current_index = rng.random_range(0..self.images.len());
        Ok(&self.images[self.current_index])
    }

    /// Append source entries (made absolute first) and expand just the new
    /// entries. Existing images keep their positions, so the stored index
    /// still points at the same image afterwards. Returns how many images
    /// the expansion discovered.
    pub fn add(&mut self, entries: &[PathBuf]) -> Result<usize, Error> {
        let mut absolute = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry = std::path::absolute(entry).map_err(|err| Error::io(entry, err))?;
            absolute.push(entry);
        }

        let mut seen: HashSet<PathBuf> = self.images.iter().cloned().collect();
        let before = self.images.len();
        expansion::expand_into(&absolute, &mut self.images, &mut seen);
        self.paths.extend(absolute);

        Ok(self.images.len() - before)
    }

    /// Re-expand the source entries against the filesystem and persist the
    /// result.
    ///
    /// The stored index follows the previously current image to its new
    /// position. If that image is gone, the index is clamped into range, the
    /// refreshed state is still saved, and the loss is reported as
    /// [`Error::ImageNotFoundAfterRefresh`].
    pub fn refresh(&mut self) -> Result<(), Error> {
        let previous = self.images.get(self.current_index).cloned();
        self.images = expansion::expand(&self.paths);

        let missing = match previous {
            None => {
                self.current_index = 0;
                None
            }
            Some(previous) => match self.images.iter().position(|image| *image == previous) {
                Some(index) => {
                    self.current_index = index;
                    None
                }
                None => {
                    self.current_index = self.current_index.min(self.images.len().saturating_sub(1));
                    Some(previous)
                }
            },
        };

        self.save()?;
        info!("Refreshed collection '{}' ({} image(s))", self.name, self.images.len());

        match missing {
            Some(image) => Err(Error::ImageNotFoundAfterRefresh {
                collection: self.name.clone(),
                image,
            }),
            None => Ok(()),
        }
    }
}
