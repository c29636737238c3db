//! Recursive expansion of source entries into a flat image list
//!
//! Source entries are plain files or directories. Directories are walked
//! depth-first with children visited in lexicographic order, so the same
//! tree always expands to the same list. The first discovery of a path wins;
//! later duplicates are dropped. Entries that no longer exist on disk are
//! skipped here and reconciled away by `refresh`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Expand source entries into an ordered, duplicate-free image list.
pub fn expand(entries: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();
    let mut seen = HashSet::new();
    expand_into(entries, &mut images, &mut seen);
    images
}

/// Incremental form of [`expand`]: appends newly discovered images to
/// `images`, consulting and updating `seen`. Existing images keep their
/// positions, which lets `add` extend a collection without disturbing the
/// stored index.
pub fn expand_into(entries: &[PathBuf], images: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>) {
    for entry in entries {
        expand_entry(entry, images, seen);
    }
}

fn expand_entry(entry: &Path, images: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>) {
    if entry.is_dir() {
        let mut children: Vec<PathBuf> = match fs::read_dir(entry) {
            Ok(read_dir) => read_dir
                .filter_map(|child| child.ok())
                .map(|child| child.path())
                .collect(),
            Err(err) => {
                warn!("Skipping unreadable directory {:?}: {err}", entry);
                return;
            }
        };
        children.sort();
        for child in children {
            expand_entry(&child, images, seen);
        }
    } else if entry.exists() {
        if seen.insert(entry.to_path_buf()) {
            images.push(entry.to_path_buf());
        }
    } else {
        debug!("Skipping nonexistent entry {:?}", entry);
    }
}
