//! On-disk layout and line-file helpers
//!
//! All state lives as plain text files directly under the configuration
//! root. A collection named `art` owns `art` (one source entry per line),
//! `.images.art` (one expanded image path per line) and `.current.art`
//! (the stored index). The root-wide `.current` file names the current
//! collection. Writes go through an atomic rename so readers never see a
//! half-written file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::files;
use crate::error::Error;

pub fn paths_file(root: &Path, name: &str) -> PathBuf {
    root.join(name)
}

pub fn images_file(root: &Path, name: &str) -> PathBuf {
    root.join(format!("{}{name}", files::IMAGES_PREFIX))
}

pub fn index_file(root: &Path, name: &str) -> PathBuf {
    root.join(format!("{}{name}", files::INDEX_PREFIX))
}

pub fn pointer_file(root: &Path) -> PathBuf {
    root.join(files::POINTER)
}

pub fn lock_file(root: &Path, name: &str) -> PathBuf {
    root.join(format!("{}{name}", files::LOCK_PREFIX))
}

/// Read a whole state file, mapping "file does not exist" to `Ok(None)`.
pub fn read_opt(path: &Path) -> Result<Option<String>, Error> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Error::io(path, err)),
    }
}

/// Read a line-per-entry state file. Trailing whitespace is trimmed and
/// blank lines are dropped; `Ok(None)` when the file does not exist.
pub fn read_lines(path: &Path) -> Result<Option<Vec<String>>, Error> {
    let Some(contents) = read_opt(path)? else {
        return Ok(None);
    };
    Ok(Some(
        contents
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect(),
    ))
}

/// Replace `path` atomically: write a `.tmp.`-prefixed sibling, then rename
/// it over the target. Creates the parent directory if needed.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), Error> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::corrupt(path, "state file has no parent directory"))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::corrupt(path, "state file has no file name"))?;

    fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;

    let tmp = parent.join(format!("{}{}", files::TMP_PREFIX, file_name.to_string_lossy()));
    fs::write(&tmp, contents).map_err(|err| Error::io(&tmp, err))?;
    fs::rename(&tmp, path).map_err(|err| Error::io(path, err))?;
    Ok(())
}

/// Write a line-per-entry state file atomically, one entry per line.
pub fn write_lines_atomic<I, S>(path: &Path, lines: I) -> Result<(), Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut contents = String::new();
    for line in lines {
        contents.push_str(line.as_ref());
        contents.push('\n');
    }
    write_atomic(path, &contents)
}
