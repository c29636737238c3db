//! Application-wide constants
//!
//! This module contains the naming conventions and string literals used
//! throughout the application, providing a single source of truth for
//! constant values.

/// Configuration root constants
pub mod config {
    /// Directory name under the user config dir holding all state files
    pub const APP_DIR: &str = "wallshelf";

    /// Environment variable overriding the configuration root
    pub const ROOT_ENV: &str = "WALLSHELF_CONFIG_DIR";
}

/// On-disk file naming conventions
///
/// A collection named `art` owns three files in the configuration root:
/// `art` (source entries), `.images.art` (expanded image list) and
/// `.current.art` (stored index). Everything starting with a dot is internal
/// bookkeeping and never a collection.
pub mod files {
    /// Prefix marking internal bookkeeping files; collection names must not
    /// start with it
    pub const RESERVED_PREFIX: char = '.';

    /// Pointer file naming the current collection
    pub const POINTER: &str = ".current";

    /// Prefix of per-collection stored-index files
    pub const INDEX_PREFIX: &str = ".current.";

    /// Prefix of per-collection expanded image list files
    pub const IMAGES_PREFIX: &str = ".images.";

    /// Prefix of per-collection advisory lock files
    pub const LOCK_PREFIX: &str = ".lock.";

    /// Prefix of temporary files used for atomic replacement
    pub const TMP_PREFIX: &str = ".tmp.";
}

/// Background setter constants
pub mod setter {
    /// Default command prefix the image path is appended to
    pub const DEFAULT_COMMAND: &str = "feh --bg-fill";

    /// Environment variable overriding the setter command prefix
    pub const COMMAND_ENV: &str = "WALLSHELF_SET_COMMAND";
}

/// Accepted spellings for the cycling directions
pub mod aliases {
    /// Spellings that mean "next"
    pub const NEXT: &[&str] = &["next", "forward", "after", ">"];

    /// Spellings that mean "previous"
    pub const PREVIOUS: &[&str] = &["previous", "prev", "before", "back", "<"];
}
