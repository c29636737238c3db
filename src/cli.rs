//! CLI command definitions using Clap.

use std::str::FromStr;

use clap::{Parser, Subcommand};

use crate::constants::aliases;

/// Wallpaper collection switcher.
///
/// Collections are plain text files under the config directory, one source
/// path per line. Navigation commands act on the current collection and hand
/// the chosen image to the background setter.
#[derive(Parser, Debug)]
#[command(name = "wallshelf")]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Switch the current collection to its next image.
    #[command(visible_alias = "forward", aliases = ["after", ">"])]
    Next,

    /// Switch the current collection to its previous image.
    #[command(visible_alias = "prev", aliases = ["before", "back", "<"])]
    Previous,

    /// Switch the current collection to a random image.
    Random,

    /// Add files or directories to a collection, creating it if needed.
    ///
    /// Directories are expanded recursively; the new images append to the
    /// end of the collection without disturbing the current position.
    Add {
        /// Collection to extend (created when missing).
        name: String,
        /// Image files or directories of images.
        #[arg(required = true)]
        paths: Vec<std::path::PathBuf>,
    },

    /// Create an empty collection.
    Create {
        /// Name of the new collection.
        name: String,
    },

    /// List collection names or the images of one collection.
    List {
        /// What to list: 'collections', 'current', or a collection name.
        #[arg(default_value = "collections")]
        target: ListTarget,
    },

    /// Print the current collection name and its current image.
    Current,

    /// Re-expand collections against the filesystem.
    ///
    /// Without a name, every collection is refreshed.
    Refresh {
        /// Collection to refresh (default: all of them).
        name: Option<String>,
    },

    /// Change which collection is current.
    ///
    /// Naming a collection only moves the pointer. 'next' and 'previous'
    /// cycle through the sorted collection list and also apply the new
    /// collection's current image.
    Use {
        /// A collection name, 'next' or 'previous'.
        target: UseTarget,
    },
}

/// Target of the `use` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseTarget {
    /// Cycle forward through the collection list.
    Next,
    /// Cycle backward through the collection list.
    Previous,
    /// Point at this collection.
    Name(String),
}

impl FromStr for UseTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        if aliases::NEXT.contains(&lowered.as_str()) {
            Ok(Self::Next)
        } else if aliases::PREVIOUS.contains(&lowered.as_str()) {
            Ok(Self::Previous)
        } else {
            Ok(Self::Name(s.to_string()))
        }
    }
}

/// Target of the `list` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListTarget {
    /// All collection names.
    Collections,
    /// The images of the current collection.
    Current,
    /// The images of this collection.
    Name(String),
}

impl FromStr for ListTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "collections" => Ok(Self::Collections),
            "current" => Ok(Self::Current),
            _ => Ok(Self::Name(s.to_string())),
        }
    }
}
