//! Applying an image as the desktop background
//!
//! The actual work is delegated to an external program (`feh --bg-fill` by
//! default) so wallshelf stays desktop-agnostic: anything that accepts an
//! image path as its final argument can be plugged in via
//! `$WALLSHELF_SET_COMMAND`.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::constants::setter;

/// Capability to put an image on the desktop. Injected into the command
/// handlers so tests can observe applications without shelling out.
pub trait BackgroundSetter {
    /// Best-effort and fire-and-forget: failures are logged, never returned,
    /// and the spawned process is not waited on.
    fn apply(&self, image: &Path);
}

/// Runs the configured command prefix with the image path appended as the
/// final argument.
pub struct CommandSetter {
    program: String,
    args: Vec<String>,
}

impl CommandSetter {
    /// Split a command prefix like `feh --bg-fill` on whitespace. An
    /// all-whitespace prefix falls back to the default.
    pub fn new(prefix: &str) -> CommandSetter {
        let mut words = prefix.split_whitespace().map(str::to_owned);
        match words.next() {
            Some(program) => CommandSetter {
                program,
                args: words.collect(),
            },
            None => {
                warn!("Empty setter command, falling back to '{}'", setter::DEFAULT_COMMAND);
                Self::new(setter::DEFAULT_COMMAND)
            }
        }
    }

    /// Honour `$WALLSHELF_SET_COMMAND` if set, otherwise use the default.
    pub fn from_env() -> CommandSetter {
        match std::env::var(setter::COMMAND_ENV) {
            Ok(prefix) => Self::new(&prefix),
            Err(_) => Self::new(setter::DEFAULT_COMMAND),
        }
    }
}

impl BackgroundSetter for CommandSetter {
    fn apply(&self, image: &Path) {
        match Command::new(&self.program).args(&self.args).arg(image).spawn() {
            Ok(child) => {
                debug!("Spawned '{}' (pid {}) for {:?}", self.program, child.id(), image);
            }
            Err(err) => {
                warn!("Failed to spawn setter '{}': {err}", self.program);
            }
        }
    }
}
