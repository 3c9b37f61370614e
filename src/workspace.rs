//! Per-unit workspace layout and cleanup.
//!
//! Layout under `<output_root>/<unit>/`:
//!
//! ```text
//! model/              copied description file
//! generated/          generator output (written by the external tool, see
//!                     the plugin's `outputDir`)
//! build/              build intermediates, removed once the unit finishes
//! smithy-build.json   synthesized build configuration
//! smithy-build.log    combined stdout/stderr of the build
//! errors.txt          diagnostic excerpt, failed builds only
//! ```

use crate::error::UnitError;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

pub const MODEL_DIRNAME: &str = "model";
pub const GENERATED_DIRNAME: &str = "generated";
pub const BUILD_DIRNAME: &str = "build";
pub const CONFIG_FILENAME: &str = "smithy-build.json";
pub const LOG_FILENAME: &str = "smithy-build.log";
pub const ERRORS_FILENAME: &str = "errors.txt";

/// Check that `unit` names exactly one directory, so joining it onto the
/// input or output root cannot leave that root.
pub fn validate_unit_id(unit: &str) -> Result<(), UnitError> {
    let mut components = Path::new(unit).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == unit => Ok(()),
        _ => Err(UnitError::InvalidUnit(unit.to_string())),
    }
}

/// Paths of one unit's workspace. Nothing is touched on disk until [`Workspace::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(output_root: &Path, unit: &str) -> Self {
        Self {
            root: output_root.join(unit),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn model_dir(&self) -> PathBuf {
        self.root.join(MODEL_DIRNAME)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIRNAME)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILENAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILENAME)
    }

    pub fn errors_path(&self) -> PathBuf {
        self.root.join(ERRORS_FILENAME)
    }

    /// Create the root, model and build directories. Existing directories are fine.
    pub fn create(&self) -> Result<(), UnitError> {
        for dir in [self.root.clone(), self.model_dir(), self.build_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| UnitError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Remove an `errors.txt` left over from an earlier failed run.
    pub fn clear_errors(&self) -> Result<(), UnitError> {
        let path = self.errors_path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UnitError::io(&path, e)),
        }
    }

    /// Guard that removes the build directory when finished or dropped.
    pub fn cleanup_guard(&self) -> CleanupGuard {
        CleanupGuard {
            build_dir: self.build_dir(),
            done: false,
        }
    }
}

/// Remove `dir` recursively. A directory that is already gone is not an error.
pub fn remove_build_dir(dir: &Path) -> Result<(), UnitError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {
            debug!(path = %dir.display(), "Removed build directory");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(UnitError::io(dir, e)),
    }
}

/// Removes a unit's build directory on every exit path.
///
/// Call [`CleanupGuard::finish`] on the normal path to observe removal
/// errors; if the guard is dropped instead (early return or panic) removal
/// still happens and failures are logged.
#[derive(Debug)]
pub struct CleanupGuard {
    build_dir: PathBuf,
    done: bool,
}

impl CleanupGuard {
    pub fn finish(mut self) -> Result<(), UnitError> {
        self.done = true;
        remove_build_dir(&self.build_dir)
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(e) = remove_build_dir(&self.build_dir) {
            warn!(error = %e, "Failed to remove build directory");
        }
    }
}
