//! On-disk build layout and the invocation location check.
//!
//! The tool is run from `<source root>/scripts/python`. Everything it
//! generates lives under `<source root>/build`, which can be deleted and
//! recreated at any time.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::consts::{BUILD_DIR_NAME, COVERAGE_DIR_NAME, INSTALL_DIR_NAME, LOCATION_MARKERS, SCA_DIR_NAME};
use crate::error::PipelineError;
use crate::process::directory::normalize;

/// Paths of the build staging area, derived from the script directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
  script_dir: PathBuf,
  source_root: PathBuf,
  root: PathBuf,
}

impl BuildLayout {
  pub fn from_script_dir(script_dir: impl AsRef<Path>) -> Self {
    let script_dir = normalize(script_dir.as_ref());
    let source_root = normalize(&script_dir.join("../.."));
    let root = source_root.join(BUILD_DIR_NAME);
    Self {
      script_dir,
      source_root,
      root,
    }
  }

  pub fn script_dir(&self) -> &Path {
    &self.script_dir
  }

  pub fn source_root(&self) -> &Path {
    &self.source_root
  }

  /// The build root.
  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn install_dir(&self) -> PathBuf {
    self.root.join(INSTALL_DIR_NAME)
  }

  pub fn sca_dir(&self) -> PathBuf {
    self.root.join(SCA_DIR_NAME)
  }

  pub fn coverage_dir(&self) -> PathBuf {
    self.root.join(COVERAGE_DIR_NAME)
  }

  /// Relative path from the source root to the script directory.
  pub fn script_dir_from_source_root(&self) -> PathBuf {
    self
      .script_dir
      .strip_prefix(&self.source_root)
      .map(Path::to_path_buf)
      .unwrap_or_else(|_| self.script_dir.clone())
  }

  /// Relative path from the build root back to the script directory.
  pub fn script_dir_from_root(&self) -> PathBuf {
    Path::new("..").join(self.script_dir_from_source_root())
  }

  /// Verify the tool is run from its expected place in the source tree.
  ///
  /// Only reads the file system.
  pub fn check_location(&self) -> Result<(), PipelineError> {
    for marker in LOCATION_MARKERS {
      if !self.script_dir.join(marker).is_dir() {
        return Err(PipelineError::WrongLocation {
          missing: PathBuf::from(marker),
        });
      }
    }
    Ok(())
  }

  /// Delete the build root. Returns whether anything was removed.
  pub fn clean(&self) -> Result<bool, PipelineError> {
    if !self.root.is_dir() {
      return Ok(false);
    }
    info!(path = %self.root.display(), "deleting build directory");
    fs::remove_dir_all(&self.root).map_err(|source| PipelineError::Layout {
      action: "delete",
      path: self.root.clone(),
      source,
    })?;
    Ok(true)
  }

  /// Create the build root and its fixed subfolders if it is absent.
  ///
  /// Returns whether the layout was created.
  pub fn create(&self) -> Result<bool, PipelineError> {
    if self.root.exists() {
      return Ok(false);
    }
    info!(path = %self.root.display(), "creating build directory");
    for dir in [self.root.clone(), self.install_dir(), self.sca_dir()] {
      fs::create_dir_all(&dir).map_err(|source| PipelineError::Layout {
        action: "create",
        path: dir,
        source,
      })?;
    }
    Ok(true)
  }
}
