//! Working directory tracking for subprocess steps.
//!
//! The pipeline never mutates the process-wide current directory. Instead a
//! [`WorkingDirectory`] holds the directory the next command runs in, and a
//! [`DirectoryGuard`] checks it out for exactly one command, restoring it
//! when dropped, whether the command succeeded, failed, or never started.

use std::path::{Component, Path, PathBuf};

use tracing::{trace, warn};

/// The directory subprocess steps are launched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirectory {
  current: PathBuf,
}

impl WorkingDirectory {
  pub fn new(start: impl AsRef<Path>) -> Self {
    Self {
      current: normalize(start.as_ref()),
    }
  }

  pub fn current(&self) -> &Path {
    &self.current
  }

  /// Move into `to` until the returned guard is dropped.
  ///
  /// Relative `to` is resolved against the current directory. Relative
  /// `back` is resolved against `to`, mirroring a `cd to && cmd && cd back`
  /// sequence.
  pub fn enter(&mut self, to: &Path, back: &Path) -> DirectoryGuard<'_> {
    let saved = self.current.clone();
    let entered = resolve(&saved, to);
    trace!(from = %saved.display(), to = %entered.display(), "entering directory");
    self.current = entered;
    DirectoryGuard {
      context: self,
      saved,
      back: back.to_path_buf(),
    }
  }
}

/// Scoped checkout of a [`WorkingDirectory`].
///
/// On drop the context moves to `back`. The directory in effect before
/// [`WorkingDirectory::enter`] is always what the caller observes afterward:
/// a `back` path that does not lead there is reported and overridden.
#[derive(Debug)]
pub struct DirectoryGuard<'a> {
  context: &'a mut WorkingDirectory,
  saved: PathBuf,
  back: PathBuf,
}

impl DirectoryGuard<'_> {
  /// The directory the guarded command runs in.
  pub fn path(&self) -> &Path {
    &self.context.current
  }
}

impl Drop for DirectoryGuard<'_> {
  fn drop(&mut self) {
    let returned = resolve(&self.context.current, &self.back);
    if returned != self.saved {
      warn!(
        back = %self.back.display(),
        reached = %returned.display(),
        expected = %self.saved.display(),
        "path back does not lead to the previous directory, restoring it directly"
      );
    }
    trace!(to = %self.saved.display(), "leaving directory");
    self.context.current = std::mem::take(&mut self.saved);
  }
}

/// Resolve `path` against `base` without touching the file system.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    normalize(path)
  } else {
    normalize(&base.join(path))
  }
}

/// Lexically remove `.` and `..` components.
///
/// `..` directly under a root or prefix is dropped; leading `..` of a
/// relative path is kept.
pub fn normalize(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => match out.components().next_back() {
        Some(Component::Normal(_)) => {
          out.pop();
        }
        Some(Component::RootDir | Component::Prefix(_)) => {}
        _ => out.push(".."),
      },
      other => out.push(other.as_os_str()),
    }
  }
  out
}
