use std::path::Path;

use crate::error::PipelineError;
use crate::layout::BuildLayout;
use crate::process::{self, Invocation, ProcessRunner, WorkingDirectory};

/// What a platform strategy gets to work with during one step.
///
/// Strategies see the layout read-only and launch commands only through
/// [`StepContext::run_from_build_dir`] and
/// [`StepContext::run_from_directory`], so the working directory is always
/// back where it was when a step returns.
pub struct StepContext<'a> {
  runner: &'a mut dyn ProcessRunner,
  workdir: &'a mut WorkingDirectory,
  layout: &'a BuildLayout,
}

impl<'a> StepContext<'a> {
  pub fn new(runner: &'a mut dyn ProcessRunner, workdir: &'a mut WorkingDirectory, layout: &'a BuildLayout) -> Self {
    Self {
      runner,
      workdir,
      layout,
    }
  }

  pub fn layout(&self) -> &BuildLayout {
    self.layout
  }

  /// Run from the build root, returning to the script directory.
  pub fn run_from_build_dir(&mut self, invocation: &Invocation) -> Result<(), PipelineError> {
    let to = self.layout.root().to_path_buf();
    let back = self.layout.script_dir_from_root();
    self.run_from_directory(invocation, &to, &back)
  }

  /// Run from `to`, then return along `back` (relative to `to`).
  pub fn run_from_directory(&mut self, invocation: &Invocation, to: &Path, back: &Path) -> Result<(), PipelineError> {
    process::run_from_directory(&mut *self.runner, &mut *self.workdir, invocation, to, back)
  }
}
