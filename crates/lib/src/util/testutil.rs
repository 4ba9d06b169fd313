//! Test utilities for eoosmake-lib.
//!
//! A recording [`ProcessRunner`] for pipeline tests, and cross-platform
//! helpers for tests that launch real processes.

use std::io;
use std::path::{Path, PathBuf};

use crate::layout::BuildLayout;
use crate::pipeline::StepContext;
use crate::process::{Invocation, ProcessRunner, ProcessStatus, WorkingDirectory};

/// One command seen by a [`RecordingRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
  pub invocation: Invocation,
  pub cwd: PathBuf,
}

impl RecordedCall {
  /// The full command line, program first.
  pub fn argv(&self) -> Vec<&str> {
    std::iter::once(self.invocation.program())
      .chain(self.invocation.arguments().iter().map(String::as_str))
      .collect()
  }
}

/// Records every command instead of running it.
///
/// Succeeds unless the program matches the configured failure.
#[derive(Debug, Default)]
pub struct RecordingRunner {
  calls: Vec<RecordedCall>,
  failure: Option<(String, i32)>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fail every invocation of `program` (matched by file name) with `code`.
  pub fn failing_on(program: &str, code: i32) -> Self {
    Self {
      calls: Vec::new(),
      failure: Some((program.to_string(), code)),
    }
  }

  pub fn calls(&self) -> &[RecordedCall] {
    &self.calls
  }

  /// Rendered command lines, in call order.
  pub fn commands(&self) -> Vec<String> {
    self.calls.iter().map(|call| call.invocation.to_string()).collect()
  }
}

impl ProcessRunner for RecordingRunner {
  fn run(&mut self, invocation: &Invocation, cwd: &Path) -> io::Result<ProcessStatus> {
    self.calls.push(RecordedCall {
      invocation: invocation.clone(),
      cwd: cwd.to_path_buf(),
    });

    let file_name = Path::new(invocation.program())
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default();
    match &self.failure {
      Some((program, code)) if *program == file_name => Ok(ProcessStatus::from_code(*code)),
      _ => Ok(ProcessStatus::from_code(0)),
    }
  }
}

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns the command and args to create a marker file in the current directory.
#[cfg(unix)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  ("/usr/bin/touch", vec![filename.to_string()])
}

#[cfg(windows)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  (
    "powershell.exe",
    vec![
      "-NoProfile".to_string(),
      "-Command".to_string(),
      format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename),
    ],
  )
}

/// Create the directory skeleton the location check expects and return
/// the script directory inside it.
pub fn source_tree(root: &Path) -> PathBuf {
  let script_dir = root.join("scripts").join("python");
  std::fs::create_dir_all(&script_dir).unwrap();
  std::fs::create_dir_all(root.join("codebase")).unwrap();
  script_dir
}

#[cfg(unix)]
const SCRIPT_DIR: &str = "/work/eoos/scripts/python";
#[cfg(windows)]
const SCRIPT_DIR: &str = r"C:\work\eoos\scripts\python";

/// Everything a strategy step needs, backed by a [`RecordingRunner`].
///
/// The layout points at a fixed path that does not have to exist.
pub struct StepHarness {
  pub runner: RecordingRunner,
  pub workdir: WorkingDirectory,
  pub layout: BuildLayout,
}

impl StepHarness {
  pub fn new() -> Self {
    Self::with_runner(RecordingRunner::new())
  }

  pub fn with_runner(runner: RecordingRunner) -> Self {
    Self {
      runner,
      workdir: WorkingDirectory::new(SCRIPT_DIR),
      layout: BuildLayout::from_script_dir(SCRIPT_DIR),
    }
  }

  pub fn ctx(&mut self) -> StepContext<'_> {
    StepContext::new(&mut self.runner, &mut self.workdir, &self.layout)
  }
}
