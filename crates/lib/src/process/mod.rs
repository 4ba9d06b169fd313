//! External process execution.
//!
//! Every tool the pipeline drives (CMake, make, the unit test binary, the
//! coverage tool) is launched through a [`ProcessRunner`]. Commands run to
//! completion one at a time; there are no timeouts and no retries.

pub mod directory;

use std::fmt;
use std::io;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

pub use directory::{DirectoryGuard, WorkingDirectory};

use crate::error::PipelineError;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  program: String,
  args: Vec<String>,
}

impl Invocation {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  pub fn arguments(&self) -> &[String] {
    &self.args
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.program)?;
    for arg in &self.args {
      write!(f, " {arg}")?;
    }
    Ok(())
  }
}

/// How a finished process exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {
  /// `None` when the process was terminated by a signal.
  pub code: Option<i32>,
}

impl ProcessStatus {
  pub fn from_code(code: i32) -> Self {
    Self { code: Some(code) }
  }

  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Launches external commands and waits for them to exit.
pub trait ProcessRunner {
  /// Run `invocation` with `cwd` as its working directory.
  ///
  /// An `Err` means the process could not be started at all.
  fn run(&mut self, invocation: &Invocation, cwd: &Path) -> io::Result<ProcessStatus>;
}

/// Runs commands on the host, inheriting stdin, stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
  fn run(&mut self, invocation: &Invocation, cwd: &Path) -> io::Result<ProcessStatus> {
    debug!(command = %invocation, cwd = %cwd.display(), "spawning process");

    let status = Command::new(invocation.program())
      .args(invocation.arguments())
      .current_dir(cwd)
      .status()?;

    debug!(command = %invocation, code = ?status.code(), "process exited");
    Ok(ProcessStatus { code: status.code() })
  }
}

/// Run `invocation` from `to`, then return along `back`.
///
/// The working directory is restored even when the command cannot be
/// started or exits unsuccessfully. A non-zero exit becomes
/// [`PipelineError::CmdFailed`] carrying that exact code.
pub fn run_from_directory(
  runner: &mut dyn ProcessRunner,
  workdir: &mut WorkingDirectory,
  invocation: &Invocation,
  to: &Path,
  back: &Path,
) -> Result<(), PipelineError> {
  let status = {
    let guard = workdir.enter(to, back);
    info!(command = %invocation, "running");
    runner
      .run(invocation, guard.path())
      .map_err(|source| PipelineError::Spawn {
        program: invocation.program().to_string(),
        source,
      })?
  };

  if !status.success() {
    return Err(PipelineError::CmdFailed {
      command: invocation.to_string(),
      code: status.code,
    });
  }
  Ok(())
}
