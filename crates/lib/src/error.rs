//! Pipeline error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::config::Target;

/// A lifecycle capability a platform strategy may not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
  /// Building the EOOS library on its own, without the test targets.
  ComponentBuild,
  Install,
  Run,
  Coverage,
}

impl fmt::Display for Capability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::ComponentBuild => "building the EOOS target alone",
      Self::Install => "installing",
      Self::Run => "running unit tests",
      Self::Coverage => "code coverage",
    };
    f.write_str(name)
  }
}

/// Coarse classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  /// Wrong invocation location, unsupported host, missing tool, file system trouble.
  Environment,
  /// The requested step has no implementation on the active platform.
  Unsupported,
  /// An external tool ran and exited unsuccessfully.
  Subprocess,
}

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(
    "script run directory is wrong: {} not found; run it from the scripts/python directory",
    .missing.display()
  )]
  WrongLocation { missing: PathBuf },

  #[error("target {target} cannot be built on host {host}")]
  UnsupportedHost { target: Target, host: String },

  #[error("no default target for host {0}; select one explicitly")]
  UnknownHost(String),

  #[error("{capability} is not supported on the {target} target")]
  Unsupported { target: Target, capability: Capability },

  #[error("`{command}` failed with exit code {}", display_code(.code))]
  CmdFailed { command: String, code: Option<i32> },

  #[error("failed to launch `{program}`: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to {action} {}: {source}", .path.display())]
  Layout {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

fn display_code(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("[{code}]"),
    None => "[none, terminated by signal]".to_string(),
  }
}

impl PipelineError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Unsupported { .. } => ErrorKind::Unsupported,
      Self::CmdFailed { .. } => ErrorKind::Subprocess,
      Self::WrongLocation { .. }
      | Self::UnsupportedHost { .. }
      | Self::UnknownHost(_)
      | Self::Spawn { .. }
      | Self::Layout { .. } => ErrorKind::Environment,
    }
  }

  /// Exit code of the failed subprocess, if this error carries one.
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      Self::CmdFailed { code, .. } => *code,
      _ => None,
    }
  }

  pub(crate) fn unsupported(target: Target, capability: Capability) -> Self {
    Self::Unsupported { target, capability }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kinds_are_distinct() {
    let unsupported = PipelineError::unsupported(Target::FreeRtos, Capability::Install);
    let failed = PipelineError::CmdFailed {
      command: "make install".to_string(),
      code: Some(2),
    };
    let location = PipelineError::WrongLocation {
      missing: PathBuf::from("../../codebase"),
    };

    assert_eq!(unsupported.kind(), ErrorKind::Unsupported);
    assert_eq!(failed.kind(), ErrorKind::Subprocess);
    assert_eq!(location.kind(), ErrorKind::Environment);
    assert_eq!(failed.exit_code(), Some(2));
    assert_eq!(unsupported.exit_code(), None);
  }

  #[test]
  fn messages_name_the_cause() {
    let unsupported = PipelineError::unsupported(Target::FreeRtos, Capability::Install);
    assert_eq!(unsupported.to_string(), "installing is not supported on the freertos target");

    let failed = PipelineError::CmdFailed {
      command: "make all".to_string(),
      code: Some(2),
    };
    assert_eq!(failed.to_string(), "`make all` failed with exit code [2]");

    let killed = PipelineError::CmdFailed {
      command: "./EoosTests".to_string(),
      code: None,
    };
    assert!(killed.to_string().contains("terminated by signal"));
  }
}
