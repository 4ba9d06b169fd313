//! Outcome of one pipeline run.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::config::Target;
use crate::consts::FAILURE_EXIT_CODE;
use crate::error::{ErrorKind, PipelineError};

/// Lifecycle steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
  Location,
  Clean,
  Create,
  Build,
  Install,
  Run,
  Coverage,
}

impl Step {
  pub const ALL: [Step; 7] = [
    Step::Location,
    Step::Clean,
    Step::Create,
    Step::Build,
    Step::Install,
    Step::Run,
    Step::Coverage,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Location => "location",
      Self::Clean => "clean",
      Self::Create => "create",
      Self::Build => "build",
      Self::Install => "install",
      Self::Run => "run",
      Self::Coverage => "coverage",
    }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
  Completed,
  /// Not requested by the configuration.
  Skipped,
  Failed,
}

/// One lifecycle step the pipeline reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
  pub step: Step,
  pub outcome: StepOutcome,
  #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
  pub elapsed: Duration,
}

/// The single reason a run failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureCause {
  pub step: Step,
  pub kind: ErrorKind,
  pub message: String,
  /// Exit code of the failed subprocess, for subprocess failures.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub exit_code: Option<i32>,
}

impl FailureCause {
  pub fn new(step: Step, error: &PipelineError) -> Self {
    Self {
      step,
      kind: error.kind(),
      message: error.to_string(),
      exit_code: error.exit_code(),
    }
  }
}

impl fmt::Display for FailureCause {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} step failed: {}", self.step, self.message)
  }
}

/// Result of [`BuildPipeline::execute`](super::BuildPipeline::execute).
///
/// Created when the run starts and finalized exactly once when it ends.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
  pub target: Target,
  pub success: bool,
  #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
  pub elapsed: Duration,
  pub failure: Option<FailureCause>,
  pub steps: Vec<StepRecord>,
}

impl PipelineResult {
  pub(crate) fn start(target: Target) -> Self {
    Self {
      target,
      success: false,
      elapsed: Duration::ZERO,
      failure: None,
      steps: Vec::new(),
    }
  }

  pub(crate) fn record(&mut self, step: Step, outcome: StepOutcome, elapsed: Duration) {
    self.steps.push(StepRecord { step, outcome, elapsed });
  }

  pub(crate) fn finish(&mut self, elapsed: Duration, failure: Option<FailureCause>) {
    self.elapsed = elapsed;
    self.success = failure.is_none();
    self.failure = failure;
  }

  /// Process exit status for this result.
  pub fn exit_code(&self) -> u8 {
    if self.success { 0 } else { FAILURE_EXIT_CODE }
  }

  /// Outcome of `step`, or `None` if the run never reached it.
  pub fn outcome(&self, step: Step) -> Option<StepOutcome> {
    self.steps.iter().find(|record| record.step == step).map(|record| record.outcome)
  }
}

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_f64(duration.as_secs_f64())
}
