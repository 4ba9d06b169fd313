//! Platform strategies.
//!
//! A [`PlatformStrategy`] supplies the platform-specific half of each
//! lifecycle step: which toolchain arguments configure the project, how it
//! is compiled and installed, where the unit test binary ends up, and how
//! coverage is produced. The pipeline picks one strategy per run and never
//! switches it.

mod freertos;
mod posix;
mod win32;

use std::path::{Path, PathBuf};

use tracing::info;

pub use freertos::FreeRtos;
pub use posix::Posix;
pub use win32::Win32;

use crate::config::{BuildConfiguration, Target};
use crate::error::PipelineError;
use crate::pipeline::StepContext;
use crate::platform::{Os, host_supports};
use crate::process::Invocation;

/// Platform-specific lifecycle steps.
///
/// The pipeline only calls a step when the configuration requests it.
/// Steps a platform cannot perform fail with
/// [`PipelineError::Unsupported`] without launching anything.
pub trait PlatformStrategy {
  fn target(&self) -> Target;

  /// Configure the project, then compile it.
  fn build(&self, config: &BuildConfiguration, ctx: &mut StepContext<'_>) -> Result<(), PipelineError>;

  fn install(&self, config: &BuildConfiguration, ctx: &mut StepContext<'_>) -> Result<(), PipelineError>;

  /// Run the unit test binary, narrowed by the configured filters.
  fn run(&self, config: &BuildConfiguration, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
    run_unit_tests(
      ctx,
      config,
      &self.test_executable_path_to(config),
      &self.test_executable_path_back(config),
      self.test_executable_name(),
    )
  }

  fn coverage(&self, config: &BuildConfiguration, ctx: &mut StepContext<'_>) -> Result<(), PipelineError>;

  /// Directory of the unit test binary, relative to the build root.
  fn test_executable_path_to(&self, config: &BuildConfiguration) -> PathBuf;

  /// Path from the unit test directory back to the build root.
  fn test_executable_path_back(&self, config: &BuildConfiguration) -> PathBuf;

  fn test_executable_name(&self) -> &'static str;
}

/// Select the strategy for `target`, checking it can run on `host`.
pub fn for_target(target: Target, host: Option<Os>) -> Result<Box<dyn PlatformStrategy>, PipelineError> {
  if !host_supports(host, target) {
    return Err(PipelineError::UnsupportedHost {
      target,
      host: host.map_or_else(|| std::env::consts::OS.to_string(), |os| os.to_string()),
    });
  }
  Ok(match target {
    Target::Posix => Box::new(Posix),
    Target::Win32 => Box::new(Win32),
    Target::FreeRtos => Box::new(FreeRtos),
  })
}

/// The unit test command line for the binary at `executable`.
pub fn unit_test_invocation(executable: &Path, config: &BuildConfiguration) -> Invocation {
  let invocation = Invocation::new(executable.display().to_string()).arg("--gtest_shuffle");
  match config.filter_expression() {
    Some(filter) => invocation.arg(format!("--gtest_filter={filter}")),
    None => invocation,
  }
}

fn run_unit_tests(
  ctx: &mut StepContext<'_>,
  config: &BuildConfiguration,
  path_to: &Path,
  path_back: &Path,
  name: &str,
) -> Result<(), PipelineError> {
  let test_dir = ctx.layout().root().join(path_to);
  let back = path_back.join(ctx.layout().script_dir_from_root());
  let invocation = unit_test_invocation(&test_dir.join(name), config);

  info!("running unit tests");
  ctx.run_from_directory(&invocation, &test_dir, &back)
}

/// `make all` with the requested verbosity and parallelism.
fn make_all(config: &BuildConfiguration) -> Invocation {
  let mut args = vec!["all".to_string()];
  if config.verbose {
    args.push("VERBOSE=1".to_string());
  }
  if let Some(jobs) = config.jobs {
    args.push("-j".to_string());
    args.push(jobs.to_string());
  }
  Invocation::new("make").args(args)
}
