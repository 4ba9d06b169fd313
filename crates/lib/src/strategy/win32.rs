//! Native build on a Windows host with the CMake multi-config generators.
//!
//! Multi-config generators put binaries under a folder named after the
//! build configuration, so the test binary location depends on it.

use std::path::{Path, PathBuf};

use tracing::info;

use super::PlatformStrategy;
use crate::config::{BuildConfiguration, BuildScope, Definition, Target};
use crate::error::PipelineError;
use crate::pipeline::StepContext;
use crate::process::Invocation;

const ENABLE_TESTS: &str = "-DEOOS_ENABLE_TESTS=ON";
const COVERAGE_TOOL: &str = "OpenCppCoverage.exe";
/// Source roots measured by the coverage report, relative to the source root.
const COVERAGE_SOURCES: [&str; 3] = ["interface", "library", "system"];

#[derive(Debug, Default, Clone, Copy)]
pub struct Win32;

impl Win32 {
  fn configure(&self, config: &BuildConfiguration, scope: BuildScope) -> Invocation {
    let mut args = Vec::new();
    if scope == BuildScope::All {
      args.push(ENABLE_TESTS.to_string());
    }
    args.extend(config.definitions.iter().map(Definition::to_arg));
    args.push("..".to_string());
    Invocation::new("cmake").args(args)
  }

  fn compile(&self, config: &BuildConfiguration) -> Invocation {
    let mut args = vec![
      "--build".to_string(),
      ".".to_string(),
      "--config".to_string(),
      config.config.to_string(),
    ];
    if let Some(jobs) = config.jobs {
      args.push("-j".to_string());
      args.push(jobs.to_string());
    }
    if config.verbose {
      args.push("--verbose".to_string());
    }
    Invocation::new("cmake").args(args)
  }
}

impl PlatformStrategy for Win32 {
  fn target(&self) -> Target {
    Target::Win32
  }

  fn build(&self, config: &BuildConfiguration, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
    let Some(scope) = config.build else {
      return Ok(());
    };
    match scope {
      BuildScope::All => info!("generating CMake project for all targets"),
      BuildScope::Eoos => info!("generating CMake project for the EOOS target"),
    }
    ctx.run_from_build_dir(&self.configure(config, scope))?;

    info!("building CMake project");
    ctx.run_from_build_dir(&self.compile(config))
  }

  fn install(&self, config: &BuildConfiguration, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
    info!("installing the library");
    let invocation = Invocation::new("cmake").args(["--install", ".", "--config", config.config.as_str()]);
    ctx.run_from_build_dir(&invocation)
  }

  /// Re-run the unit tests under OpenCppCoverage and export an HTML report.
  ///
  /// Runs from the source root; the test binary and report paths come from
  /// the build layout, the same place [`PlatformStrategy::run`] takes them.
  fn coverage(&self, config: &BuildConfiguration, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
    info!("generating code coverage report");
    let layout = ctx.layout();
    let executable = layout
      .root()
      .join(self.test_executable_path_to(config))
      .join(self.test_executable_name());

    let mut args = Vec::new();
    for source in COVERAGE_SOURCES {
      args.push("--sources".to_string());
      args.push(Path::new("codebase").join(source).display().to_string());
    }
    args.push("--export_type".to_string());
    args.push(format!("html:{}", layout.coverage_dir().display()));
    args.push("--".to_string());
    args.push(executable.display().to_string());

    let to = layout.source_root().to_path_buf();
    let back = layout.script_dir_from_source_root();
    ctx.run_from_directory(&Invocation::new(COVERAGE_TOOL).args(args), &to, &back)
  }

  fn test_executable_path_to(&self, config: &BuildConfiguration) -> PathBuf {
    Path::new("codebase").join("tests").join(config.config.as_str())
  }

  fn test_executable_path_back(&self, _config: &BuildConfiguration) -> PathBuf {
    Path::new("..").join("..").join("..")
  }

  fn test_executable_name(&self) -> &'static str {
    "EoosTests.exe"
  }
}
