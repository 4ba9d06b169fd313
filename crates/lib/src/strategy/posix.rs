//! Native build on a POSIX host with CMake and make.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{PlatformStrategy, make_all};
use crate::config::{BuildConfiguration, BuildScope, Definition, Target};
use crate::error::PipelineError;
use crate::pipeline::StepContext;
use crate::process::Invocation;

const ENABLE_TESTS: &str = "-DEOOS_CMAKE_ENABLE_TESTS=ON";
const ENABLE_GCC_COVERAGE: &str = "-DEOOS_CMAKE_ENABLE_GCC_COVERAGE=ON";

#[derive(Debug, Default, Clone, Copy)]
pub struct Posix;

impl Posix {
  fn configure(&self, config: &BuildConfiguration, scope: BuildScope) -> Invocation {
    let mut args = vec![format!("-DCMAKE_BUILD_TYPE={}", config.config)];
    if scope == BuildScope::All {
      args.push(ENABLE_TESTS.to_string());
      if config.coverage {
        args.push(ENABLE_GCC_COVERAGE.to_string());
      }
    }
    args.extend(config.definitions.iter().map(Definition::to_arg));
    args.push("..".to_string());
    Invocation::new("cmake").args(args)
  }
}

impl PlatformStrategy for Posix {
  fn target(&self) -> Target {
    Target::Posix
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

    info!("building Make project");
    ctx.run_from_build_dir(&make_all(config))
  }

  fn install(&self, _config: &BuildConfiguration, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
    info!("installing the library");
    ctx.run_from_build_dir(&Invocation::new("sudo").args(["make", "install"]))
  }

  fn coverage(&self, _config: &BuildConfiguration, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
    info!("generating code coverage report");
    ctx.run_from_build_dir(&Invocation::new("make").arg("coverage"))
  }

  fn test_executable_path_to(&self, _config: &BuildConfiguration) -> PathBuf {
    Path::new("codebase").join("tests")
  }

  fn test_executable_path_back(&self, _config: &BuildConfiguration) -> PathBuf {
    Path::new("..").join("..")
  }

  fn test_executable_name(&self) -> &'static str {
    "EoosTests"
  }
}
