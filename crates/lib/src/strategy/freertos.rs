//! Cross-compilation for a Cortex-M3 running FreeRTOS.
//!
//! Produces firmware only: nothing can be installed, run or measured on
//! the host, and the library cannot be built without its test image yet.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{PlatformStrategy, make_all};
use crate::config::{BuildConfiguration, BuildScope, Definition, Target};
use crate::error::{Capability, PipelineError};
use crate::pipeline::StepContext;
use crate::process::Invocation;

/// Toolchain description, relative to the build root.
const TOOLCHAIN_FILE: &str = "../cmake/Toolchain.cortex-m3.gcc.cmake";

#[derive(Debug, Default, Clone, Copy)]
pub struct FreeRtos;

impl FreeRtos {
  fn configure(&self, config: &BuildConfiguration) -> Invocation {
    let mut args = vec![
      format!("-DCMAKE_TOOLCHAIN_FILE={TOOLCHAIN_FILE}"),
      format!("-DCMAKE_BUILD_TYPE={}", config.config),
    ];
    args.extend(config.definitions.iter().map(Definition::to_arg));
    args.push("..".to_string());
    Invocation::new("cmake").args(args)
  }

  fn unsupported(&self, capability: Capability) -> PipelineError {
    PipelineError::unsupported(self.target(), capability)
  }
}

impl PlatformStrategy for FreeRtos {
  fn target(&self) -> Target {
    Target::FreeRtos
  }

  fn build(&self, config: &BuildConfiguration, ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
    match config.build {
      None => return Ok(()),
      Some(BuildScope::Eoos) => return Err(self.unsupported(Capability::ComponentBuild)),
      Some(BuildScope::All) => info!("generating CMake project for all targets"),
    }
    ctx.run_from_build_dir(&self.configure(config))?;

    info!("building Make project");
    ctx.run_from_build_dir(&make_all(config))
  }

  fn install(&self, _config: &BuildConfiguration, _ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
    Err(self.unsupported(Capability::Install))
  }

  fn run(&self, _config: &BuildConfiguration, _ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
    Err(self.unsupported(Capability::Run))
  }

  fn coverage(&self, _config: &BuildConfiguration, _ctx: &mut StepContext<'_>) -> Result<(), PipelineError> {
    Err(self.unsupported(Capability::Coverage))
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
