//! The build lifecycle command.
//!
//! Turns command-line flags into a [`BuildConfiguration`], picks the
//! platform strategy and runs the pipeline from the script directory.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use tracing::debug;

use eoosmake_lib::config::{BuildConfiguration, BuildScope, ConfigName, Definition, Target};
use eoosmake_lib::consts::PROGRAM_NAME;
use eoosmake_lib::error::PipelineError;
use eoosmake_lib::layout::BuildLayout;
use eoosmake_lib::pipeline::{BuildPipeline, PipelineResult};
use eoosmake_lib::platform::host_os;
use eoosmake_lib::process::SystemRunner;
use eoosmake_lib::strategy;

use crate::output::{
  OutputFormat, format_seconds, print_block, print_error, print_info, print_json, print_success, print_warning,
};

#[derive(Debug, Args)]
pub struct MakeArgs {
  /// Target platform: posix, win32 or freertos (default: detected from the host)
  #[arg(long)]
  target: Option<Target>,

  /// Rebuild the project by removing the "build" directory
  #[arg(short, long)]
  clean: bool,

  /// Compile the project: EOOS or ALL
  #[arg(short, long, value_name = "SCOPE")]
  build: Option<BuildScope>,

  /// Run unit tests
  #[arg(short, long)]
  run: bool,

  /// Run unit tests and create code coverage report
  #[arg(long)]
  coverage: bool,

  /// Install on OS
  #[arg(long)]
  install: bool,

  /// Project configuration: Release, Debug, RelWithDebInfo or MinSizeRel
  #[arg(long, default_value_t = ConfigName::Debug)]
  config: ConfigName,

  /// Number of parallel jobs to build
  #[arg(short, long)]
  jobs: Option<NonZeroU32>,

  /// Verbose compiler output
  #[arg(long)]
  verbose: bool,

  /// CMake cache entry in <var>:<type>=<value> or <var>=<value> format (repeatable)
  #[arg(short = 'd', long = "define", value_name = "DEFINITION", action = ArgAction::Append)]
  definitions: Vec<Definition>,

  /// Unit test name pattern (repeatable); all patterns form one filter
  #[arg(short = 'f', long = "filter", value_name = "PATTERN", action = ArgAction::Append)]
  filters: Vec<String>,

  /// Directory the tool is run from (default: current directory)
  #[arg(long, value_name = "DIR")]
  script_dir: Option<PathBuf>,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,
}

pub fn cmd_make(args: MakeArgs) -> Result<ExitCode> {
  let json = args.output.is_json();
  let host = host_os();

  let target = match args.target {
    Some(target) => target,
    None => Target::for_host(host).ok_or_else(|| PipelineError::UnknownHost(std::env::consts::OS.to_string()))?,
  };

  let script_dir = match args.script_dir {
    Some(dir) => dir,
    None => std::env::current_dir().context("Failed to read current directory")?,
  };
  let script_dir = dunce::canonicalize(&script_dir)
    .with_context(|| format!("Failed to resolve script directory: {}", script_dir.display()))?;
  debug!(script_dir = %script_dir.display(), %target, "resolved invocation");

  let config = BuildConfiguration {
    target,
    clean: args.clean,
    build: args.build,
    run: args.run,
    install: args.install,
    coverage: args.coverage,
    config: args.config,
    jobs: args.jobs,
    verbose: args.verbose,
    definitions: args.definitions,
    filters: Vec::new(),
  }
  .with_filters(args.filters)
  .context("Invalid test filter")?;

  if !json {
    print_success(&format!("Welcome to {PROGRAM_NAME}"));
    print_arguments(&config);
  }

  let strategy = strategy::for_target(target, host)?;
  let layout = BuildLayout::from_script_dir(&script_dir);
  let mut pipeline = BuildPipeline::new(&config, strategy, layout, SystemRunner);
  let result = pipeline.execute();

  if json {
    print_json(&result)?;
  } else {
    print_result(&result);
  }

  Ok(ExitCode::from(result.exit_code()))
}

fn print_arguments(config: &BuildConfiguration) {
  print_info(&format!("Argument TARGET: {}", config.target));
  if config.clean {
    print_info("Argument CLEAN: true");
  }
  if let Some(scope) = config.build {
    print_info(&format!("Argument BUILD: {scope}"));
  }
  if config.run {
    print_info("Argument RUN: true");
  }
  if config.coverage {
    print_info("Argument COVERAGE: true");
  }
  if config.install {
    print_info("Argument INSTALL: true");
  }
  print_info(&format!("Argument CONFIG: {}", config.config));
  if let Some(jobs) = config.jobs {
    print_info(&format!("Argument JOBS: {jobs}"));
  }
  if config.verbose {
    print_info("Argument VERBOSE: true");
  }
  for (i, definition) in config.definitions.iter().enumerate() {
    print_info(&format!("Argument DEFINE {i}: {definition}"));
  }
  if let Some(filter) = config.filter_expression() {
    print_info(&format!("Argument FILTER: {filter}"));
  }
  if config.install && config.target == Target::Win32 {
    print_warning("To install EOOS on Windows, a console has to be run as Administrator.");
  }
}

fn print_result(result: &PipelineResult) {
  if let Some(failure) = &result.failure {
    print_error(&failure.to_string());
  }
  let not_word = if result.success { "" } else { " NOT" };
  print_block(
    &format!(
      "{PROGRAM_NAME} has{not_word} been completed in {}",
      format_seconds(result.elapsed)
    ),
    result.success,
  );
}
