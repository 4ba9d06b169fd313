//! The build lifecycle.
//!
//! [`BuildPipeline::execute`] walks the steps of [`Step::ALL`] in order.
//! Each step runs only when the configuration asks for it, and the first
//! failing step ends the run. Platform-specific steps are delegated to the
//! pipeline's [`PlatformStrategy`].

pub mod context;
mod result;

use std::time::{Duration, Instant};

use tracing::{debug, info};

pub use context::StepContext;
pub use result::{FailureCause, PipelineResult, Step, StepOutcome, StepRecord};

use crate::config::BuildConfiguration;
use crate::error::PipelineError;
use crate::layout::BuildLayout;
use crate::process::{ProcessRunner, WorkingDirectory};
use crate::strategy::PlatformStrategy;

/// Runs the lifecycle for one configuration and one platform.
pub struct BuildPipeline<'c, R: ProcessRunner> {
  config: &'c BuildConfiguration,
  strategy: Box<dyn PlatformStrategy>,
  layout: BuildLayout,
  workdir: WorkingDirectory,
  runner: R,
}

impl<'c, R: ProcessRunner> BuildPipeline<'c, R> {
  /// Commands start out from the layout's script directory.
  pub fn new(config: &'c BuildConfiguration, strategy: Box<dyn PlatformStrategy>, layout: BuildLayout, runner: R) -> Self {
    let workdir = WorkingDirectory::new(layout.script_dir());
    Self {
      config,
      strategy,
      layout,
      workdir,
      runner,
    }
  }

  pub fn layout(&self) -> &BuildLayout {
    &self.layout
  }

  pub fn working_directory(&self) -> &WorkingDirectory {
    &self.workdir
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  /// Run every requested step and report the outcome.
  ///
  /// Never returns early: a failure in any step, the location check
  /// included, ends up in [`PipelineResult::failure`].
  pub fn execute(&mut self) -> PipelineResult {
    let started = Instant::now();
    let mut result = PipelineResult::start(self.strategy.target());
    info!(target_platform = %self.strategy.target(), "starting build pipeline");

    let failure = self.run_lifecycle(&mut result).err();
    if let Some(cause) = &failure {
      debug!(step = %cause.step, kind = ?cause.kind, "{}", cause.message);
    }

    result.finish(started.elapsed(), failure);
    info!(success = result.success, elapsed = ?result.elapsed, "build pipeline finished");
    result
  }

  fn run_lifecycle(&mut self, result: &mut PipelineResult) -> Result<(), FailureCause> {
    let config = self.config;

    self.step(result, Step::Location, true, |p| p.layout.check_location())?;
    self.step(result, Step::Clean, config.clean, |p| p.layout.clean().map(drop))?;
    self.step(result, Step::Create, true, |p| p.layout.create().map(drop))?;
    self.step(result, Step::Build, config.build.is_some(), |p| {
      p.delegate(|strategy, ctx| strategy.build(config, ctx))
    })?;
    self.step(result, Step::Install, config.install, |p| {
      p.delegate(|strategy, ctx| strategy.install(config, ctx))
    })?;
    self.step(result, Step::Run, config.run, |p| {
      p.delegate(|strategy, ctx| strategy.run(config, ctx))
    })?;
    self.step(result, Step::Coverage, config.coverage, |p| {
      p.delegate(|strategy, ctx| strategy.coverage(config, ctx))
    })
  }

  fn step<F>(&mut self, result: &mut PipelineResult, step: Step, enabled: bool, action: F) -> Result<(), FailureCause>
  where
    F: FnOnce(&mut Self) -> Result<(), PipelineError>,
  {
    if !enabled {
      debug!(%step, "step not requested");
      result.record(step, StepOutcome::Skipped, Duration::ZERO);
      return Ok(());
    }

    debug!(%step, "starting step");
    let started = Instant::now();
    let outcome = action(self);

    match outcome {
      Ok(()) => {
        result.record(step, StepOutcome::Completed, started.elapsed());
        Ok(())
      }
      Err(err) => {
        result.record(step, StepOutcome::Failed, started.elapsed());
        Err(FailureCause::new(step, &err))
      }
    }
  }

  fn delegate<F>(&mut self, action: F) -> Result<(), PipelineError>
  where
    F: FnOnce(&dyn PlatformStrategy, &mut StepContext<'_>) -> Result<(), PipelineError>,
  {
    let mut ctx = StepContext::new(&mut self.runner, &mut self.workdir, &self.layout);
    action(self.strategy.as_ref(), &mut ctx)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{BuildScope, Target};
  use crate::error::ErrorKind;
  use crate::strategy::{FreeRtos, Posix};
  use crate::util::testutil::{RecordingRunner, source_tree};
  use std::fs;
  use tempfile::TempDir;
  use tracing_test::traced_test;

  fn pipeline<'c>(
    temp: &TempDir,
    config: &'c BuildConfiguration,
    strategy: Box<dyn PlatformStrategy>,
    runner: RecordingRunner,
  ) -> BuildPipeline<'c, RecordingRunner> {
    let layout = BuildLayout::from_script_dir(source_tree(temp.path()));
    BuildPipeline::new(config, strategy, layout, runner)
  }

  fn outcomes(result: &PipelineResult) -> Vec<(Step, StepOutcome)> {
    result.steps.iter().map(|record| (record.step, record.outcome)).collect()
  }

  #[test]
  fn no_flags_creates_layout_without_subprocesses() {
    let temp = TempDir::new().unwrap();
    let config = BuildConfiguration::default();
    let mut pipeline = pipeline(&temp, &config, Box::new(Posix), RecordingRunner::new());

    let result = pipeline.execute();

    assert!(result.success, "{:?}", result.failure);
    assert!(pipeline.runner().calls().is_empty());
    assert!(pipeline.layout().install_dir().is_dir());
    assert!(pipeline.layout().sca_dir().is_dir());
    assert_eq!(
      outcomes(&result),
      [
        (Step::Location, StepOutcome::Completed),
        (Step::Clean, StepOutcome::Skipped),
        (Step::Create, StepOutcome::Completed),
        (Step::Build, StepOutcome::Skipped),
        (Step::Install, StepOutcome::Skipped),
        (Step::Run, StepOutcome::Skipped),
        (Step::Coverage, StepOutcome::Skipped),
      ]
    );
  }

  #[test]
  fn clean_without_build_root_succeeds() {
    let temp = TempDir::new().unwrap();
    let config = BuildConfiguration {
      clean: true,
      ..Default::default()
    };
    let mut pipeline = pipeline(&temp, &config, Box::new(Posix), RecordingRunner::new());
    assert!(!pipeline.layout().root().exists());

    let result = pipeline.execute();

    assert!(result.success);
    assert_eq!(result.outcome(Step::Clean), Some(StepOutcome::Completed));
    assert!(pipeline.runner().calls().is_empty());
  }

  #[test]
  fn clean_removes_previous_build_output() {
    let temp = TempDir::new().unwrap();
    let config = BuildConfiguration {
      clean: true,
      ..Default::default()
    };
    let mut pipeline = pipeline(&temp, &config, Box::new(Posix), RecordingRunner::new());
    let stale = pipeline.layout().root().join("CMakeCache.txt");
    pipeline.layout().create().unwrap();
    fs::write(&stale, "stale").unwrap();

    assert!(pipeline.execute().success);
    assert!(!stale.exists());
    assert!(pipeline.layout().install_dir().is_dir());
  }

  #[test]
  fn steps_run_in_lifecycle_order() {
    let temp = TempDir::new().unwrap();
    let config = BuildConfiguration {
      build: Some(BuildScope::All),
      install: true,
      run: true,
      coverage: true,
      ..Default::default()
    };
    let mut pipeline = pipeline(&temp, &config, Box::new(Posix), RecordingRunner::new());

    let result = pipeline.execute();

    assert!(result.success, "{:?}", result.failure);
    let programs: Vec<_> = pipeline
      .runner()
      .calls()
      .iter()
      .map(|call| call.argv()[..2].join(" "))
      .collect();
    let test_binary = pipeline.layout().root().join("codebase/tests/EoosTests");
    assert_eq!(
      programs,
      [
        "cmake -DCMAKE_BUILD_TYPE=Debug".to_string(),
        "make all".to_string(),
        "sudo make".to_string(),
        format!("{} --gtest_shuffle", test_binary.display()),
        "make coverage".to_string(),
      ]
    );
    let recorded: Vec<_> = result.steps.iter().map(|record| record.step).collect();
    assert_eq!(recorded, Step::ALL);
    assert_eq!(pipeline.working_directory().current(), pipeline.layout().script_dir());
  }

  #[test]
  #[traced_test]
  fn failed_subprocess_stops_the_run() {
    let temp = TempDir::new().unwrap();
    let config = BuildConfiguration {
      build: Some(BuildScope::All),
      install: true,
      run: true,
      ..Default::default()
    };
    let mut pipeline = pipeline(&temp, &config, Box::new(Posix), RecordingRunner::failing_on("make", 2));

    let result = pipeline.execute();

    assert!(!result.success);
    assert_eq!(result.exit_code(), 1);
    let failure = result.failure.as_ref().unwrap();
    assert_eq!(failure.step, Step::Build);
    assert_eq!(failure.kind, ErrorKind::Subprocess);
    assert_eq!(failure.exit_code, Some(2));
    assert_eq!(result.outcome(Step::Build), Some(StepOutcome::Failed));
    assert_eq!(result.outcome(Step::Install), None);
    assert_eq!(result.outcome(Step::Run), None);

    assert_eq!(pipeline.runner().commands().len(), 2);
    assert_eq!(pipeline.working_directory().current(), pipeline.layout().script_dir());
    assert!(logs_contain("failed with exit code [2]"));
  }

  #[test]
  fn working_directory_is_restored_whichever_step_fails() {
    let config = BuildConfiguration {
      build: Some(BuildScope::All),
      install: true,
      run: true,
      coverage: true,
      ..Default::default()
    };
    let cases = [
      ("cmake", Step::Build),
      ("sudo", Step::Install),
      ("EoosTests", Step::Run),
    ];
    for (program, failing_step) in cases {
      let temp = TempDir::new().unwrap();
      let mut pipeline = pipeline(&temp, &config, Box::new(Posix), RecordingRunner::failing_on(program, 3));

      let result = pipeline.execute();

      let failure = result.failure.as_ref().unwrap();
      assert_eq!(failure.step, failing_step, "{program}");
      assert_eq!(failure.exit_code, Some(3));
      assert_eq!(pipeline.working_directory().current(), pipeline.layout().script_dir(), "{program}");
    }
  }

  #[test]
  fn unsupported_install_launches_nothing() {
    let temp = TempDir::new().unwrap();
    let config = BuildConfiguration {
      target: Target::FreeRtos,
      install: true,
      ..Default::default()
    };
    let mut pipeline = pipeline(&temp, &config, Box::new(FreeRtos), RecordingRunner::new());

    let result = pipeline.execute();

    let failure = result.failure.as_ref().unwrap();
    assert_eq!(failure.step, Step::Install);
    assert_eq!(failure.kind, ErrorKind::Unsupported);
    assert_eq!(failure.exit_code, None);
    assert!(pipeline.runner().calls().is_empty());
  }

  #[test]
  fn filters_reach_the_test_binary_as_one_argument() {
    let temp = TempDir::new().unwrap();
    let config = BuildConfiguration {
      build: Some(BuildScope::All),
      run: true,
      ..Default::default()
    }
    .with_filters(["Suite.CaseA", "Suite.CaseB"])
    .unwrap();
    let mut pipeline = pipeline(&temp, &config, Box::new(Posix), RecordingRunner::new());

    assert!(pipeline.execute().success);

    let run = pipeline.runner().calls().last().unwrap();
    let filters: Vec<_> = run
      .invocation
      .arguments()
      .iter()
      .filter(|arg| arg.starts_with("--gtest_filter"))
      .collect();
    assert_eq!(filters, ["--gtest_filter=Suite.CaseA:Suite.CaseB"]);
  }

  #[test]
  fn wrong_location_touches_nothing() {
    let temp = TempDir::new().unwrap();
    let script_dir = temp.path().join("scripts").join("python");
    let build_root = temp.path().join("build");
    fs::create_dir_all(&script_dir).unwrap();
    fs::create_dir_all(&build_root).unwrap();
    let config = BuildConfiguration {
      clean: true,
      build: Some(BuildScope::All),
      ..Default::default()
    };
    let layout = BuildLayout::from_script_dir(&script_dir);
    let mut pipeline = BuildPipeline::new(&config, Box::new(Posix), layout, RecordingRunner::new());

    let result = pipeline.execute();

    let failure = result.failure.as_ref().unwrap();
    assert_eq!(failure.step, Step::Location);
    assert_eq!(failure.kind, ErrorKind::Environment);
    assert_eq!(outcomes(&result), [(Step::Location, StepOutcome::Failed)]);
    assert!(build_root.is_dir());
    assert!(pipeline.runner().calls().is_empty());
  }
}
