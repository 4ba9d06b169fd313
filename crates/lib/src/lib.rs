//! eoosmake-lib: the build pipeline behind `eoosmake`.
//!
//! This crate drives CMake-based builds of the EOOS sources:
//! - `BuildConfiguration`: what the caller asked for
//! - `BuildLayout`: the generated build tree next to the sources
//! - `PlatformStrategy`: how each lifecycle step is done on one platform
//! - `BuildPipeline`: runs the lifecycle and reports a `PipelineResult`

pub mod config;
pub mod consts;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod strategy;
pub mod util;
