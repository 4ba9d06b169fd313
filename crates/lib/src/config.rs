//! Build configuration supplied by the caller.
//!
//! A [`BuildConfiguration`] is assembled once (usually from command-line
//! flags) and is only read by the pipeline and the platform strategies.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::consts::TEST_FILTER_SEPARATOR;
use crate::platform::Os;

/// Errors produced while parsing configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("unknown target '{0}' (expected one of: posix, win32, freertos)")]
  UnknownTarget(String),

  #[error("unknown build scope '{0}' (expected one of: EOOS, ALL)")]
  UnknownScope(String),

  #[error("unknown configuration '{0}' (expected one of: Release, Debug, RelWithDebInfo, MinSizeRel)")]
  UnknownConfigName(String),

  #[error("invalid definition '{0}' (expected <var>=<value> or <var>:<type>=<value>)")]
  InvalidDefinition(String),

  #[error("test filter patterns must not be empty")]
  EmptyFilter,
}

/// Platform the project is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
  #[default]
  Posix,
  Win32,
  FreeRtos,
}

impl Target {
  pub const ALL: [Target; 3] = [Target::Posix, Target::Win32, Target::FreeRtos];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Posix => "posix",
      Self::Win32 => "win32",
      Self::FreeRtos => "freertos",
    }
  }

  /// Target picked when none is given explicitly.
  ///
  /// Returns `None` for hosts no native target exists for.
  pub fn for_host(host: Option<Os>) -> Option<Self> {
    match host? {
      Os::Linux | Os::MacOs => Some(Self::Posix),
      Os::Windows => Some(Self::Win32),
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Target {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "posix" => Ok(Self::Posix),
      "win32" => Ok(Self::Win32),
      "freertos" => Ok(Self::FreeRtos),
      _ => Err(ConfigError::UnknownTarget(s.to_string())),
    }
  }
}

/// What the build step compiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuildScope {
  /// The EOOS library only.
  #[serde(rename = "EOOS")]
  Eoos,
  /// Everything, unit tests included.
  #[serde(rename = "ALL")]
  All,
}

impl BuildScope {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Eoos => "EOOS",
      Self::All => "ALL",
    }
  }
}

impl fmt::Display for BuildScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for BuildScope {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_uppercase().as_str() {
      "EOOS" => Ok(Self::Eoos),
      "ALL" => Ok(Self::All),
      _ => Err(ConfigError::UnknownScope(s.to_string())),
    }
  }
}

/// CMake build configuration name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ConfigName {
  Release,
  #[default]
  Debug,
  RelWithDebInfo,
  MinSizeRel,
}

impl ConfigName {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Release => "Release",
      Self::Debug => "Debug",
      Self::RelWithDebInfo => "RelWithDebInfo",
      Self::MinSizeRel => "MinSizeRel",
    }
  }
}

impl fmt::Display for ConfigName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ConfigName {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    [Self::Release, Self::Debug, Self::RelWithDebInfo, Self::MinSizeRel]
      .into_iter()
      .find(|name| name.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| ConfigError::UnknownConfigName(s.to_string()))
  }
}

/// A raw CMake cache entry forwarded verbatim to the configure step.
///
/// Accepted forms are `<var>=<value>` and `<var>:<type>=<value>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Definition(String);

impl Definition {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The definition as a configure argument, e.g. `-DFOO=ON`.
  pub fn to_arg(&self) -> String {
    format!("-D{}", self.0)
  }
}

impl fmt::Display for Definition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for Definition {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || ConfigError::InvalidDefinition(s.to_string());
    let (key, _value) = s.split_once('=').ok_or_else(invalid)?;
    let var = match key.split_once(':') {
      Some((_, ty)) if ty.is_empty() => return Err(invalid()),
      Some((var, _)) => var,
      None => key,
    };
    if var.is_empty() || var.chars().any(char::is_whitespace) {
      return Err(invalid());
    }
    Ok(Self(s.to_string()))
  }
}

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildConfiguration {
  pub target: Target,
  /// Remove the build root before anything else.
  pub clean: bool,
  /// `None` skips the build step.
  pub build: Option<BuildScope>,
  pub run: bool,
  pub install: bool,
  pub coverage: bool,
  pub config: ConfigName,
  pub jobs: Option<NonZeroU32>,
  /// Verbose compiler output.
  pub verbose: bool,
  pub definitions: Vec<Definition>,
  pub filters: Vec<String>,
}

impl BuildConfiguration {
  /// Validate and attach test name filter patterns.
  pub fn with_filters<I, S>(mut self, filters: I) -> Result<Self, ConfigError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    for filter in filters {
      let filter = filter.into();
      if filter.trim().is_empty() {
        return Err(ConfigError::EmptyFilter);
      }
      self.filters.push(filter);
    }
    Ok(self)
  }

  /// Joins the requested filter patterns into a single expression.
  ///
  /// Returns `None` when no patterns were requested.
  pub fn filter_expression(&self) -> Option<String> {
    if self.filters.is_empty() {
      None
    } else {
      Some(self.filters.join(TEST_FILTER_SEPARATOR))
    }
  }
}
