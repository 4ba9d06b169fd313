//! Console output for eoosmake.
//!
//! Status lines carry a colored symbol; the run summary is a colored block
//! between two rules. Colors are dropped when the stream is not a terminal
//! or `NO_COLOR` is set.

use std::fmt::Display;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{AnsiColors, OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
}

const RULE_WIDTH: usize = 72;

/// Elapsed time in seconds, millisecond precision.
pub fn format_seconds(duration: Duration) -> String {
  format!("{:.3} seconds", duration.as_secs_f64())
}

fn paint<T: Display>(text: &T, stream: Stream, color: AnsiColors) -> impl Display + '_ {
  text.if_supports_color(stream, move |s| s.color(color))
}

pub fn print_success(message: &str) {
  println!("{} {}", paint(&symbols::SUCCESS, Stream::Stdout, AnsiColors::Green), message);
}

pub fn print_info(message: &str) {
  println!("{} {}", paint(&symbols::INFO, Stream::Stdout, AnsiColors::Blue), message);
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    paint(&symbols::ERROR, Stream::Stderr, AnsiColors::Red),
    paint(&message, Stream::Stderr, AnsiColors::Red)
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    paint(&symbols::WARNING, Stream::Stderr, AnsiColors::Yellow),
    paint(&message, Stream::Stderr, AnsiColors::Yellow)
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

/// Print `message` between two horizontal rules, green or red.
pub fn print_block(message: &str, success: bool) {
  let color = if success { AnsiColors::Green } else { AnsiColors::Red };
  let rule = "=".repeat(RULE_WIDTH);
  println!();
  for line in [rule.as_str(), message, rule.as_str()] {
    println!("{}", paint(&line, Stream::Stdout, color));
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}
