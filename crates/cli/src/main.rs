mod cmd;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use eoosmake_lib::consts::{APP_NAME, FAILURE_EXIT_CODE};

use crate::cmd::{MakeArgs, cmd_info, cmd_make};

/// eoosmake - builds, installs and tests the EOOS project
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (overridden by RUST_LOG)
  #[arg(long, global = true)]
  log_verbose: bool,

  #[command(flatten)]
  make: MakeArgs,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Show host platform information
  Info,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.log_verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Some(Commands::Info) => {
      cmd_info();
      Ok(ExitCode::SUCCESS)
    }
    None => cmd_make(cli.make),
  };

  match result {
    Ok(code) => code,
    Err(err) => {
      output::print_error(&format!("{err:#}"));
      ExitCode::from(FAILURE_EXIT_CODE)
    }
  }
}
