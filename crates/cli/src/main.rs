mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print_error};

/// bgraph - Generate C++ solution and project plans from Lua build scripts
#[derive(Parser)]
#[command(name = "bgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Evaluate the build scripts and write solution and project files
  Generate {
    /// Entry build script, relative to the root (default: build.lua)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project root directory (default: $BGRAPH_ROOT or the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Output directory (default: $BGRAPH_BUILD_DIR or <root>/.build)
    #[arg(long)]
    build_dir: Option<PathBuf>,
  },

  /// Evaluate the build scripts and show the plan without writing it
  Plan {
    /// Entry build script, relative to the root (default: build.lua)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project root directory (default: $BGRAPH_ROOT or the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Show supported platforms, toolchains and target matrices
  Info,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Generate {
      config,
      root,
      build_dir,
    } => cmd::cmd_generate(config.as_deref(), root.as_deref(), build_dir.as_deref(), cli.verbose),
    Commands::Plan { config, root, output } => cmd::cmd_plan(config.as_deref(), root.as_deref(), output, cli.verbose),
    Commands::Info => {
      cmd::cmd_info();
      Ok(())
    }
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
