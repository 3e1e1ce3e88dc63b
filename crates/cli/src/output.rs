//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output: colored status
//! messages, file change markers and JSON output.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use buildgraph_lib::emit::FileStatus;

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
  pub const ARROW: &str = "→";
  pub const ADD: &str = "+";
  pub const MODIFY: &str = "~";
  pub const UNCHANGED: &str = "=";
}

pub fn truncate_hash(hash: &str) -> &str {
  let len = hash.len().min(12);
  &hash[..len]
}

/// Marker shown next to a generated file.
pub fn status_symbol(status: FileStatus) -> &'static str {
  match status {
    FileStatus::Created => symbols::ADD,
    FileStatus::Updated => symbols::MODIFY,
    FileStatus::Unchanged => symbols::UNCHANGED,
  }
}

pub fn print_file_status(status: FileStatus, path: &str) {
  let symbol = status_symbol(status);
  match status {
    FileStatus::Created => println!("  {} {}", symbol.if_supports_color(Stream::Stdout, |s| s.green()), path),
    FileStatus::Updated => println!("  {} {}", symbol.if_supports_color(Stream::Stdout, |s| s.yellow()), path),
    FileStatus::Unchanged => println!(
      "  {} {}",
      symbol.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      path.if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
