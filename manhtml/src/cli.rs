use std::path::PathBuf;

use clap::Parser;
use manhtml_config::Config;

/// Command line interface for manhtml
#[derive(Parser, Debug)]
#[command(author, version, about = "manhtml: render man(7) pages as HTML")]
pub struct Cli {
  /// Manual page to convert. Reads standard input when omitted.
  pub input: Option<PathBuf>,

  /// Output mode: a full HTML document, a Jekyll page with front matter, or
  /// a bare fragment.
  #[arg(short, long, value_parser = ["html", "jekyll", "raw"])]
  pub mode: Option<String>,

  /// Output file. Writes to standard output when omitted.
  #[arg(short, long)]
  pub output: Option<PathBuf>,

  /// Jekyll layout name for the front matter.
  #[arg(short, long)]
  pub layout: Option<String>,

  /// Jekyll permalink for the front matter.
  #[arg(short, long)]
  pub permalink: Option<String>,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Later files override earlier ones.
  #[arg(short = 'c', long = "config-file", action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Layer the flags given on the command line over `config`.
  pub fn apply_to(&self, config: &mut Config) {
    config.merge(Config {
      mode:      self.mode.clone(),
      output:    self.output.clone(),
      layout:    self.layout.clone(),
      permalink: self.permalink.clone(),
    });
  }
}
