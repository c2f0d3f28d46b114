use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docsite_commonmark::CompileStrategy;

/// Command line interface for docsite
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "docsite: Markdown trees to documentation page records"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the docsite CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new docsite configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "docsite.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Render every document and write page records, routes and navigation.
  Build {
    /// Path to the directory containing markdown files.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output directory for the page records.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of threads to use for parallel processing.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,

    /// Heading capture strategy: hook or rescan.
    #[arg(long)]
    strategy: Option<CompileStrategy>,
  },

  /// Print the routes a static export has to pre-render, one per line.
  Routes {
    /// Path to the directory containing markdown files.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,
  },

  /// Resolve one route and print its page record as JSON.
  Page {
    /// Route to resolve, `/` or empty for the root page.
    route: String,

    /// Path to the directory containing markdown files.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,
  },

  /// Report navigation entries that point at no document.
  Check {
    /// Path to the directory containing markdown files.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,
  },
}

impl Commands {
  /// The `--input-dir` given to this subcommand, if it takes one.
  #[must_use]
  pub const fn input_dir(&self) -> Option<&PathBuf> {
    match self {
      Self::Build { input_dir, .. }
      | Self::Routes { input_dir }
      | Self::Page { input_dir, .. }
      | Self::Check { input_dir } => input_dir.as_ref(),
      Self::Init { .. } => None,
    }
  }
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
