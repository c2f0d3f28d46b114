use std::{fs, io::Write, path::Path, sync::Arc};

use color_eyre::eyre::{Context, Result, bail};
use docsite_commonmark::{HighlighterCache, MarkdownProcessor};
use docsite_config::Config;
use docsite_site::{
  Resolver,
  Scanner,
  build_site,
  check_navigation,
  prerender_routes,
};
use log::{info, warn};

use crate::cli::{Cli, Commands};

/// Run the parsed command line, writing command output to `out`.
///
/// # Errors
///
/// Returns an error if configuration fails to load, a command cannot do its
/// job, or writing to `out` fails.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
  if let Commands::Init {
    output,
    format,
    force,
  } = &cli.command
  {
    return init(output, format, *force);
  }

  let config = load_config(cli)?;

  match &cli.command {
    Commands::Init { .. } => Ok(()),
    Commands::Build { .. } => build(&config),
    Commands::Routes { .. } => routes(&config, out),
    Commands::Page { route, .. } => page(&config, route, out),
    Commands::Check { .. } => check(&config, out),
  }
}

/// Configuration from files and overrides, with subcommand flags on top.
///
/// # Errors
///
/// Returns an error if a config file or override is invalid.
pub fn load_config(cli: &Cli) -> Result<Config> {
  let mut config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;

  if let Some(input_dir) = cli.command.input_dir() {
    config.input_dir.clone_from(input_dir);
  }
  if let Commands::Build {
    output_dir,
    jobs,
    strategy,
    ..
  } = &cli.command
  {
    if let Some(output_dir) = output_dir {
      config.output_dir.clone_from(output_dir);
    }
    if jobs.is_some() {
      config.jobs = *jobs;
    }
    if let Some(strategy) = strategy {
      config.compile_strategy = *strategy;
    }
  }

  Ok(config)
}

/// Resolver for `config`, with one highlighter shared by every page.
fn resolver(config: &Config) -> Resolver {
  if config.highlight.enable {
    let highlighter = Arc::new(HighlighterCache::new(config.syntax_config()));
    Resolver::with_highlighter(config, highlighter)
  } else {
    Resolver::new(config, MarkdownProcessor::new(config.markdown_options()))
  }
}

fn init(output: &Path, format: &str, force: bool) -> Result<()> {
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
    info!("Created directory: {}", parent.display());
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!("Failed to generate configuration file: {}", output.display())
  })?;

  info!(
    "Configuration file created successfully. Edit it to customize your \
     documentation site."
  );
  Ok(())
}

fn build(config: &Config) -> Result<()> {
  config.validate_paths().wrap_err("Invalid configuration")?;
  info!("Starting site build...");

  let report = build_site(config, &resolver(config)).wrap_err_with(|| {
    format!("Build into {} failed", config.output_dir.display())
  })?;

  if !report.scan_errors.is_empty() {
    warn!(
      "{} entries under {} could not be scanned",
      report.scan_errors.len(),
      config.input_dir.display()
    );
  }
  if !report.failed.is_empty() {
    warn!("{} pages failed to render", report.failed.len());
  }

  info!(
    "Site built successfully in {} ({} routes)",
    config.output_dir.display(),
    report.routes.len()
  );
  Ok(())
}

fn routes(config: &Config, out: &mut dyn Write) -> Result<()> {
  let scan = Scanner::from_config(config).scan();
  for route in prerender_routes(scan.routes(), &config.prerender) {
    let shown = if route.is_empty() { "/" } else { route.as_str() };
    writeln!(out, "{shown}")?;
  }
  Ok(())
}

fn page(config: &Config, route: &str, out: &mut dyn Write) -> Result<()> {
  let record = match resolver(config).resolve(route) {
    Ok(record) => record,
    Err(e) => bail!("{e}"),
  };

  let json = serde_json::to_string_pretty(&record)
    .wrap_err("Failed to serialize page record")?;
  writeln!(out, "{json}")?;
  Ok(())
}

fn check(config: &Config, out: &mut dyn Write) -> Result<()> {
  let scan = Scanner::from_config(config).scan();
  let report = check_navigation(&config.navigation, scan.routes());

  for path in &report.missing {
    warn!("Navigation entry '{path}' has no matching document");
    writeln!(out, "missing: {path}")?;
  }
  for path in &report.duplicates {
    warn!("Navigation lists '{path}' more than once");
    writeln!(out, "duplicate: {path}")?;
  }

  if report.is_clean() {
    info!("Navigation matches the source tree");
  }
  Ok(())
}
