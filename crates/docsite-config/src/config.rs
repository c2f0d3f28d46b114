use std::{
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use docsite_commonmark::{
  CompileStrategy,
  MarkdownOptions,
  MarkdownOptionsBuilder,
  SyntaxConfig,
};
use docsite_macros::Configurable;
use serde::{Deserialize, Serialize};

use crate::{
  error::ConfigError,
  highlight::HighlightConfig,
  navigation::NavigationItem,
};

/// File names looked for, in order, when no config file is given explicitly.
pub const CONFIG_FILENAMES: [&str; 3] =
  ["docsite.toml", "docsite.json", ".docsite.toml"];

/// Configuration for the docsite pipeline.
///
/// Loaded from a TOML or JSON file, then adjusted by `--config KEY=VALUE`
/// overrides and command line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Configurable)]
#[serde(default)]
pub struct Config {
  /// Root of the Markdown source tree.
  pub input_dir: PathBuf,

  /// Output directory for `build`.
  pub output_dir: PathBuf,

  /// Title used when a page provides none.
  pub default_title: String,

  /// Recognized document extensions, without the leading dot.
  pub extensions: Vec<String>,

  /// File stems that are never routed, compared case-insensitively.
  pub exclude: Vec<String>,

  /// Number of worker threads for the site build.
  pub jobs: Option<usize>,

  /// Fail pages with malformed front matter instead of ignoring the block.
  pub strict_front_matter: bool,

  /// Enable GitHub Flavored Markdown extensions.
  pub gfm: bool,

  /// How headings are captured during compilation.
  pub compile_strategy: CompileStrategy,

  /// Extra routes for the pre-render list.
  pub prerender: Vec<String>,

  #[config(nested)]
  pub highlight: HighlightConfig,

  /// Author-supplied navigation menu.
  #[config(skip)]
  pub navigation: Vec<NavigationItem>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      input_dir:           PathBuf::from("docs"),
      output_dir:          PathBuf::from("build"),
      default_title:       "Documentation".to_string(),
      extensions:          vec!["md".to_string()],
      exclude:             vec!["README".to_string()],
      jobs:                None,
      strict_front_matter: false,
      gfm:                 true,
      compile_strategy:    CompileStrategy::default(),
      prerender:           Vec::new(),
      highlight:           HighlightConfig::default(),
      navigation:          Vec::new(),
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
      return Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )));
    };

    match ext.to_lowercase().as_str() {
      "json" => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {}",
            path.display(),
            ConfigError::from(e)
          ))
        })
      },
      "toml" => {
        toml::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {}",
            path.display(),
            ConfigError::from(e)
          ))
        })
      },
      _ => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from files and `KEY=VALUE` overrides.
  ///
  /// Explicit files are merged in order. Without any, a config file in the
  /// current directory is used if one exists, and the defaults otherwise.
  ///
  /// # Errors
  ///
  /// Returns an error if a file fails to load or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged = Self::from_file(first)?;
      for path in rest {
        merged.merge(Self::from_file(path)?);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
      merged
    } else if let Some(discovered) = Self::find_config_file() {
      log::info!("Using discovered config file: {}", discovered.display());
      Self::from_file(&discovered)?
    } else {
      log::debug!("No config file found, using defaults");
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    let duplicates = NavigationItem::duplicate_paths(&config.navigation);
    if !duplicates.is_empty() {
      log::warn!(
        "Navigation lists these paths more than once: {}",
        duplicates.join(", ")
      );
    }

    Ok(config)
  }

  /// Apply configuration overrides from `KEY=VALUE` strings.
  ///
  /// List keys take comma separated values, nested keys use a dot
  /// (`highlight.theme=Nord`).
  ///
  /// # Errors
  ///
  /// Returns an error if a string is not `KEY=VALUE`, the key is unknown, or
  /// the value does not parse.
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Merge another config into this one, `other` taking precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: a [`Some`] in `other` replaces this value
  /// - list fields: `other` is appended, then repeated entries are dropped
  /// - map fields: entries from `other` are inserted, replacing equal keys
  /// - plain fields: `other` always replaces
  pub fn merge(&mut self, other: Self) {
    self.merge_fields(other);

    dedup_in_order(&mut self.extensions);
    dedup_in_order(&mut self.exclude);
    dedup_in_order(&mut self.prerender);
    dedup_in_order(&mut self.highlight.grammars);
  }

  /// Search the current directory for a config file.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let current_dir = std::env::current_dir().ok()?;
        Self::find_config_file_in(&current_dir)
      })
      .clone()
  }

  /// Search `dir` for the first existing file in [`CONFIG_FILENAMES`].
  #[must_use]
  pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
      .iter()
      .map(|filename| dir.join(filename))
      .find(|path| path.is_file())
  }

  /// Validate the paths this configuration points at.
  ///
  /// # Errors
  ///
  /// Returns an error listing every problem found.
  pub fn validate_paths(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if !self.input_dir.exists() {
      errors.push(format!(
        "Input directory does not exist: {}",
        self.input_dir.display()
      ));
    } else if !self.input_dir.is_dir() {
      errors.push(format!(
        "Input path is not a directory: {}",
        self.input_dir.display()
      ));
    }

    for (index, grammar) in self.highlight.grammars.iter().enumerate() {
      if !grammar.is_file() {
        errors.push(format!(
          "Grammar file {} does not exist: {}",
          index + 1,
          grammar.display()
        ));
      }
    }

    if !errors.is_empty() {
      let error_message = errors.join("\n");
      return Err(ConfigError::Config(format!(
        "Configuration path validation errors:\n{error_message}"
      )));
    }

    Ok(())
  }

  /// Write a default configuration file in `format` (`toml` or `json`).
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unknown or the file cannot be written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }

  /// Highlighter settings derived from the `highlight` table.
  #[must_use]
  pub fn syntax_config(&self) -> SyntaxConfig {
    SyntaxConfig {
      default_theme: Some(self.highlight.theme.clone()),
      grammars: self.highlight.grammars.clone(),
      ..SyntaxConfig::default()
    }
    .with_aliases(
      self
        .highlight
        .aliases
        .iter()
        .map(|(alias, target)| (alias, target.clone())),
    )
  }

  /// Compiler options derived from this configuration.
  #[must_use]
  pub fn markdown_options(&self) -> MarkdownOptions {
    MarkdownOptionsBuilder::new()
      .gfm(self.gfm)
      .highlight_code(self.highlight.enable)
      .strategy(self.compile_strategy)
      .build()
  }

  /// Worker threads to use: `jobs` if set, the CPU count otherwise.
  #[must_use]
  pub fn effective_jobs(&self) -> usize {
    self.jobs.unwrap_or_else(num_cpus::get).max(1)
  }
}

/// Drop repeated entries, keeping the first occurrence.
fn dedup_in_order<T: PartialEq>(items: &mut Vec<T>) {
  let mut kept: Vec<T> = Vec::with_capacity(items.len());
  for item in items.drain(..) {
    if !kept.contains(&item) {
      kept.push(item);
    }
  }
  *items = kept;
}
