use std::{collections::HashMap, path::PathBuf};

use docsite_macros::Configurable;
use serde::{Deserialize, Serialize};

/// Code highlighting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Configurable)]
#[serde(default)]
pub struct HighlightConfig {
  /// Route fenced code blocks through the highlighter.
  pub enable: bool,

  /// Theme name, matched case-sensitively.
  pub theme: String,

  /// Extra language aliases, applied over the built-in set.
  pub aliases: HashMap<String, String>,

  /// Additional Sublime syntax definitions to load.
  #[config(skip)]
  pub grammars: Vec<PathBuf>,
}

impl Default for HighlightConfig {
  fn default() -> Self {
    Self {
      enable:   true,
      theme:    "InspiredGitHub".to_string(),
      aliases:  HashMap::new(),
      grammars: Vec::new(),
    }
  }
}
