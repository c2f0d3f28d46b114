use std::fmt;

/// Error type for template operations.
#[derive(Debug)]
pub enum TemplateError {
  /// The requested configuration format is not supported.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format} (expected toml or json)")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, commented for first-time users.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# docsite configuration

# Root of the Markdown source tree
input_dir = "docs"

# Where `docsite build` writes page records
output_dir = "build"

# Title used when a page has neither a front matter title nor a level 1 heading
default_title = "Documentation"

# Recognized document extensions, without the dot
extensions = ["md"]

# File stems that never become routes
exclude = ["README"]

# Worker threads for the site build (defaults to the number of CPU cores)
# jobs = 4

# Fail a page on malformed front matter instead of ignoring the block
strict_front_matter = false

# GitHub Flavored Markdown: tables, strikethrough, task lists, autolinks, footnotes
gfm = true

# Heading capture: "hook" (during rendering) or "rescan" (from the rendered HTML)
compile_strategy = "hook"

# Extra routes to pre-render besides the scanned documents
# prerender = ["changelog"]

[highlight]
enable = true

# Any bundled syntect or two-face theme, e.g. "Nord", "Dracula", "base16-ocean.dark"
theme = "InspiredGitHub"

# Additional Sublime syntax definitions
# grammars = ["grammars/custom.sublime-syntax"]

# Extra language aliases
# [highlight.aliases]
# tks = "tokenscript"

# Navigation menu, ordered by `order` among siblings
# [[navigation]]
# title = "Home"
# path = ""
# order = 1
#
# [[navigation]]
# title = "Getting Started"
# path = "getting-started"
# order = 2
#
# [[navigation.children]]
# title = "Introduction"
# path = "getting-started/introduction"
# order = 1
"#;

/// Default configuration template in JSON.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "input_dir": "docs",
  "output_dir": "build",
  "default_title": "Documentation",
  "extensions": ["md"],
  "exclude": ["README"],
  "strict_front_matter": false,
  "gfm": true,
  "compile_strategy": "hook",
  "prerender": [],
  "highlight": {
    "enable": true,
    "theme": "InspiredGitHub",
    "aliases": {},
    "grammars": []
  },
  "navigation": [
    {
      "title": "Home",
      "path": "",
      "order": 1
    },
    {
      "title": "Getting Started",
      "path": "getting-started",
      "order": 2,
      "children": [
        {
          "title": "Introduction",
          "path": "getting-started/introduction",
          "order": 1
        }
      ]
    }
  ]
}
"#;

/// Get the configuration template for `format` (`toml` or `json`).
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}
