//! Front matter detection and parsing.
//!
//! A document may open with a metadata block fenced by `---` (YAML) or `+++`
//! (TOML) lines. The block is parsed into an open [`Metadata`] mapping and
//! the remaining text is returned untouched as the Markdown body.
//!
//! A fence that is never closed is not a metadata block; the whole input is
//! then treated as body.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Open key/value mapping parsed from a front matter block.
pub type Metadata = BTreeMap<String, MetaValue>;

/// A front matter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
  Null,
  Bool(bool),
  Integer(i64),
  Float(f64),
  String(String),
  Sequence(Vec<Self>),
  Mapping(Metadata),
}

impl MetaValue {
  /// The value as a string slice, if it is a string.
  #[must_use]
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(s) => Some(s),
      _ => None,
    }
  }

  #[must_use]
  pub const fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(b) => Some(*b),
      _ => None,
    }
  }

  #[must_use]
  pub const fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Integer(i) => Some(*i),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_sequence(&self) -> Option<&[Self]> {
    match self {
      Self::Sequence(items) => Some(items),
      _ => None,
    }
  }

  #[must_use]
  pub const fn as_mapping(&self) -> Option<&Metadata> {
    match self {
      Self::Mapping(map) => Some(map),
      _ => None,
    }
  }
}

impl From<serde_yaml::Value> for MetaValue {
  fn from(value: serde_yaml::Value) -> Self {
    use serde_yaml::Value;

    match value {
      Value::Null => Self::Null,
      Value::Bool(b) => Self::Bool(b),
      Value::Number(n) => {
        n.as_i64().map_or_else(
          || n.as_f64().map_or(Self::Null, Self::Float),
          Self::Integer,
        )
      },
      Value::String(s) => Self::String(s),
      Value::Sequence(items) => {
        Self::Sequence(items.into_iter().map(Self::from).collect())
      },
      Value::Mapping(map) => {
        Self::Mapping(
          map
            .into_iter()
            .map(|(key, value)| (yaml_key(key), Self::from(value)))
            .collect(),
        )
      },
      Value::Tagged(tagged) => Self::from(tagged.value),
    }
  }
}

impl From<toml::Value> for MetaValue {
  fn from(value: toml::Value) -> Self {
    use toml::Value;

    match value {
      Value::String(s) => Self::String(s),
      Value::Integer(i) => Self::Integer(i),
      Value::Float(f) => Self::Float(f),
      Value::Boolean(b) => Self::Bool(b),
      Value::Datetime(dt) => Self::String(dt.to_string()),
      Value::Array(items) => {
        Self::Sequence(items.into_iter().map(Self::from).collect())
      },
      Value::Table(table) => {
        Self::Mapping(
          table
            .into_iter()
            .map(|(key, value)| (key, Self::from(value)))
            .collect(),
        )
      },
    }
  }
}

/// Render a YAML mapping key as a string; scalars keep their textual form.
fn yaml_key(key: serde_yaml::Value) -> String {
  use serde_yaml::Value;

  match key {
    Value::String(s) => s,
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => n.to_string(),
    Value::Null => "null".to_string(),
    other => {
      serde_yaml::to_string(&other)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_default()
    },
  }
}

/// Syntax of a front matter block, chosen by its fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatterFormat {
  /// `---` fences.
  Yaml,
  /// `+++` fences.
  Toml,
}

impl FrontMatterFormat {
  const fn fence(self) -> &'static str {
    match self {
      Self::Yaml => "---",
      Self::Toml => "+++",
    }
  }

  fn from_fence(line: &str) -> Option<Self> {
    match line {
      "---" => Some(Self::Yaml),
      "+++" => Some(Self::Toml),
      _ => None,
    }
  }
}

impl std::fmt::Display for FrontMatterFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Yaml => f.write_str("YAML"),
      Self::Toml => f.write_str("TOML"),
    }
  }
}

/// Errors raised while parsing a front matter block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrontMatterError {
  #[error("Malformed {format} front matter: {message}")]
  Parse {
    format:  FrontMatterFormat,
    message: String,
  },
}

/// A document split into metadata and Markdown body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
  pub metadata: Metadata,
  pub body:     String,
}

impl FrontMatter {
  /// Split `raw` into metadata and body.
  ///
  /// Without a metadata block the metadata is empty and the body is `raw`
  /// unchanged.
  ///
  /// # Errors
  ///
  /// Returns [`FrontMatterError::Parse`] if the block is present but is not a
  /// valid mapping in its format.
  pub fn split(raw: &str) -> Result<Self, FrontMatterError> {
    let Some(block) = locate_block(raw) else {
      return Ok(Self {
        metadata: Metadata::new(),
        body:     raw.to_string(),
      });
    };

    let metadata = parse_block(block.format, block.content)?;
    Ok(Self {
      metadata,
      body: block.body.to_string(),
    })
  }

  /// Split `raw`, degrading a malformed block to empty metadata.
  ///
  /// The body is still the text after the block, and the parse error is
  /// handed back so the caller can report it.
  #[must_use]
  pub fn split_lenient(raw: &str) -> (Self, Option<FrontMatterError>) {
    match Self::split(raw) {
      Ok(front_matter) => (front_matter, None),
      Err(err) => {
        let body = locate_block(raw).map_or(raw, |block| block.body);
        (
          Self {
            metadata: Metadata::new(),
            body:     body.to_string(),
          },
          Some(err),
        )
      },
    }
  }

  /// Look up a top-level metadata key.
  #[must_use]
  pub fn get(&self, key: &str) -> Option<&MetaValue> {
    self.metadata.get(key)
  }

  /// The `title` key, when it is a non-empty string.
  #[must_use]
  pub fn title(&self) -> Option<&str> {
    self
      .get("title")
      .and_then(MetaValue::as_str)
      .map(str::trim)
      .filter(|title| !title.is_empty())
  }
}

struct Block<'a> {
  format:  FrontMatterFormat,
  content: &'a str,
  body:    &'a str,
}

/// Find a fenced block at the very start of `raw`.
fn locate_block(raw: &str) -> Option<Block<'_>> {
  let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

  let mut lines = text.split_inclusive('\n');
  let opening = lines.next()?;
  let format = FrontMatterFormat::from_fence(opening.trim_end())?;

  let content_start = opening.len();
  let mut offset = content_start;
  for line in lines {
    if line.trim_end() == format.fence() {
      return Some(Block {
        format,
        content: &text[content_start..offset],
        body: &text[offset + line.len()..],
      });
    }
    offset += line.len();
  }

  None
}

fn parse_block(
  format: FrontMatterFormat,
  content: &str,
) -> Result<Metadata, FrontMatterError> {
  let parse_error = |message: String| FrontMatterError::Parse { format, message };

  match format {
    FrontMatterFormat::Yaml => {
      let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
      match MetaValue::from(value) {
        MetaValue::Null => Ok(Metadata::new()),
        MetaValue::Mapping(map) => Ok(map),
        _ => Err(parse_error("front matter must be a mapping".to_string())),
      }
    },
    FrontMatterFormat::Toml => {
      let table: toml::Table =
        toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
      Ok(
        table
          .into_iter()
          .map(|(key, value)| (key, MetaValue::from(value)))
          .collect(),
      )
    },
  }
}
