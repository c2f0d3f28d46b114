//! Syntect-based syntax highlighting backend enhanced with two-face.
//!
//! Grammars come from two-face's extended syntax set, the bundled TokenScript
//! definition and any extra Sublime syntax files from the configuration.
//! Output is inline-styled `<span>` markup without a background, suitable
//! for placing inside a `<code>` element.

use std::{fs, path::Path};

use syntect::{
  easy::HighlightLines,
  highlighting::{Theme, ThemeSet},
  html::{IncludeBackground, styled_line_to_highlighted_html},
  parsing::{SyntaxDefinition, SyntaxSet},
  util::LinesWithEndings,
};
use two_face::theme::{EmbeddedLazyThemeSet, EmbeddedThemeName};

use super::{
  error::{SyntaxError, SyntaxResult},
  types::{SyntaxConfig, SyntaxHighlighter, SyntaxManager},
};

/// Sublime syntax definition for the TokenScript language.
const TOKENSCRIPT_SYNTAX: &str = include_str!("grammars/tokenscript.sublime-syntax");

const DEFAULT_THEME: &str = "InspiredGitHub";

/// Themes shipped by two-face, by the names users can configure.
const EMBEDDED_THEMES: &[(&str, EmbeddedThemeName)] = &[
  ("Ansi", EmbeddedThemeName::Ansi),
  ("Base16", EmbeddedThemeName::Base16),
  ("Base16EightiesDark", EmbeddedThemeName::Base16EightiesDark),
  ("Base16MochaDark", EmbeddedThemeName::Base16MochaDark),
  ("Base16OceanDark", EmbeddedThemeName::Base16OceanDark),
  ("Base16OceanLight", EmbeddedThemeName::Base16OceanLight),
  ("Base16_256", EmbeddedThemeName::Base16_256),
  ("CatppuccinFrappe", EmbeddedThemeName::CatppuccinFrappe),
  ("CatppuccinLatte", EmbeddedThemeName::CatppuccinLatte),
  ("CatppuccinMacchiato", EmbeddedThemeName::CatppuccinMacchiato),
  ("CatppuccinMocha", EmbeddedThemeName::CatppuccinMocha),
  ("ColdarkCold", EmbeddedThemeName::ColdarkCold),
  ("ColdarkDark", EmbeddedThemeName::ColdarkDark),
  ("DarkNeon", EmbeddedThemeName::DarkNeon),
  ("Dracula", EmbeddedThemeName::Dracula),
  ("Github", EmbeddedThemeName::Github),
  ("GruvboxDark", EmbeddedThemeName::GruvboxDark),
  ("GruvboxLight", EmbeddedThemeName::GruvboxLight),
  ("InspiredGithub", EmbeddedThemeName::InspiredGithub),
  ("Leet", EmbeddedThemeName::Leet),
  ("MonokaiExtended", EmbeddedThemeName::MonokaiExtended),
  ("MonokaiExtendedBright", EmbeddedThemeName::MonokaiExtendedBright),
  ("MonokaiExtendedLight", EmbeddedThemeName::MonokaiExtendedLight),
  ("MonokaiExtendedOrigin", EmbeddedThemeName::MonokaiExtendedOrigin),
  ("Nord", EmbeddedThemeName::Nord),
  ("OneHalfDark", EmbeddedThemeName::OneHalfDark),
  ("OneHalfLight", EmbeddedThemeName::OneHalfLight),
  ("SolarizedDark", EmbeddedThemeName::SolarizedDark),
  ("SolarizedLight", EmbeddedThemeName::SolarizedLight),
  ("SublimeSnazzy", EmbeddedThemeName::SublimeSnazzy),
  ("TwoDark", EmbeddedThemeName::TwoDark),
  ("Zenburn", EmbeddedThemeName::Zenburn),
];

/// Short names accepted for the light and dark GitHub palettes.
const THEME_ALIASES: &[(&str, &str)] = &[
  ("github-light", DEFAULT_THEME),
  ("github-dark", "OneHalfDark"),
];

/// Syntect-based syntax highlighter
pub struct SyntectHighlighter {
  syntax_set:     SyntaxSet,
  default_themes: ThemeSet,
  extra_themes:   EmbeddedLazyThemeSet,
  theme_name:     String,
}

impl SyntectHighlighter {
  /// Build the highlighter, loading every grammar up front.
  ///
  /// # Errors
  ///
  /// Returns [`SyntaxError::GrammarLoad`] if the bundled grammar or one of
  /// `grammars` cannot be read or parsed.
  pub fn new(
    theme_name: Option<String>,
    grammars: &[impl AsRef<Path>],
  ) -> SyntaxResult<Self> {
    let mut builder = two_face::syntax::extra_newlines().into_builder();

    let tokenscript = SyntaxDefinition::load_from_str(
      TOKENSCRIPT_SYNTAX,
      true,
      Some("tokenscript"),
    )
    .map_err(|e| {
      SyntaxError::GrammarLoad {
        name:    "tokenscript".to_string(),
        message: e.to_string(),
      }
    })?;
    builder.add(tokenscript);

    for path in grammars {
      builder.add(load_grammar_file(path.as_ref())?);
    }

    Ok(Self {
      syntax_set:     builder.build(),
      default_themes: ThemeSet::load_defaults(),
      extra_themes:   two_face::theme::extra(),
      theme_name:     theme_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_THEME.to_string()),
    })
  }

  /// Get the theme by name, falling back to the configured and then the
  /// built-in default theme.
  fn get_theme(&self, theme_name: Option<&str>) -> &Theme {
    let requested = theme_name.unwrap_or(self.theme_name.as_str());
    self
      .find_theme(requested)
      .or_else(|| self.find_theme(&self.theme_name))
      .unwrap_or_else(|| self.extra_themes.get(EmbeddedThemeName::InspiredGithub))
  }

  fn find_theme(&self, name: &str) -> Option<&Theme> {
    let name = THEME_ALIASES
      .iter()
      .find_map(|(alias, target)| (*alias == name).then_some(*target))
      .unwrap_or(name);

    self.default_themes.themes.get(name).or_else(|| {
      EMBEDDED_THEMES
        .iter()
        .find(|(embedded, _)| *embedded == name)
        .map(|(_, embedded)| self.extra_themes.get(*embedded))
    })
  }
}

/// Read one Sublime syntax definition from disk.
fn load_grammar_file(path: &Path) -> SyntaxResult<SyntaxDefinition> {
  let name = path.display().to_string();
  let source = fs::read_to_string(path).map_err(|e| {
    SyntaxError::GrammarLoad {
      name:    name.clone(),
      message: e.to_string(),
    }
  })?;
  let fallback_name = path.file_stem().and_then(|stem| stem.to_str());

  SyntaxDefinition::load_from_str(&source, true, fallback_name).map_err(|e| {
    SyntaxError::GrammarLoad {
      name,
      message: e.to_string(),
    }
  })
}

impl SyntaxHighlighter for SyntectHighlighter {
  fn name(&self) -> &'static str {
    "Syntect"
  }

  fn supported_languages(&self) -> Vec<String> {
    self
      .syntax_set
      .syntaxes()
      .iter()
      .flat_map(|syntax| {
        std::iter::once(syntax.name.to_lowercase())
          .chain(syntax.file_extensions.iter().map(|ext| ext.to_lowercase()))
      })
      .collect()
  }

  fn available_themes(&self) -> Vec<String> {
    let mut themes: Vec<String> = self
      .default_themes
      .themes
      .keys()
      .cloned()
      .chain(EMBEDDED_THEMES.iter().map(|(name, _)| (*name).to_string()))
      .chain(THEME_ALIASES.iter().map(|(alias, _)| (*alias).to_string()))
      .collect();
    themes.sort();
    themes.dedup();
    themes
  }

  fn highlight(
    &self,
    code: &str,
    language: &str,
    theme: Option<&str>,
  ) -> SyntaxResult<String> {
    let syntax = self
      .syntax_set
      .find_syntax_by_token(language)
      .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

    let mut lines = HighlightLines::new(syntax, self.get_theme(theme));
    let mut html = String::with_capacity(code.len() * 2);
    for line in LinesWithEndings::from(code) {
      let regions = lines
        .highlight_line(line, &self.syntax_set)
        .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))?;
      let fragment =
        styled_line_to_highlighted_html(&regions, IncludeBackground::No)
          .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))?;
      html.push_str(&fragment);
    }

    Ok(html)
  }
}

/// Create a Syntect-based syntax manager with configuration.
///
/// # Errors
///
/// Returns an error if a grammar fails to load.
pub fn create_syntect_manager(
  mut config: SyntaxConfig,
) -> SyntaxResult<SyntaxManager> {
  let theme = config
    .default_theme
    .get_or_insert_with(|| DEFAULT_THEME.to_string())
    .clone();
  let highlighter = SyntectHighlighter::new(Some(theme), config.grammars.as_slice())?;
  Ok(SyntaxManager::new(Box::new(highlighter), config))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn highlighter() -> SyntectHighlighter {
    SyntectHighlighter::new(None, &[] as &[&Path])
      .expect("bundled grammars should load")
  }

  #[test]
  fn test_syntect_highlighter() {
    let highlighter = highlighter();
    assert_eq!(highlighter.name(), "Syntect");
    assert!(highlighter.supports_language("rust"));
    assert!(highlighter.supports_language("txt"));
    assert!(highlighter.has_theme("Nord"));
    assert!(highlighter.has_theme("github-dark"));
    assert!(highlighter.has_theme("CatppuccinMocha"));
    for (alias, _) in THEME_ALIASES {
      assert!(highlighter.find_theme(alias).is_some(), "alias {alias}");
    }
  }

  #[test]
  fn test_tokenscript_is_registered() {
    let highlighter = highlighter();
    assert!(highlighter.supports_language("tokenscript"));
    assert!(highlighter.supports_language("tks"));

    let html = highlighter
      .highlight("variable size: Number = {spacing.base} * 2px;\n", "tokenscript", None)
      .expect("tokenscript should highlight");
    assert!(html.contains("<span"));
    assert!(html.contains("spacing.base"));
  }

  #[test]
  fn test_highlight_is_fragment_without_pre() {
    let html = highlighter()
      .highlight("fn main() {}\n", "rust", None)
      .expect("rust should highlight");
    assert!(html.contains("main"));
    assert!(!html.contains("<pre"));
  }

  #[test]
  fn test_highlight_escapes_markup() {
    let html = highlighter()
      .highlight("<script>alert(1)</script>", "txt", None)
      .expect("plain text should highlight");
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
  }

  #[test]
  fn test_unknown_theme_falls_back() {
    let highlighter = highlighter();
    let html = highlighter
      .highlight("let x = 1;", "rust", Some("NoSuchTheme"))
      .expect("unknown theme should fall back");
    assert!(html.contains("let"));
  }

  #[test]
  fn test_extra_grammar_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ini.sublime-syntax");
    fs::write(
      &path,
      "%YAML 1.2\n---\nname: Tiny\nfile_extensions: [tiny]\nscope: \
       source.tiny\ncontexts:\n  main:\n    - match: '\\bkey\\b'\n      scope: \
       keyword.tiny\n",
    )
    .expect("Failed to write grammar");

    let highlighter =
      SyntectHighlighter::new(None, &[&path]).expect("grammar should load");
    assert!(highlighter.supports_language("tiny"));
  }

  #[test]
  fn test_broken_grammar_is_load_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.sublime-syntax");
    fs::write(&path, "not: [a grammar").expect("Failed to write grammar");

    let result = SyntectHighlighter::new(None, &[&path]);
    assert!(matches!(result, Err(SyntaxError::GrammarLoad { .. })));
  }
}
