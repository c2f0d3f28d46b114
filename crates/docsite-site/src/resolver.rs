use std::{
  fs,
  path::{Path, PathBuf},
  sync::Arc,
};

use docsite_commonmark::{
  FrontMatter,
  HighlighterCache,
  MarkdownProcessor,
  Metadata,
  TocNode,
  build_toc,
};
use docsite_config::Config;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::{
  error::PageError,
  scanner::{Scanner, route_segments},
};

/// Everything the rendering layer needs to draw one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
  pub title:       String,
  /// Rendered body HTML.
  pub content:     String,
  pub frontmatter: Metadata,
  /// Route the page was requested under.
  pub slug:        String,
  pub toc:         Vec<TocNode>,
}

/// Maps routes to source files and compiles them into [`PageRecord`]s.
///
/// Safe to share between threads; every call reads and compiles afresh.
#[derive(Debug, Clone)]
pub struct Resolver {
  scanner:             Scanner,
  processor:           MarkdownProcessor,
  default_title:       String,
  strict_front_matter: bool,
}

impl Resolver {
  /// Resolver compiling with `processor`.
  #[must_use]
  pub fn new(config: &Config, processor: MarkdownProcessor) -> Self {
    Self {
      scanner: Scanner::from_config(config),
      processor,
      default_title: config.default_title.clone(),
      strict_front_matter: config.strict_front_matter,
    }
  }

  /// Resolver whose processor highlights through the shared `highlighter`.
  #[must_use]
  pub fn with_highlighter(
    config: &Config,
    highlighter: Arc<HighlighterCache>,
  ) -> Self {
    let processor =
      MarkdownProcessor::with_highlighter(config.markdown_options(), highlighter);
    Self::new(config, processor)
  }

  #[must_use]
  pub const fn scanner(&self) -> &Scanner {
    &self.scanner
  }

  #[must_use]
  pub const fn processor(&self) -> &MarkdownProcessor {
    &self.processor
  }

  /// Source file backing `route`, if there is one.
  ///
  /// Follows the scanner's route rule in reverse, so a route resolves exactly
  /// when a scan would list it.
  #[must_use]
  pub fn locate(&self, route: &str) -> Option<PathBuf> {
    let segments = route_segments(route)?;
    let (stem, parents) = segments.split_last()?;
    if self.scanner.is_excluded(stem) {
      return None;
    }

    let dir = parents
      .iter()
      .fold(self.scanner.root().to_path_buf(), |dir, segment| {
        dir.join(segment)
      });

    let entries = match fs::read_dir(&dir) {
      Ok(entries) => entries,
      Err(e) => {
        debug!("Cannot list {} for route '{route}': {e}", dir.display());
        return None;
      },
    };

    let mut candidates: Vec<PathBuf> = entries
      .filter_map(Result::ok)
      .map(|entry| entry.path())
      .filter(|path| {
        path.file_stem().and_then(|s| s.to_str()) == Some(*stem)
          && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.scanner.is_document_extension(ext))
          && path.is_file()
      })
      .collect();
    candidates.sort();
    candidates.into_iter().next()
  }

  /// Resolve `route` to a compiled page.
  ///
  /// # Errors
  ///
  /// [`PageError::NotFound`] when no document backs the route, and
  /// [`PageError::Unavailable`] when the document exists but cannot be read
  /// or, with `strict_front_matter`, has malformed front matter.
  pub fn resolve(&self, route: &str) -> Result<PageRecord, PageError> {
    let slug = route.trim_matches('/');
    let Some(path) = self.locate(slug) else {
      debug!("No document for route '{slug}'");
      return Err(PageError::NotFound {
        route: slug.to_string(),
      });
    };
    self.render_file(slug, &path)
  }

  /// Read and compile the document at `path`, served as `route`.
  ///
  /// # Errors
  ///
  /// [`PageError::Unavailable`] when the file cannot be read or, in strict
  /// mode, its front matter does not parse.
  pub fn render_file(
    &self,
    route: &str,
    path: &Path,
  ) -> Result<PageRecord, PageError> {
    let unavailable = || {
      PageError::Unavailable {
        route: route.to_string(),
      }
    };

    let raw = fs::read_to_string(path).map_err(|e| {
      error!("Failed to read {}: {e}", path.display());
      unavailable()
    })?;

    let front_matter = if self.strict_front_matter {
      FrontMatter::split(&raw).map_err(|e| {
        error!("Rejecting {}: {e}", path.display());
        unavailable()
      })?
    } else {
      let (front_matter, problem) = FrontMatter::split_lenient(&raw);
      if let Some(e) = problem {
        warn!("Ignoring front matter of {}: {e}", path.display());
      }
      front_matter
    };

    let result = self.processor.render(&front_matter.body);
    let toc = build_toc(&result.headings);
    let title = front_matter
      .title()
      .map(str::to_string)
      .or(result.title)
      .unwrap_or_else(|| self.default_title.clone());

    debug!("Resolved route '{route}' to {}", path.display());
    Ok(PageRecord {
      title,
      content: result.html,
      frontmatter: front_matter.metadata,
      slug: route.to_string(),
      toc,
    })
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use docsite_commonmark::{MarkdownOptions, MarkdownOptionsBuilder};

  use super::*;

  fn resolver(root: &Path, strict: bool) -> Resolver {
    let config = Config {
      input_dir: root.to_path_buf(),
      strict_front_matter: strict,
      ..Config::default()
    };
    let options: MarkdownOptions =
      MarkdownOptionsBuilder::new().highlight_code(false).build();
    Resolver::new(&config, MarkdownProcessor::new(options))
  }

  fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
  }

  #[test]
  fn test_locate_follows_route_rule() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "index.md", "# Home");
    write(dir.path(), "guides/intro.MD", "# Intro");
    write(dir.path(), "guides/index.md", "# Guides");
    write(dir.path(), "README.md", "# Readme");

    let resolver = resolver(dir.path(), false);
    assert_eq!(resolver.locate(""), Some(dir.path().join("index.md")));
    assert_eq!(
      resolver.locate("guides/intro"),
      Some(dir.path().join("guides/intro.MD"))
    );
    assert!(resolver.locate("guides/index").is_some());
    assert!(resolver.locate("guides").is_none());
    assert!(resolver.locate("index").is_none());
    assert!(resolver.locate("README").is_none());
    assert!(resolver.locate("../index").is_none());
  }

  #[test]
  fn test_title_precedence() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.md", "---\ntitle: From Meta\n---\n# From Heading\n");
    write(dir.path(), "b.md", "## Sub\n\n# From Heading\n");
    write(dir.path(), "c.md", "---\ntitle: 42\n---\nNo headings here.\n");

    let resolver = resolver(dir.path(), false);
    assert_eq!(resolver.resolve("a").unwrap().title, "From Meta");
    assert_eq!(resolver.resolve("b").unwrap().title, "From Heading");
    assert_eq!(resolver.resolve("c").unwrap().title, "Documentation");
  }

  #[test]
  fn test_malformed_front_matter_policy() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bad.md", "---\ntitle: [unclosed\n---\n# Body\n");

    let page = resolver(dir.path(), false).resolve("bad").unwrap();
    assert!(page.frontmatter.is_empty());
    assert_eq!(page.title, "Body");
    assert!(!page.content.contains("unclosed"));

    let err = resolver(dir.path(), true).resolve("bad").unwrap_err();
    assert_eq!(err, PageError::Unavailable {
      route: "bad".to_string(),
    });
    assert_eq!(err.status(), 500);
  }

  #[test]
  fn test_not_found_is_never_an_empty_page() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = resolver(dir.path(), false);

    for route in ["", "missing", "/nested/missing/", "../../etc/passwd"] {
      let err = resolver.resolve(route).unwrap_err();
      assert_eq!(err.status(), 404);
      assert!(matches!(err, PageError::NotFound { .. }));
    }
  }

  #[test]
  fn test_unreadable_file_is_unavailable_without_path() {
    let dir = tempfile::tempdir().unwrap();
    // Not valid UTF-8
    fs::write(dir.path().join("binary.md"), [0xff, 0xfe, 0x00]).unwrap();

    let err = resolver(dir.path(), false).resolve("binary").unwrap_err();
    assert!(matches!(err, PageError::Unavailable { .. }));
    let message = err.to_string();
    assert_eq!(message, "Page unavailable: binary");
    assert!(!message.contains(&dir.path().display().to_string()));
  }
}
