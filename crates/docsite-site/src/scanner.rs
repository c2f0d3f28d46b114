//! Discovery of Markdown sources and the route rule shared with the resolver.
//!
//! Routes are file paths relative to the source root, without their document
//! extension, joined with `/`. The only special case is a top-level `index`
//! file, which is the root route `""`. Nested `index` files keep their name:
//! `guides/index.md` is `guides/index`, never `guides`.

use std::{
  collections::HashSet,
  path::{Component, Path, PathBuf},
};

use docsite_config::Config;
use log::{trace, warn};
use walkdir::WalkDir;

use crate::error::ScanError;

/// File stem of the document served at the root route.
pub const INDEX_STEM: &str = "index";

/// A routable source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
  pub route: String,
  pub path:  PathBuf,
}

/// Everything one scan found, including the entries it had to skip.
#[derive(Debug, Default)]
pub struct ScanReport {
  pub documents: Vec<SourceEntry>,
  pub errors:    Vec<ScanError>,
}

impl ScanReport {
  /// Routes of the scanned documents, in scan order.
  pub fn routes(&self) -> impl Iterator<Item = &str> {
    self.documents.iter().map(|doc| doc.route.as_str())
  }
}

/// Recursive walker over a source tree.
#[derive(Debug, Clone)]
pub struct Scanner {
  root:       PathBuf,
  extensions: Vec<String>,
  exclude:    Vec<String>,
}

impl Scanner {
  /// Scanner for `root` with the default extension and exclusion rules.
  #[must_use]
  pub fn new(root: impl Into<PathBuf>) -> Self {
    let defaults = Config::default();
    Self {
      root:       root.into(),
      extensions: defaults.extensions,
      exclude:    defaults.exclude,
    }
  }

  /// Scanner for the configured input directory and rules.
  #[must_use]
  pub fn from_config(config: &Config) -> Self {
    Self {
      root:       config.input_dir.clone(),
      extensions: config.extensions.clone(),
      exclude:    config.exclude.clone(),
    }
  }

  #[must_use]
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Whether `extension` marks a document, ignoring case.
  #[must_use]
  pub fn is_document_extension(&self, extension: &str) -> bool {
    self
      .extensions
      .iter()
      .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(extension))
  }

  /// Whether files with this stem are kept out of the route list.
  #[must_use]
  pub fn is_excluded(&self, stem: &str) -> bool {
    self.exclude.iter().any(|name| name.eq_ignore_ascii_case(stem))
  }

  /// Walk the source tree depth first, siblings in file name order.
  ///
  /// Unreadable directories and entries are logged, recorded in the report
  /// and skipped; the rest of the tree is still scanned.
  #[must_use]
  pub fn scan(&self) -> ScanReport {
    let mut report = ScanReport::default();

    let walker = WalkDir::new(&self.root)
      .min_depth(1)
      .follow_links(true)
      .sort_by_file_name();

    for entry in walker {
      let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
          let path = e
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
          warn!("Skipping {}: {e}", path.display());
          report.errors.push(ScanError {
            path,
            message: e.to_string(),
          });
          continue;
        },
      };

      if !entry.file_type().is_file() {
        continue;
      }

      let path = entry.path();
      let is_document = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| self.is_document_extension(ext));
      if !is_document {
        continue;
      }

      if path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| self.is_excluded(stem))
      {
        trace!("Excluded from routes: {}", path.display());
        continue;
      }

      match route_for(&self.root, path) {
        Some(route) => {
          report.documents.push(SourceEntry {
            route,
            path: path.to_path_buf(),
          });
        },
        None => {
          warn!("Skipping {}: path is not valid UTF-8", path.display());
          report.errors.push(ScanError {
            path:    path.to_path_buf(),
            message: "path is not valid UTF-8".to_string(),
          });
        },
      }
    }

    trace!(
      "Found {} documents under {}",
      report.documents.len(),
      self.root.display()
    );
    report
  }
}

/// Route of the document at `path` under `root`.
///
/// Returns `None` when `path` is outside `root` or not valid UTF-8.
#[must_use]
pub fn route_for(root: &Path, path: &Path) -> Option<String> {
  let relative = path.strip_prefix(root).ok()?;
  let mut segments = relative
    .parent()
    .into_iter()
    .flat_map(Path::components)
    .map(|component| {
      match component {
        Component::Normal(segment) => segment.to_str(),
        _ => None,
      }
    })
    .collect::<Option<Vec<_>>>()?;

  let stem = relative.file_stem()?.to_str()?;
  if segments.is_empty() && stem == INDEX_STEM {
    return Some(String::new());
  }

  segments.push(stem);
  Some(segments.join("/"))
}

/// Split a requested route into safe path segments.
///
/// Leading and trailing slashes are ignored. Returns `None` for anything that
/// could step outside the source root or that no scanned document can have,
/// such as the top-level `index` (served as `""`).
#[must_use]
pub fn route_segments(route: &str) -> Option<Vec<&str>> {
  let trimmed = route.trim_matches('/');
  if trimmed.is_empty() {
    return Some(vec![INDEX_STEM]);
  }
  if trimmed == INDEX_STEM {
    return None;
  }

  let segments: Vec<&str> = trimmed.split('/').collect();
  let unsafe_segment = |segment: &&str| {
    segment.is_empty()
      || *segment == "."
      || *segment == ".."
      || segment.contains(['\\', ':', '\0'])
  };
  if segments.iter().any(unsafe_segment) {
    return None;
  }

  Some(segments)
}

/// The route list a static export pre-renders.
///
/// The root route comes first and is always present, followed by scanned
/// routes in scan order and then `extra`. Repeats are dropped.
#[must_use]
pub fn prerender_routes<'a>(
  scanned: impl IntoIterator<Item = &'a str>,
  extra: &'a [String],
) -> Vec<String> {
  let mut seen = HashSet::new();
  std::iter::once("")
    .chain(scanned)
    .chain(extra.iter().map(|route| route.trim_matches('/')))
    .filter(|route| seen.insert(*route))
    .map(str::to_string)
    .collect()
}
