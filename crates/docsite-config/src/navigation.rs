//! Author-supplied navigation menu.
//!
//! The tree is data, not derived from the source directory: every entry is
//! written by hand in the configuration. docsite only orders it, serializes it
//! and, on request, checks it against the documents that actually exist.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One entry of the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationItem {
  /// Label shown in the menu.
  pub title: String,

  /// Route the entry links to; empty for the site root.
  #[serde(default)]
  pub path: String,

  /// Display position among siblings, lowest first.
  #[serde(default)]
  pub order: i64,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub children: Vec<Self>,
}

impl NavigationItem {
  /// Copy of `items` with every level ordered by `order`.
  ///
  /// Entries with equal `order` keep their configured sequence.
  #[must_use]
  pub fn sorted(items: &[Self]) -> Vec<Self> {
    let mut sorted: Vec<Self> = items
      .iter()
      .map(|item| {
        Self {
          children: Self::sorted(&item.children),
          ..item.clone()
        }
      })
      .collect();
    sorted.sort_by_key(|item| item.order);
    sorted
  }

  /// Paths of this entry and all of its descendants, depth first.
  pub fn iter_paths(&self) -> impl Iterator<Item = &str> + '_ {
    let mut stack = vec![self];
    std::iter::from_fn(move || {
      let item = stack.pop()?;
      stack.extend(item.children.iter().rev());
      Some(item.path.as_str())
    })
  }

  /// Find the entry for `path` anywhere in `items`.
  #[must_use]
  pub fn find<'a>(items: &'a [Self], path: &str) -> Option<&'a Self> {
    items.iter().find_map(|item| {
      if item.path == path {
        Some(item)
      } else {
        Self::find(&item.children, path)
      }
    })
  }

  /// Paths that appear more than once in `items`, in first-repeat order.
  #[must_use]
  pub fn duplicate_paths(items: &[Self]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for path in items.iter().flat_map(Self::iter_paths) {
      if !seen.insert(path) && !duplicates.iter().any(|d| d == path) {
        duplicates.push(path.to_string());
      }
    }
    duplicates
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(title: &str, path: &str, order: i64) -> NavigationItem {
    NavigationItem {
      title: title.to_string(),
      path: path.to_string(),
      order,
      children: Vec::new(),
    }
  }

  fn sample() -> Vec<NavigationItem> {
    vec![
      NavigationItem {
        children: vec![
          item("Quick Start", "getting-started/quick-start", 2),
          item("Introduction", "getting-started/introduction", 1),
        ],
        ..item("Getting Started", "getting-started", 2)
      },
      item("Home", "", 1),
      item("Changelog", "changelog", 2),
    ]
  }

  #[test]
  fn test_sorted_orders_every_level() {
    let sorted = NavigationItem::sorted(&sample());
    let titles: Vec<_> = sorted.iter().map(|i| i.title.as_str()).collect();
    // Ties keep their configured order
    assert_eq!(titles, ["Home", "Getting Started", "Changelog"]);
    assert_eq!(sorted[1].children[0].title, "Introduction");
  }

  #[test]
  fn test_iter_paths_depth_first() {
    let items = sample();
    let paths: Vec<_> =
      items.iter().flat_map(NavigationItem::iter_paths).collect();
    assert_eq!(paths, [
      "getting-started",
      "getting-started/quick-start",
      "getting-started/introduction",
      "",
      "changelog",
    ]);
  }

  #[test]
  fn test_find_nested() {
    let items = sample();
    let found = NavigationItem::find(&items, "getting-started/introduction");
    assert_eq!(found.map(|i| i.title.as_str()), Some("Introduction"));
    assert!(NavigationItem::find(&items, "missing").is_none());
  }

  #[test]
  fn test_duplicate_paths() {
    let mut items = sample();
    assert!(NavigationItem::duplicate_paths(&items).is_empty());

    items.push(item("Again", "changelog", 9));
    items.push(item("Thrice", "changelog", 10));
    assert_eq!(NavigationItem::duplicate_paths(&items), ["changelog"]);
  }

  #[test]
  fn test_children_are_optional_in_toml() {
    #[derive(Deserialize)]
    struct Document {
      nav: Vec<NavigationItem>,
    }

    let document: Result<Document, _> =
      toml::from_str("[[nav]]\ntitle = \"Home\"\npath = \"\"\norder = 1\n");
    assert!(document.is_ok());
    assert_eq!(
      document.map(|d| d.nav).unwrap_or_default(),
      vec![item("Home", "", 1)]
    );
  }
}
