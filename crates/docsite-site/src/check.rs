use std::collections::HashSet;

use docsite_config::NavigationItem;

/// Problems found in the navigation tree.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NavigationReport {
  /// Paths with no backing document, in tree order.
  pub missing:    Vec<String>,
  /// Paths listed more than once.
  pub duplicates: Vec<String>,
}

impl NavigationReport {
  #[must_use]
  pub const fn is_clean(&self) -> bool {
    self.missing.is_empty() && self.duplicates.is_empty()
  }
}

/// Compare the navigation tree against the routes a scan produced.
///
/// Only runs when asked for; builds and page requests never call it.
#[must_use]
pub fn check_navigation<'a>(
  navigation: &[NavigationItem],
  routes: impl IntoIterator<Item = &'a str>,
) -> NavigationReport {
  let known: HashSet<&str> = routes.into_iter().collect();

  let mut missing: Vec<String> = Vec::new();
  for path in navigation.iter().flat_map(NavigationItem::iter_paths) {
    let path = path.trim_matches('/');
    if !known.contains(path) && !missing.iter().any(|m| m == path) {
      missing.push(path.to_string());
    }
  }

  NavigationReport {
    missing,
    duplicates: NavigationItem::duplicate_paths(navigation),
  }
}
