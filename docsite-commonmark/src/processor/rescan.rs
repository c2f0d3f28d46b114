//! Heading recovery from rendered HTML.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{
  types::Heading,
  utils::{generate_id, never_matching_regex, strip_tags},
};

/// Headings comrak rendered from the document. With source positions on, each
/// carries a `data-sourcepos` attribute; raw HTML headings do not.
static HEADING_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?s)<h([1-6]) data-sourcepos="[0-9:-]+">(.*?)</h([1-6])>"#)
    .unwrap_or_else(|e| {
      log::error!("Failed to compile HEADING_TAG_RE regex: {e}");
      never_matching_regex()
    })
});

/// A `data-sourcepos` attribute inside an opening tag.
static SOURCEPOS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r#"(<[A-Za-z][A-Za-z0-9]*[^<>]*?) data-sourcepos="[0-9]+:[0-9]+-[0-9]+:[0-9]+""#,
  )
  .unwrap_or_else(|e| {
    log::error!("Failed to compile SOURCEPOS_ATTR_RE regex: {e}");
    never_matching_regex()
  })
});

/// Add `id` attributes to the document's headings in `html` and return them
/// in document order.
///
/// `html` must be rendered with source positions enabled. Only headings that
/// carry one are taken; headings written as raw HTML are left as they are and
/// never consume an explicit id. Source position attributes are removed from
/// the result.
///
/// `explicit_ids` holds one entry per document heading; entries past its end
/// count as `None`.
#[must_use]
pub fn assign_heading_ids(
  html: &str,
  explicit_ids: &[Option<String>],
) -> (String, Vec<Heading>) {
  let mut headings = Vec::new();

  let rewritten = HEADING_TAG_RE.replace_all(html, |caps: &Captures| {
    let (open, inner, close) = (&caps[1], &caps[2], &caps[3]);
    if open != close {
      return caps[0].to_string();
    }

    let level = open.parse::<u8>().unwrap_or(1);
    let title = strip_tags(inner).replace('\n', " ").trim().to_string();
    let id = explicit_ids
      .get(headings.len())
      .cloned()
      .flatten()
      .unwrap_or_else(|| generate_id(&title));

    let tag = format!(
      "<h{level} id=\"{}\">{inner}</h{level}>",
      html_escape::encode_double_quoted_attribute(&id)
    );
    headings.push(Heading::new(level, id, title));
    tag
  });

  let cleaned = SOURCEPOS_ATTR_RE.replace_all(&rewritten, "$1");
  (cleaned.into_owned(), headings)
}
