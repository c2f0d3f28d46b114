use std::sync::LazyLock;

use regex::Regex;

/// Characters that never survive into a generated heading id: anything that
/// is not an ASCII word character, whitespace or a hyphen.
static NON_ID_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"[^A-Za-z0-9_\s-]").unwrap_or_else(|e| {
    log::error!("Failed to compile NON_ID_CHARS_RE regex: {e}");
    never_matching_regex()
  })
});

static WHITESPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\s+").unwrap_or_else(|e| {
    log::error!("Failed to compile WHITESPACE_RUN_RE regex: {e}");
    never_matching_regex()
  })
});

static EXPLICIT_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\s*\{#([A-Za-z0-9_-]+)\}\s*$").unwrap_or_else(|e| {
    log::error!("Failed to compile EXPLICIT_ANCHOR_RE regex: {e}");
    never_matching_regex()
  })
});

static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"<[^>]*>").unwrap_or_else(|e| {
    log::error!("Failed to compile HTML_TAG_RE regex: {e}");
    never_matching_regex()
  })
});

/// Derive a heading id from its title.
///
/// Lower-cases the text, drops every character that is not an ASCII word
/// character, whitespace or `-`, then turns each whitespace run into a single
/// hyphen. The result is deterministic but not guaranteed to be unique within
/// a document; callers pass already-trimmed titles.
///
/// ```
/// use docsite_commonmark::utils::generate_id;
///
/// assert_eq!(generate_id("Hello, World! 2.0"), "hello-world-20");
/// ```
#[must_use]
pub fn generate_id(title: &str) -> String {
  let lowered = title.to_lowercase();
  let stripped = NON_ID_CHARS_RE.replace_all(&lowered, "");
  WHITESPACE_RUN_RE
    .replace_all(&stripped, "-")
    .trim()
    .to_string()
}

/// Split a trailing `{#id}` marker off heading text.
///
/// Returns the text without the marker and the explicit id, if one was given.
#[must_use]
pub fn split_explicit_anchor(text: &str) -> (String, Option<String>) {
  EXPLICIT_ANCHOR_RE.captures(text).map_or_else(
    || (text.to_string(), None),
    |caps| {
      let id = caps.get(1).map(|m| m.as_str().to_string());
      let start = caps.get(0).map_or(text.len(), |m| m.start());
      (text[..start].to_string(), id)
    },
  )
}

/// Remove HTML tags and decode entities, leaving the visible text.
#[must_use]
pub fn strip_tags(html: &str) -> String {
  let without_tags = HTML_TAG_RE.replace_all(html, "");
  html_escape::decode_html_entities(&without_tags).into_owned()
}

/// Create a regex that never matches anything.
///
/// Used as a fallback when one of the static patterns fails to compile, so a
/// broken pattern degrades to "no match" instead of a panic.
#[must_use]
pub fn never_matching_regex() -> Regex {
  #[allow(
    clippy::expect_used,
    reason = "This pattern is guaranteed to be valid"
  )]
  Regex::new(r"[^\s\S]").expect("regex pattern [^\\s\\S] should always compile")
}
