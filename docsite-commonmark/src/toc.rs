//! Table-of-contents construction from a flat heading sequence.
//!
//! Headings are folded into a forest with a stack of open nodes: each new
//! heading closes every open node whose level is not strictly lower than its
//! own, then attaches to whatever remains on top of the stack (or becomes a
//! new root). No intermediate levels are synthesised, so a level 3 heading
//! directly under a level 1 heading becomes its child.

use serde::{Deserialize, Serialize};

use crate::types::Heading;

/// A node in the table of contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TocNode {
  pub id:       String,
  pub title:    String,
  pub level:    u8,
  pub children: Vec<Self>,
}

impl TocNode {
  fn leaf(heading: &Heading) -> Self {
    Self {
      id:       heading.id.clone(),
      title:    heading.title.clone(),
      level:    heading.level,
      children: Vec::new(),
    }
  }

  /// Number of nodes in this subtree, including `self`.
  #[must_use]
  pub fn len(&self) -> usize {
    1 + self.children.iter().map(Self::len).sum::<usize>()
  }

  /// Always `false`; a node counts itself.
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    false
  }
}

/// Build the table-of-contents forest for `headings`, in document order.
///
/// Runs in a single pass: every heading is pushed once and popped at most
/// once.
#[must_use]
pub fn build_toc(headings: &[Heading]) -> Vec<TocNode> {
  let mut roots: Vec<TocNode> = Vec::new();
  // Open nodes, by increasing level. Each one is detached from its parent
  // while open and attached back when it gets closed.
  let mut stack: Vec<TocNode> = Vec::with_capacity(6);

  for heading in headings {
    while stack.last().is_some_and(|top| top.level >= heading.level) {
      close_top(&mut stack, &mut roots);
    }
    stack.push(TocNode::leaf(heading));
  }

  while !stack.is_empty() {
    close_top(&mut stack, &mut roots);
  }

  roots
}

/// Pop the top of the stack and attach it to the new top, or to the roots.
fn close_top(stack: &mut Vec<TocNode>, roots: &mut Vec<TocNode>) {
  if let Some(node) = stack.pop() {
    match stack.last_mut() {
      Some(parent) => parent.children.push(node),
      None => roots.push(node),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn headings(levels: &[u8]) -> Vec<Heading> {
    levels
      .iter()
      .enumerate()
      .map(|(i, level)| Heading::new(*level, format!("h{i}"), format!("Heading {i}")))
      .collect()
  }

  #[test]
  fn test_empty_document() {
    assert!(build_toc(&[]).is_empty());
  }

  #[test]
  fn test_nesting_1_2_2_3_1_2() {
    let toc = build_toc(&headings(&[1, 2, 2, 3, 1, 2]));

    assert_eq!(toc.len(), 2);
    assert_eq!(toc[0].id, "h0");
    assert_eq!(toc[0].children.len(), 2);
    assert_eq!(toc[0].children[0].id, "h1");
    assert!(toc[0].children[0].children.is_empty());
    assert_eq!(toc[0].children[1].id, "h2");
    assert_eq!(toc[0].children[1].children.len(), 1);
    assert_eq!(toc[0].children[1].children[0].id, "h3");

    assert_eq!(toc[1].id, "h4");
    assert_eq!(toc[1].children.len(), 1);
    assert_eq!(toc[1].children[0].id, "h5");
  }

  #[test]
  fn test_first_heading_not_level_one() {
    let toc = build_toc(&headings(&[3, 1, 2]));

    assert_eq!(toc.len(), 2);
    assert_eq!(toc[0].level, 3);
    assert!(toc[0].children.is_empty());
    assert_eq!(toc[1].level, 1);
    assert_eq!(toc[1].children.len(), 1);
    assert_eq!(toc[1].children[0].level, 2);
  }

  #[test]
  fn test_skipped_level_becomes_direct_child() {
    let toc = build_toc(&headings(&[2, 1, 3]));

    assert_eq!(toc.len(), 2);
    assert_eq!(toc[1].level, 1);
    assert_eq!(toc[1].children.len(), 1);
    assert_eq!(toc[1].children[0].level, 3);
  }

  #[test]
  fn test_same_level_siblings() {
    let toc = build_toc(&headings(&[2, 2, 2]));
    assert_eq!(toc.len(), 3);
    assert!(toc.iter().all(|node| node.children.is_empty()));
  }

  #[test]
  fn test_deep_chain_preserves_order_and_count() {
    let input = headings(&[1, 2, 3, 4, 5, 6, 2, 3]);
    let toc = build_toc(&input);

    assert_eq!(toc.len(), 1);
    assert_eq!(toc[0].len(), input.len());

    let mut order = Vec::new();
    fn walk(node: &TocNode, out: &mut Vec<String>) {
      out.push(node.id.clone());
      for child in &node.children {
        walk(child, out);
      }
    }
    walk(&toc[0], &mut order);
    let expected: Vec<String> = input.iter().map(|h| h.id.clone()).collect();
    assert_eq!(order, expected);
  }

  #[test]
  fn test_children_only_have_greater_levels() {
    let toc = build_toc(&headings(&[1, 3, 2, 4, 1, 1, 5, 3]));

    fn check(node: &TocNode) {
      for child in &node.children {
        assert!(child.level > node.level);
        check(child);
      }
    }
    toc.iter().for_each(check);
  }
}
