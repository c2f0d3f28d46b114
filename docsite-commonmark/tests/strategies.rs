//! Both heading capture strategies must agree on every document.

use docsite_commonmark::{
  CompileStrategy,
  Heading,
  MarkdownOptionsBuilder,
  MarkdownProcessor,
  build_toc,
};

const CORPUS: &[&str] = &[
  "",
  "No headings at all, just a paragraph.\n",
  "# Hello, World! 2.0\n\nIntro.\n\n## Step 1: Install\n\n### Linux\n\n## Step 2: Configure\n",
  "## Install Guide {#setup}\n\n## Usage\n\n## Usage\n",
  "# Title with `inline code` and *emphasis*\n\n## A **strong** [link](https://example.com)\n",
  "Setext Heading\n==============\n\nSecond Level\n------------\n",
  "# A & B < C\n\n## Caf\u{e9} D\u{e9}j\u{e0} Vu\n\n## \u{65e5}\u{672c}\u{8a9e}\n\n## !!!\n",
  "### Starts deep\n\n# Then top\n\n## Then middle\n",
  "# Heading\n\n```rust\n// <h2>not a heading</h2>\nfn main() {}\n```\n\n## After code\n",
  "> ## Quoted heading\n\n- list\n\n  ## Heading in list\n",
  "# Trailing hashes ##\n\n## Marker {#marker-id}   \n\n## Not {#a marker}\n",
  "---\n\n# After a rule\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n## ~~Struck~~ heading\n",
  "<h2>Raw</h2>\n\n## Install {#setup}\n",
  "# Top\n\n<h3 class=\"x\">Styled raw</h3>\n\n<h2>Raw</h2>\n\n## Real {#real}\n\n## Generated\n",
];

fn processor(strategy: CompileStrategy) -> MarkdownProcessor {
  MarkdownProcessor::new(
    MarkdownOptionsBuilder::new()
      .gfm(true)
      .highlight_code(false)
      .strategy(strategy)
      .build(),
  )
}

#[test]
fn test_strategies_yield_identical_headings() {
  let hook = processor(CompileStrategy::Hook);
  let rescan = processor(CompileStrategy::Rescan);

  for doc in CORPUS {
    let from_hook = hook.render(doc);
    let from_rescan = rescan.render(doc);

    assert_eq!(
      from_hook.headings, from_rescan.headings,
      "heading mismatch for document:\n{doc}"
    );
    assert_eq!(from_hook.title, from_rescan.title);
    assert_eq!(build_toc(&from_hook.headings), build_toc(&from_rescan.headings));
  }
}

#[test]
fn test_every_heading_gets_an_id_attribute() {
  for strategy in CompileStrategy::ALL {
    let processor = processor(strategy);
    for doc in CORPUS {
      let result = processor.render(doc);
      for heading in &result.headings {
        let tag = format!("<h{} id=\"{}\">", heading.level, heading.id);
        assert!(
          result.html.contains(&tag),
          "{strategy}: missing {tag} in {}",
          result.html
        );
      }
    }
  }
}

#[test]
fn test_known_corpus_headings() {
  let result = processor(CompileStrategy::Rescan).render(CORPUS[6]);
  assert_eq!(result.headings, vec![
    Heading::new(1, "a-b-c", "A & B < C"),
    Heading::new(2, "caf-dj-vu", "Caf\u{e9} D\u{e9}j\u{e0} Vu"),
    Heading::new(2, "", "\u{65e5}\u{672c}\u{8a9e}"),
    Heading::new(2, "", "!!!"),
  ]);

  let result = processor(CompileStrategy::Hook).render(CORPUS[8]);
  let ids: Vec<_> = result.headings.iter().map(|h| h.id.as_str()).collect();
  assert_eq!(ids, ["heading", "after-code"]);
}

#[test]
fn test_raw_html_headings_are_passed_through() {
  for strategy in CompileStrategy::ALL {
    let result = processor(strategy).render(CORPUS[12]);
    assert_eq!(
      result.headings,
      vec![Heading::new(2, "setup", "Install")],
      "strategy {strategy}"
    );
    assert!(result.html.contains("<h2>Raw</h2>"));
    assert!(result.html.contains(r#"<h2 id="setup">Install</h2>"#));
    assert!(!result.html.contains("data-sourcepos"));
  }
}
