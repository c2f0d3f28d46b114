//! Site assembly for docsite.
//!
//! The [`Scanner`] discovers routable Markdown files, the [`Resolver`] turns a
//! route into a [`PageRecord`], and [`build_site`] runs the resolver over a
//! whole source tree in parallel. All of them follow one route rule, see
//! [`scanner`].
pub mod build;
pub mod check;
pub mod error;
pub mod resolver;
pub mod scanner;

pub use crate::{
  build::{BuildReport, PAGES_DIR, build_site, page_output_path},
  check::{NavigationReport, check_navigation},
  error::{BuildError, PageError, ScanError},
  resolver::{PageRecord, Resolver},
  scanner::{ScanReport, Scanner, SourceEntry, prerender_routes, route_for},
};
