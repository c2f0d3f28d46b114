use std::{
  fs,
  path::{Path, PathBuf},
};

use docsite_config::{Config, NavigationItem};
use log::{error, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
  error::{BuildError, PageError, ScanError},
  resolver::{PageRecord, Resolver},
  scanner::prerender_routes,
};

/// Outcome of a site build.
#[derive(Debug, Default)]
pub struct BuildReport {
  /// The pre-render route list written to `routes.json`.
  pub routes:      Vec<String>,
  /// Number of page records written.
  pub written:     usize,
  /// Pages that could not be produced.
  pub failed:      Vec<PageError>,
  pub scan_errors: Vec<ScanError>,
}

/// Subdirectory of the output that holds page records, apart from the
/// build's own `routes.json` and `navigation.json`.
pub const PAGES_DIR: &str = "pages";

/// Output file of the page record for `route`.
#[must_use]
pub fn page_output_path(output_dir: &Path, route: &str) -> PathBuf {
  let pages = output_dir.join(PAGES_DIR);
  if route.is_empty() {
    pages.join("index.json")
  } else {
    pages.join(format!("{route}.json"))
  }
}

/// Render every scanned document and write the results under `output_dir`.
///
/// Pages are compiled in parallel on a pool of `config.effective_jobs()`
/// threads. A page that fails is logged and listed in the report; the build
/// carries on with the others.
///
/// # Errors
///
/// Returns an error if the worker pool cannot be created or the output
/// directory, `routes.json` or `navigation.json` cannot be written.
pub fn build_site(
  config: &Config,
  resolver: &Resolver,
) -> Result<BuildReport, BuildError> {
  let output_dir = &config.output_dir;
  info!("Input directory: {}", resolver.scanner().root().display());
  info!("Output directory: {}", output_dir.display());

  let scan = resolver.scanner().scan();
  info!("Found {} documents", scan.documents.len());

  fs::create_dir_all(output_dir).map_err(|source| {
    BuildError::Io {
      path: output_dir.clone(),
      source,
    }
  })?;

  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(config.effective_jobs())
    .build()?;

  let outcomes: Vec<Result<(), PageError>> = pool.install(|| {
    scan
      .documents
      .par_iter()
      .map(|doc| {
        let page = resolver.render_file(&doc.route, &doc.path)?;
        write_page(output_dir, &page)
      })
      .collect()
  });

  let mut report = BuildReport {
    routes: prerender_routes(scan.routes(), &config.prerender),
    ..BuildReport::default()
  };
  for outcome in outcomes {
    match outcome {
      Ok(()) => report.written += 1,
      Err(e) => {
        warn!("{e}");
        report.failed.push(e);
      },
    }
  }
  report.scan_errors = scan.errors;

  write_json(&output_dir.join("routes.json"), "route list", &report.routes)?;
  write_json(
    &output_dir.join("navigation.json"),
    "navigation",
    &NavigationItem::sorted(&config.navigation),
  )?;

  info!(
    "Wrote {} pages to {} ({} failed)",
    report.written,
    output_dir.display(),
    report.failed.len()
  );
  Ok(report)
}

fn write_page(output_dir: &Path, page: &PageRecord) -> Result<(), PageError> {
  let path = page_output_path(output_dir, &page.slug);
  write_json(&path, "page record", page).map_err(|e| {
    error!("{e}");
    PageError::Unavailable {
      route: page.slug.clone(),
    }
  })
}

fn write_json<T: Serialize + ?Sized>(
  path: &Path,
  what: &str,
  value: &T,
) -> Result<(), BuildError> {
  let json = serde_json::to_string_pretty(value).map_err(|source| {
    BuildError::Serialize {
      what: what.to_string(),
      source,
    }
  })?;

  let io_error = |source: std::io::Error| {
    BuildError::Io {
      path: path.to_path_buf(),
      source,
    }
  };
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(io_error)?;
  }
  fs::write(path, json).map_err(io_error)
}
