use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use crate::catalog::{Catalog, ReleaseSource};
use crate::util::Lookup;

/// Suffix of every cached catalog file, e.g. `nodeVersions.json`.
const CATALOG_FILE_SUFFIX: &str = "Versions.json";

/// Returns the cache file holding the release catalog of `tool`.
pub fn catalog_cache_path(cache_dir: &Path, tool: &str) -> PathBuf {
    cache_dir.join(format!("{tool}{CATALOG_FILE_SUFFIX}"))
}

/// The on-disk release catalog of one tool.
///
/// Remote fetches are skipped while the cached snapshot is younger than the
/// cool-down window.
#[derive(Debug, Clone)]
pub struct CatalogCache {
    path: PathBuf,
    cool_down: Duration,
}

impl CatalogCache {
    pub fn new(cache_dir: &Path, tool: &str, cool_down: Duration) -> Self {
        Self {
            path: catalog_cache_path(cache_dir, tool),
            cool_down,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached catalog. Never fails: unreadable or unparsable files
    /// are reported as [`Lookup::Malformed`].
    pub fn load(&self) -> Lookup<Catalog> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Lookup::NotFound,
            Err(e) => return Lookup::Malformed(e.to_string()),
        };
        match serde_json::from_str(&contents) {
            Ok(catalog) => Lookup::Found(catalog),
            Err(e) => Lookup::Malformed(e.to_string()),
        }
    }

    /// Writes `catalog` pretty-printed with a trailing newline.
    ///
    /// The file is written next to its destination and renamed into place so
    /// a concurrent reader never sees half a catalog.
    pub fn store(&self, catalog: &Catalog) -> Result<()> {
        let dir = self
            .path
            .parent()
            .context("Catalog cache path has no parent directory")?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Could not create cache dir {:?}", dir))?;
        let mut contents = serde_json::to_string_pretty(catalog)?;
        contents.push('\n');
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(contents.as_bytes())?;
        file.persist(&self.path)
            .with_context(|| format!("Could not write cache file {:?}", self.path))?;
        Ok(())
    }

    /// Returns a catalog that is at most one cool-down window old, fetching
    /// from `source` only when the cached one is missing or stale.
    ///
    /// A failed fetch is logged and the previously cached catalog, if any, is
    /// returned instead.
    pub fn refresh(&self, source: &dyn ReleaseSource) -> Option<Catalog> {
        self.refresh_at(source, Utc::now())
    }

    /// [`CatalogCache::refresh`] with an explicit clock.
    pub fn refresh_at(&self, source: &dyn ReleaseSource, now: DateTime<Utc>) -> Option<Catalog> {
        let cached = match self.load() {
            Lookup::Found(catalog) => Some(catalog),
            Lookup::NotFound => None,
            Lookup::Malformed(reason) => {
                warn!("Ignoring unreadable release cache {}: {reason}", self.path.display());
                None
            }
        };
        if let Some(catalog) = &cached {
            if catalog.is_fresh(now, self.cool_down) {
                debug!("Using cached {} releases from {}", source.tool(), catalog.fetched_at);
                return cached;
            }
        }

        let releases = match source.fetch_releases() {
            Ok(releases) => releases,
            Err(e) => {
                warn!("Error checking for latest {} releases: {e:#}", source.tool());
                return cached;
            }
        };
        info!("Fetched {} {} releases", releases.len(), source.tool());
        let catalog = Catalog::new(releases, now);
        if let Err(e) = self.store(&catalog) {
            warn!("{e:#}");
        }
        Some(catalog)
    }
}

/// Deletes every cached release catalog in `cache_dir`.
/// Returns how many files were removed.
pub fn purge_catalog_cache(cache_dir: &Path) -> Result<usize> {
    if !cache_dir.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in std::fs::read_dir(cache_dir)? {
        let path = entry?.path();
        let is_catalog = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(CATALOG_FILE_SUFFIX));
        if is_catalog && path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Could not remove {:?}", path))?;
            removed += 1;
        }
    }
    Ok(removed)
}
