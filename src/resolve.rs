use tracing::{debug, warn};
use crate::catalog::{Catalog, NodeReleaseSource, ReleaseRecord, ReleaseSource};
use crate::global::cache::CatalogCache;
use crate::global::utils::Config;
use crate::tools::display_name;
use crate::util::{is_exact_version, parse_range};

/// Finds the release `requested` refers to inside `catalog`.
///
/// `latest` is the newest release, `lts` the newest LTS release, and an
/// npm-style range the newest release satisfying it. "Newest" means first in
/// catalog order, not highest version number.
pub fn resolve_in_catalog<'a>(requested: &str, catalog: &'a Catalog) -> Option<&'a ReleaseRecord> {
    match requested {
        "latest" => catalog.latest(),
        "lts" => catalog.latest_lts(),
        _ => parse_range(requested).and_then(|range| catalog.latest_matching(&range)),
    }
}

/// Resolves version requests for one tool against its cached release catalog.
pub struct CatalogResolver<S: ReleaseSource> {
    cache: CatalogCache,
    source: S,
}

impl<S: ReleaseSource> CatalogResolver<S> {
    pub fn new(cache: CatalogCache, source: S) -> Self {
        Self { cache, source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Turns `requested` into an exact version.
    ///
    /// Exact versions are returned untouched without looking at the catalog.
    /// Anything else goes through [`CatalogResolver::resolve_release`].
    pub fn resolve(&self, requested: &str) -> Option<String> {
        if is_exact_version(requested) {
            return Some(requested.to_string());
        }
        self.resolve_release(requested).map(|release| release.version)
    }

    /// Refreshes the catalog if needed and picks the release `requested`
    /// refers to. Reports and returns `None` when nothing matches.
    pub fn resolve_release(&self, requested: &str) -> Option<ReleaseRecord> {
        let tool = display_name(self.source.tool());
        let Some(catalog) = self.cache.refresh(&self.source) else {
            warn!("No {tool} release list available");
            warn!("Desired {tool} version cannot be found.");
            return None;
        };
        match resolve_in_catalog(requested, &catalog) {
            Some(release) => {
                debug!("Resolved {tool} {requested} to {}", release.version);
                Some(release.clone())
            }
            None => {
                warn!("Desired {tool} version cannot be found.");
                None
            }
        }
    }
}

/// The resolver backed by the official Node.js release index.
pub fn node_resolver(config: &Config) -> CatalogResolver<NodeReleaseSource> {
    CatalogResolver::new(
        CatalogCache::new(&config.cache_dir, "node", config.cool_down),
        NodeReleaseSource::new(&config.node_index_url),
    )
}

/// Resolves `requested` for `tool` to one exact version.
///
/// Exact versions pass through for every tool. Aliases and ranges need a
/// release catalog, which only Node has; other tools report the request as
/// unresolvable.
pub fn resolve_version(tool: &str, requested: &str, config: &Config) -> Option<String> {
    if is_exact_version(requested) {
        return Some(requested.to_string());
    }
    match tool {
        "node" => node_resolver(config).resolve(requested),
        other => {
            debug!("No release catalog adapter for {other}");
            warn!("Desired {} version cannot be found.", display_name(other));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;
    use anyhow::{bail, Result};
    use chrono::Utc;
    use crate::catalog::Lts;
    use tempfile::tempdir;

    fn record(version: &str, lts: &str, npm: &str) -> ReleaseRecord {
        ReleaseRecord {
            version: version.to_string(),
            release_date: "2026-01-01".to_string(),
            installer_files: vec!["linux-x64".to_string()],
            package_manager_version: Some(npm.to_string()),
            lts: if lts.is_empty() { Lts::Flag(false) } else { Lts::Codename(lts.to_string()) },
        }
    }

    fn releases() -> Vec<ReleaseRecord> {
        vec![
            record("25.6.1", "", "11.8.0"),
            record("25.6.0", "", "11.8.0"),
            record("24.13.1", "Krypton", "11.6.2"),
            record("23.11.1", "", "10.9.2"),
            record("22.22.0", "Jod", "10.9.4"),
            record("22.21.1", "Jod", "10.9.4"),
            record("22.1.3", "", "10.7.0"),
            record("22.1.0", "", "10.7.0"),
            record("22.0.0", "", "10.5.1"),
            record("20.20.0", "Iron", "10.8.2"),
        ]
    }

    struct FakeSource {
        calls: Cell<usize>,
        fail: bool,
    }

    impl ReleaseSource for FakeSource {
        fn tool(&self) -> &str {
            "node"
        }

        fn fetch_releases(&self) -> Result<Vec<ReleaseRecord>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                bail!("offline");
            }
            Ok(releases())
        }
    }

    fn resolver(cache_dir: &std::path::Path, fail: bool) -> CatalogResolver<FakeSource> {
        CatalogResolver::new(
            CatalogCache::new(cache_dir, "node", Duration::from_secs(10)),
            FakeSource { calls: Cell::new(0), fail },
        )
    }

    #[test]
    fn test_resolve_in_catalog() {
        let catalog = Catalog::new(releases(), Utc::now());
        let resolve = |requested| resolve_in_catalog(requested, &catalog).map(|r| r.version.as_str());
        assert_eq!(resolve("latest"), Some("25.6.1"));
        assert_eq!(resolve("lts"), Some("24.13.1"));
        assert_eq!(resolve("22.x.x"), Some("22.22.0"));
        assert_eq!(resolve("22"), Some("22.22.0"));
        assert_eq!(resolve("22.1"), Some("22.1.3"));
        assert_eq!(resolve("22.1.x"), Some("22.1.3"));
        assert_eq!(resolve(">=23.0.0 <25.0.0"), Some("24.13.1"));
        assert_eq!(resolve(">=22 <24"), Some("23.11.1"));
        assert_eq!(resolve("^20 || ^22"), Some("22.22.0"));
        assert_eq!(resolve("<21 || >=26"), Some("20.20.0"));
        assert_eq!(resolve("9001.x.x"), None);
        assert_eq!(resolve("asdf"), None);
    }

    #[test]
    fn test_resolve_follows_catalog_order() {
        let catalog = Catalog::new(
            vec![record("21.0.0", "", "10.0.0"), record("21.7.3", "", "10.5.0")],
            Utc::now(),
        );
        assert_eq!(resolve_in_catalog("21", &catalog).unwrap().version, "21.0.0");
    }

    #[test]
    fn test_exact_version_skips_catalog() {
        let dir = tempdir().unwrap();
        let resolver = resolver(dir.path(), false);
        assert_eq!(resolver.resolve("22.0.0").as_deref(), Some("22.0.0"));
        assert_eq!(resolver.resolve("v22.0.0").as_deref(), Some("v22.0.0"));
        assert_eq!(resolver.source().calls.get(), 0);
        assert!(!dir.path().join("nodeVersions.json").exists());
    }

    #[test]
    fn test_resolve_through_catalog() {
        let dir = tempdir().unwrap();
        let resolver = resolver(dir.path(), false);
        assert_eq!(resolver.resolve("latest").as_deref(), Some("25.6.1"));
        assert_eq!(resolver.resolve("lts").as_deref(), Some("24.13.1"));
        assert_eq!(resolver.resolve("22.x.x").as_deref(), Some("22.22.0"));
        assert_eq!(resolver.resolve("9001.x.x"), None);
        assert_eq!(resolver.source().calls.get(), 1);
    }

    #[test]
    fn test_resolve_release_carries_bundled_npm() {
        let dir = tempdir().unwrap();
        let release = resolver(dir.path(), false).resolve_release("lts").unwrap();
        assert_eq!(release.package_manager_version.as_deref(), Some("11.6.2"));
    }

    #[test]
    fn test_resolve_offline_without_cache() {
        let dir = tempdir().unwrap();
        assert_eq!(resolver(dir.path(), true).resolve("lts"), None);
    }

    #[test]
    fn test_resolve_offline_uses_stale_cache() {
        let dir = tempdir().unwrap();
        let cache = CatalogCache::new(dir.path(), "node", Duration::from_secs(10));
        let stale = Catalog::new(releases(), Utc::now() - chrono::Duration::days(3));
        cache.store(&stale).unwrap();

        let resolver = resolver(dir.path(), true);
        assert_eq!(resolver.resolve("lts").as_deref(), Some("24.13.1"));
        assert_eq!(resolver.source().calls.get(), 1);
    }

    #[test]
    fn test_resolve_version_exact_for_any_tool() {
        let dir = tempdir().unwrap();
        let config = Config {
            cache_dir: dir.path().to_path_buf(),
            config_dir: dir.path().to_path_buf(),
            node_index_url: "http://127.0.0.1:9/index.json".to_string(),
            cool_down: Duration::from_secs(10),
        };
        assert_eq!(resolve_version("node", "22.0.0", &config).as_deref(), Some("22.0.0"));
        assert_eq!(resolve_version("pnpm", "9.1.0", &config).as_deref(), Some("9.1.0"));
        assert_eq!(resolve_version("pnpm", "latest", &config), None);
    }
}
