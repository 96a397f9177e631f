use std::path::PathBuf;
use std::time::Duration;
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use crate::catalog::NODE_RELEASE_INDEX_URL;

/// How long a fetched release catalog is trusted before it is fetched again.
pub const API_COOL_DOWN: Duration = Duration::from_secs(10);

pub const CACHE_DIR_ENV: &str = "DEVENGINES_CACHE_DIR";
pub const CONFIG_DIR_ENV: &str = "DEVENGINES_CONFIG_DIR";
pub const NODE_INDEX_URL_ENV: &str = "DEVENGINES_NODE_INDEX_URL";
pub const COOL_DOWN_ENV: &str = "DEVENGINES_COOL_DOWN_SECS";

/// Machine-wide settings of the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Holds the cached release catalogs.
    pub cache_dir: PathBuf,
    /// Holds `globalTools.json`.
    pub config_dir: PathBuf,
    pub node_index_url: String,
    pub cool_down: Duration,
}

impl Config {
    /// Builds the configuration from the platform directories, overridden by
    /// the `DEVENGINES_*` environment variables.
    pub fn load() -> Result<Config> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] but reads variables through `lookup`.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Config> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let (cache_dir, config_dir) = match (non_empty(CACHE_DIR_ENV), non_empty(CONFIG_DIR_ENV)) {
            (Some(cache), Some(config)) => (PathBuf::from(cache), PathBuf::from(config)),
            (cache, config) => {
                let (default_config, default_cache) = get_global_dirs()?;
                (
                    cache.map(PathBuf::from).unwrap_or(default_cache),
                    config.map(PathBuf::from).unwrap_or(default_config),
                )
            }
        };

        let cool_down = match non_empty(COOL_DOWN_ENV) {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .with_context(|| format!("{COOL_DOWN_ENV} must be a whole number of seconds"))?,
            ),
            None => API_COOL_DOWN,
        };

        Ok(Config {
            cache_dir,
            config_dir,
            node_index_url: non_empty(NODE_INDEX_URL_ENV)
                .unwrap_or_else(|| NODE_RELEASE_INDEX_URL.to_string()),
            cool_down,
        })
    }
}

/// Returns the platform config and cache directories.
pub fn get_global_dirs() -> Result<(PathBuf, PathBuf)> {
    let proj_dirs = ProjectDirs::from("org", "devengines", "devengines")
        .ok_or_else(|| anyhow!("Could not get project directories"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    let cache_dir = proj_dirs.cache_dir().to_path_buf();

    Ok((config_dir, cache_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_overrides() {
        let config = config_with(&[
            (CACHE_DIR_ENV, "/tmp/de-cache"),
            (CONFIG_DIR_ENV, "/tmp/de-config"),
            (NODE_INDEX_URL_ENV, "http://localhost:9/index.json"),
            (COOL_DOWN_ENV, "60"),
        ])
        .unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/de-cache"));
        assert_eq!(config.config_dir, PathBuf::from("/tmp/de-config"));
        assert_eq!(config.node_index_url, "http://localhost:9/index.json");
        assert_eq!(config.cool_down, Duration::from_secs(60));
    }

    #[test]
    fn test_config_defaults() {
        let config = config_with(&[
            (CACHE_DIR_ENV, "/tmp/de-cache"),
            (CONFIG_DIR_ENV, "/tmp/de-config"),
            (COOL_DOWN_ENV, " "),
        ])
        .unwrap();
        assert_eq!(config.node_index_url, NODE_RELEASE_INDEX_URL);
        assert_eq!(config.cool_down, API_COOL_DOWN);
    }

    #[test]
    fn test_config_rejects_bad_cool_down() {
        let result = config_with(&[
            (CACHE_DIR_ENV, "/tmp/de-cache"),
            (CONFIG_DIR_ENV, "/tmp/de-config"),
            (COOL_DOWN_ENV, "ten"),
        ]);
        assert!(result.is_err());
    }
}
