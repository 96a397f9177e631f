use std::time::Duration;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use node_semver::{Range, Version};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where Node.js publishes its list of releases.
pub const NODE_RELEASE_INDEX_URL: &str = "https://nodejs.org/download/release/index.json";

/// The `lts` field of a release: `false`, or the codename of the LTS line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lts {
    Flag(bool),
    Codename(String),
}

impl Lts {
    pub fn is_lts(&self) -> bool {
        match self {
            Lts::Flag(flag) => *flag,
            Lts::Codename(name) => !name.is_empty(),
        }
    }
}

impl Default for Lts {
    fn default() -> Self {
        Lts::Flag(false)
    }
}

/// One published release of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRecord {
    /// Version without a leading `v`, e.g. `24.13.1`.
    pub version: String,
    pub release_date: String,
    /// Installer/archive identifiers published with the release.
    #[serde(default)]
    pub installer_files: Vec<String>,
    /// The package manager version shipped with the release (npm for Node).
    #[serde(default)]
    pub package_manager_version: Option<String>,
    #[serde(default)]
    pub lts: Lts,
}

/// A snapshot of a tool's releases, newest first, stamped with the time it
/// was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub fetched_at: DateTime<Utc>,
    pub releases: Vec<ReleaseRecord>,
}

impl Catalog {
    pub fn new(releases: Vec<ReleaseRecord>, fetched_at: DateTime<Utc>) -> Self {
        Self { fetched_at, releases }
    }

    /// Whether the snapshot was fetched less than `cool_down` before `now`.
    /// A timestamp in the future counts as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, cool_down: Duration) -> bool {
        match (now - self.fetched_at).to_std() {
            Ok(elapsed) => elapsed < cool_down,
            Err(_) => true,
        }
    }

    /// The newest release.
    pub fn latest(&self) -> Option<&ReleaseRecord> {
        self.releases.first()
    }

    /// The newest release flagged as LTS.
    pub fn latest_lts(&self) -> Option<&ReleaseRecord> {
        self.releases.iter().find(|release| release.lts.is_lts())
    }

    /// The first release, in catalog order, whose version satisfies `range`.
    /// Records whose version does not parse never match.
    pub fn latest_matching(&self, range: &Range) -> Option<&ReleaseRecord> {
        self.releases.iter().find(|release| {
            Version::parse(&release.version)
                .map(|version| range.satisfies(&version))
                .unwrap_or(false)
        })
    }
}

/// Somewhere the full release list of a tool can be fetched from.
pub trait ReleaseSource {
    /// The tool id the releases belong to, e.g. `node`.
    fn tool(&self) -> &str;

    /// Fetches every release, newest first.
    fn fetch_releases(&self) -> Result<Vec<ReleaseRecord>>;
}

/// An entry of the Node.js release index as published upstream.
#[derive(Debug, Deserialize)]
struct NodeIndexEntry {
    version: String,
    date: String,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    npm: Option<String>,
    #[serde(default)]
    lts: Lts,
}

impl From<NodeIndexEntry> for ReleaseRecord {
    fn from(entry: NodeIndexEntry) -> Self {
        let version = entry
            .version
            .strip_prefix('v')
            .map(str::to_string)
            .unwrap_or(entry.version);
        ReleaseRecord {
            version,
            release_date: entry.date,
            installer_files: entry.files,
            package_manager_version: entry.npm,
            lts: entry.lts,
        }
    }
}

/// Parses the body of the Node.js release index.
pub fn parse_node_index(body: &str) -> Result<Vec<ReleaseRecord>> {
    let entries: Vec<NodeIndexEntry> =
        serde_json::from_str(body).context("Invalid Node release index")?;
    Ok(entries.into_iter().map(ReleaseRecord::from).collect())
}

/// Fetches Node.js releases from the official release index.
#[derive(Debug, Clone)]
pub struct NodeReleaseSource {
    url: String,
    client: Client,
}

impl NodeReleaseSource {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: Client::new(),
        }
    }
}

impl ReleaseSource for NodeReleaseSource {
    fn tool(&self) -> &str {
        "node"
    }

    fn fetch_releases(&self) -> Result<Vec<ReleaseRecord>> {
        debug!("GET {}", self.url);
        let body = self
            .client
            .get(&self.url)
            .header("User-Agent", "devengines")
            .send()
            .with_context(|| format!("Failed to reach {}", self.url))?
            .error_for_status()?
            .text()?;
        parse_node_index(&body)
    }
}
