use anyhow::{anyhow, Result};
use node_semver::{Range, Version};

/// The outcome of reading a file that may be missing or unparsable.
///
/// Keeps "not there" and "there but broken" apart so callers can decide
/// whether the user deserves a warning.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The file was read and parsed.
    Found(T),
    /// Nothing to read.
    NotFound,
    /// The file exists but could not be read or parsed. Holds the reason.
    Malformed(String),
}

impl<T> Lookup<T> {
    /// Collapses the lookup into an `Option`, dropping the distinction between
    /// missing and malformed.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// Checks whether a version string is a fully specified version as npm sees
/// it (`22.0.0`, `v22.0.0`, `1.2.3-beta.1`). Ranges, partial versions and
/// aliases are not.
pub fn is_exact_version(version: &str) -> bool {
    let core = version
        .trim_start_matches(['v', 'V'])
        .split(['-', '+'])
        .next()
        .unwrap_or_default();
    core.split('.').count() == 3 && Version::parse(version).is_ok()
}

/// Parses an npm version range such as `22`, `22.1`, `22.x.x`, `>=22 <24`
/// or `^20 || ^22`. Returns `None` for anything npm would reject, including
/// `lts`.
pub fn parse_range(version: &str) -> Option<Range> {
    Range::parse(version).ok()
}

/// Splits a `<name>@<version>` argument. The name is lower-cased, the version
/// is kept as typed.
pub fn split_name_at_version(name_at_version: &str) -> Result<(String, String)> {
    let (name, version) = name_at_version
        .split_once('@')
        .ok_or_else(|| anyhow!("Invalid name@version: {}", name_at_version))?;
    if name.is_empty() {
        return Err(anyhow!("Missing tool name in '{}'", name_at_version));
    }
    if version.is_empty() {
        return Err(anyhow!("Missing {} version in '{}'", name, name_at_version));
    }
    Ok((name.to_lowercase(), version.to_string()))
}
