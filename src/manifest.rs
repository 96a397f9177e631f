use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use crate::format::Formatting;
use crate::util::Lookup;

/// File name of the project manifest.
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// How many parent directories [`find_manifest`] climbs before giving up.
pub const MAX_MANIFEST_HOPS: usize = 20;

/// A `package.json` read from disk, together with the layout it was written in.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// Absolute location of the file.
    pub path: PathBuf,
    /// Line ending and indentation detected in the original text.
    pub formatting: Formatting,
    /// The parsed top-level object, key order preserved.
    pub content: Map<String, Value>,
}

impl Manifest {
    /// Locates the closest manifest starting at `start` (or the current
    /// working directory) and loads it.
    pub fn locate(start: Option<&Path>) -> Lookup<Manifest> {
        let start = match start {
            Some(start) => start.to_path_buf(),
            None => match std::env::current_dir() {
                Ok(cwd) => cwd,
                Err(e) => {
                    warn!("Could not determine current directory: {e}");
                    return Lookup::NotFound;
                }
            },
        };
        match find_manifest(&start, MAX_MANIFEST_HOPS) {
            Some(path) => Manifest::load(path),
            None => Lookup::NotFound,
        }
    }

    /// Reads and parses the manifest at `path`.
    ///
    /// A file that vanished since it was located counts as not found. Invalid
    /// JSON, or JSON whose top level is not an object, counts as malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Lookup<Manifest> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Lookup::NotFound,
            Err(e) => {
                warn!("Could not read {}: {e}", path.display());
                return Lookup::Malformed(e.to_string());
            }
        };
        let content = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(content)) => content,
            Ok(_) => {
                return Lookup::Malformed(format!("{} is not a JSON object", path.display()));
            }
            Err(e) => {
                warn!("Could not parse {}: {e}", path.display());
                return Lookup::Malformed(e.to_string());
            }
        };
        let formatting = Formatting::detect(&text);
        debug!(
            "Loaded {} ({} line endings, {:?} indentation)",
            path.display(),
            formatting.end_of_line,
            formatting.indentation
        );
        Lookup::Found(Manifest {
            path: path.to_path_buf(),
            formatting,
            content,
        })
    }

    /// Writes the manifest back to where it was loaded from.
    pub fn save(&self) -> Result<()> {
        write_manifest(&self.path, &self.formatting, &self.content)
    }
}

/// Serializes `content` with `formatting` and overwrites the file at `path`.
pub fn write_manifest<P: AsRef<Path>>(
    path: P,
    formatting: &Formatting,
    content: &Map<String, Value>,
) -> Result<()> {
    let path = path.as_ref();
    let text = formatting.render(content)?;
    std::fs::write(path, text)
        .with_context(|| format!("Could not write {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Walks from `start` up through its ancestors looking for a manifest.
///
/// Checks `start` itself and at most `max_hops` parents above it. Stops at the
/// filesystem root. Directories that cannot be inspected are skipped.
pub fn find_manifest(start: &Path, max_hops: usize) -> Option<PathBuf> {
    let mut dir = std::path::absolute(start).unwrap_or_else(|_| start.to_path_buf());
    let mut hops_left = max_hops;
    loop {
        let candidate = dir.join(MANIFEST_FILE_NAME);
        if candidate.is_file() {
            debug!("Found manifest at {}", candidate.display());
            return Some(candidate);
        }
        if hops_left == 0 {
            debug!("Gave up looking for {MANIFEST_FILE_NAME} after {max_hops} parent directories");
            return None;
        }
        let parent = match dir.parent() {
            Some(parent) if parent != dir => parent.to_path_buf(),
            _ => return None,
        };
        dir = parent;
        hops_left -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Indentation, LineEnding};
    use tempfile::tempdir;

    fn nest(root: &Path, depth: usize) -> PathBuf {
        let mut dir = root.to_path_buf();
        for level in 0..depth {
            dir.push(level.to_string());
        }
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_find_manifest_in_start_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(find_manifest(dir.path(), MAX_MANIFEST_HOPS), Some(path));
    }

    #[test]
    fn test_find_manifest_in_ancestor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);
        std::fs::write(&path, "{}").unwrap();
        let deep = nest(dir.path(), MAX_MANIFEST_HOPS);
        assert_eq!(find_manifest(&deep, MAX_MANIFEST_HOPS), Some(path));
    }

    #[test]
    fn test_find_manifest_hop_budget_exhausted() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE_NAME), "{}").unwrap();
        let deep = nest(dir.path(), MAX_MANIFEST_HOPS + 1);
        assert_eq!(find_manifest(&deep, MAX_MANIFEST_HOPS), None);
    }

    #[test]
    fn test_find_manifest_ignores_directories_named_like_manifest() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join(MANIFEST_FILE_NAME)).unwrap();
        assert_eq!(find_manifest(dir.path(), 0), None);
    }

    #[test]
    fn test_find_manifest_stops_at_root() {
        let dir = tempdir().unwrap();
        let deep = nest(dir.path(), 3);
        let found = find_manifest(&deep, usize::MAX);
        assert!(found.iter().all(|path| !path.starts_with(dir.path())));

        let root = std::path::absolute(dir.path())
            .unwrap()
            .ancestors()
            .last()
            .unwrap()
            .to_path_buf();
        let at_root = root.join(MANIFEST_FILE_NAME);
        let expected = at_root.is_file().then_some(at_root);
        assert_eq!(find_manifest(&root, usize::MAX), expected);
    }

    #[test]
    fn test_load_detects_formatting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);
        std::fs::write(&path, "{\r\n\t\"name\": \"demo\"\r\n}").unwrap();
        let manifest = Manifest::load(&path).found().unwrap();
        assert_eq!(manifest.formatting.end_of_line, LineEnding::CrLf);
        assert_eq!(manifest.formatting.indentation, Indentation::Tab);
        assert!(!manifest.formatting.final_newline);
        assert_eq!(manifest.content["name"], "demo");
        assert_eq!(manifest.path, path);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        assert_eq!(Manifest::load(dir.path().join(MANIFEST_FILE_NAME)), Lookup::NotFound);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Manifest::load(&path), Lookup::Malformed(_)));
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(Manifest::load(&path), Lookup::Malformed(_)));
    }

    #[test]
    fn test_locate_from_nested_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE_NAME), "{\"name\": \"x\"}").unwrap();
        let nested = nest(dir.path(), 3);
        let manifest = Manifest::locate(Some(&nested)).found().unwrap();
        assert_eq!(manifest.content["name"], "x");
    }

    #[test]
    fn test_save_round_trip_keeps_untouched_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);
        let original = "{\r\n    \"name\": \"demo\",\r\n    \"scripts\": {\r\n        \"test\": \"vitest\"\r\n    }\r\n}\r\n";
        std::fs::write(&path, original).unwrap();

        let mut manifest = Manifest::load(&path).found().unwrap();
        manifest.content.insert("private".to_string(), Value::Bool(true));
        manifest.save().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\r\n    \"name\": \"demo\",\r\n    \"scripts\": {\r\n        \"test\": \"vitest\"\r\n    },\r\n    \"private\": true\r\n}\r\n"
        );
        let reread = Manifest::load(&path).found().unwrap();
        assert_eq!(reread.formatting, manifest.formatting);
    }
}
