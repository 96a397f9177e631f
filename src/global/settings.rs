use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use serde_json::Value;
use tracing::warn;

/// File name of the global tool-version settings inside the config directory.
pub const GLOBAL_TOOLS_FILE_NAME: &str = "globalTools.json";

pub fn global_tools_path(config_dir: &Path) -> PathBuf {
    config_dir.join(GLOBAL_TOOLS_FILE_NAME)
}

/// Reads the fallback tool versions used when a project pins nothing.
///
/// The file maps tool names to versions, e.g. `{ "node": "24.13.1" }`.
/// A missing or broken file, non-string values and empty versions are all
/// ignored, so the result may be empty.
pub fn global_tool_versions(path: &Path) -> BTreeMap<String, String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return BTreeMap::new(),
    };
    let tools = match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(tools)) => tools,
        Ok(_) => {
            warn!("{} is not a JSON object", path.display());
            return BTreeMap::new();
        }
        Err(e) => {
            warn!("Could not parse {}: {e}", path.display());
            return BTreeMap::new();
        }
    };
    tools
        .into_iter()
        .filter_map(|(tool, version)| match version {
            Value::String(version) if !version.is_empty() => Some((tool.to_lowercase(), version)),
            _ => None,
        })
        .collect()
}
