//! Reading and editing the `devEngines` field of a manifest.
//!
//! Each sub-section (`runtime`, `packageManager`) is either a single
//! `{ "name", "version" }` object or a list of them. Edits keep whatever
//! shape is already there, except that setting a second tool on a single
//! entry promotes it to a list. A list is never collapsed back.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use crate::manifest::{Manifest, MANIFEST_FILE_NAME};
use crate::tools::{sections_for, SubSection};
use crate::util::Lookup;

pub const DEV_ENGINES_KEY: &str = "devEngines";

/// A `devEngines` sub-section in one of its two accepted shapes.
#[derive(Debug, Clone, PartialEq)]
enum EngineSlot {
    Single(Map<String, Value>),
    Many(Vec<Value>),
}

impl EngineSlot {
    fn from_value(value: Value) -> Option<EngineSlot> {
        match value {
            Value::Object(entry) => Some(EngineSlot::Single(entry)),
            Value::Array(entries) => Some(EngineSlot::Many(entries)),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        match self {
            EngineSlot::Single(entry) => Value::Object(entry),
            EngineSlot::Many(entries) => Value::Array(entries),
        }
    }

    fn entries(&self) -> Vec<&Map<String, Value>> {
        match self {
            EngineSlot::Single(entry) => vec![entry],
            EngineSlot::Many(entries) => entries.iter().filter_map(Value::as_object).collect(),
        }
    }
}

fn new_entry(name: &str, version: &str) -> Map<String, Value> {
    let mut entry = Map::new();
    entry.insert("name".to_string(), Value::String(name.to_string()));
    entry.insert("version".to_string(), Value::String(version.to_string()));
    entry
}

fn entry_name(entry: &Map<String, Value>) -> Option<&str> {
    entry.get("name").and_then(Value::as_str)
}

/// Updates the first entry called `name`, drops any later duplicates, and
/// appends a new entry when none matched.
fn upsert(entries: Vec<Value>, name: &str, version: &str) -> Vec<Value> {
    let mut updated = false;
    let mut result = Vec::with_capacity(entries.len() + 1);
    for mut value in entries {
        if value.get("name").and_then(Value::as_str) == Some(name) {
            if updated {
                debug!("Dropping duplicate devEngines entry for {name}");
                continue;
            }
            if let Some(entry) = value.as_object_mut() {
                entry.insert("version".to_string(), Value::String(version.to_string()));
            }
            updated = true;
        }
        result.push(value);
    }
    if !updated {
        result.push(Value::Object(new_entry(name, version)));
    }
    result
}

/// Pins `name` at `version` inside `devEngines.<section>` of `content`.
///
/// The name is lower-cased before it is stored or compared.
pub fn set_tool(content: &mut Map<String, Value>, section: SubSection, name: &str, version: &str) {
    let name = name.to_lowercase();
    if !matches!(content.get(DEV_ENGINES_KEY), Some(Value::Object(_))) {
        if content.contains_key(DEV_ENGINES_KEY) {
            warn!("Replacing non-object {DEV_ENGINES_KEY} field");
        }
        content.insert(DEV_ENGINES_KEY.to_string(), Value::Object(Map::new()));
    }
    let Some(Value::Object(dev_engines)) = content.get_mut(DEV_ENGINES_KEY) else {
        return;
    };

    let slot = dev_engines.entry(section.key()).or_insert(Value::Null);
    let next = match EngineSlot::from_value(std::mem::take(slot)) {
        None => EngineSlot::Single(new_entry(&name, version)),
        Some(EngineSlot::Many(entries)) => EngineSlot::Many(upsert(entries, &name, version)),
        Some(EngineSlot::Single(mut existing)) => {
            let existing_name = entry_name(&existing).unwrap_or_default().to_string();
            if existing_name.is_empty() {
                EngineSlot::Single(new_entry(&name, version))
            } else if existing_name == name {
                existing.insert("version".to_string(), Value::String(version.to_string()));
                EngineSlot::Single(existing)
            } else {
                EngineSlot::Many(vec![
                    Value::Object(existing),
                    Value::Object(new_entry(&name, version)),
                ])
            }
        }
    };
    *slot = next.into_value();
}

/// Collects every pinned `tool -> version` pair from both sub-sections.
///
/// Names are lower-cased. Entries missing a name or a version are skipped.
/// When a tool appears in both sub-sections the `packageManager` one wins.
pub fn raw_tool_versions(content: &Map<String, Value>) -> BTreeMap<String, String> {
    let mut versions = BTreeMap::new();
    let Some(Value::Object(dev_engines)) = content.get(DEV_ENGINES_KEY) else {
        return versions;
    };
    for section in SubSection::all() {
        let Some(slot) = dev_engines.get(section.key()).cloned().and_then(EngineSlot::from_value) else {
            continue;
        };
        for entry in slot.entries() {
            let name = entry_name(entry).filter(|name| !name.is_empty());
            let version = entry.get("version").and_then(Value::as_str).filter(|v| !v.is_empty());
            if let (Some(name), Some(version)) = (name, version) {
                versions.insert(name.to_lowercase(), version.to_string());
            }
        }
    }
    versions
}

/// What happened to one requested pin.
#[derive(Debug, Clone, PartialEq)]
pub enum PinStatus {
    Pinned { path: PathBuf, sections: Vec<SubSection> },
    /// The tool is neither a known runtime nor a known package manager.
    Unsupported,
    ManifestNotFound { sections: Vec<SubSection> },
    ManifestMalformed { sections: Vec<SubSection>, reason: String },
    WriteFailed { path: PathBuf, sections: Vec<SubSection>, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PinOutcome {
    pub tool: String,
    pub version: String,
    pub status: PinStatus,
}

impl PinOutcome {
    pub fn is_pinned(&self) -> bool {
        matches!(self.status, PinStatus::Pinned { .. })
    }

    fn new(tool: &str, version: &str, status: PinStatus) -> Self {
        Self {
            tool: tool.to_string(),
            version: version.to_string(),
            status,
        }
    }

    fn could_not_set(&self, sections: &[SubSection]) -> String {
        sections
            .iter()
            .map(|section| {
                format!(
                    "Could not set {}@{} in {}:{}:{}.",
                    self.tool, self.version, MANIFEST_FILE_NAME, DEV_ENGINES_KEY, section
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The line shown to the user for this outcome.
    pub fn message(&self) -> String {
        match &self.status {
            PinStatus::Pinned { path, sections } => {
                let sections = sections.iter().map(SubSection::key).collect::<Vec<_>>().join(", ");
                format!(
                    "Pinned {}@{} in {} ({}:{})",
                    self.tool,
                    self.version,
                    path.display(),
                    DEV_ENGINES_KEY,
                    sections
                )
            }
            PinStatus::Unsupported => {
                format!("Your version of devEngines CLI does not support \"{}\".", self.tool)
            }
            PinStatus::ManifestNotFound { sections } => self.could_not_set(sections),
            PinStatus::ManifestMalformed { sections, reason } => {
                format!("{}\n{} could not be parsed: {}", self.could_not_set(sections), MANIFEST_FILE_NAME, reason)
            }
            PinStatus::WriteFailed { sections, reason, .. } => {
                format!("{}\n{}", self.could_not_set(sections), reason)
            }
        }
    }
}

/// Pins one tool in the closest manifest above `start`.
///
/// See [`set_tools_in_dev_engines`].
pub fn set_tool_in_dev_engines(tool: &str, version: &str, start: Option<&Path>) -> PinOutcome {
    set_tools_in_dev_engines(&[(tool, version)], start)
        .pop()
        .unwrap_or_else(|| PinOutcome::new(tool, version, PinStatus::Unsupported))
}

/// Pins several tools in the closest manifest above `start` with a single
/// read and a single write.
///
/// Runtimes go to `devEngines.runtime`, package managers to
/// `devEngines.packageManager`, and a tool that is both lands in both.
/// Nothing is written when no supported tool was requested or when no usable
/// manifest exists. Returns one outcome per request, in request order.
pub fn set_tools_in_dev_engines(pins: &[(&str, &str)], start: Option<&Path>) -> Vec<PinOutcome> {
    let requests: Vec<(String, String, Vec<SubSection>)> = pins
        .iter()
        .map(|(tool, version)| {
            let tool = tool.to_lowercase();
            let sections = sections_for(&tool);
            (tool, version.to_string(), sections)
        })
        .collect();

    if requests.iter().all(|(_, _, sections)| sections.is_empty()) {
        return requests
            .iter()
            .map(|(tool, version, _)| PinOutcome::new(tool, version, PinStatus::Unsupported))
            .collect();
    }

    let mut manifest = match Manifest::locate(start) {
        Lookup::Found(manifest) => manifest,
        lookup => {
            return requests
                .iter()
                .map(|(tool, version, sections)| {
                    let status = match (&lookup, sections.is_empty()) {
                        (_, true) => PinStatus::Unsupported,
                        (Lookup::Malformed(reason), false) => PinStatus::ManifestMalformed {
                            sections: sections.clone(),
                            reason: reason.clone(),
                        },
                        _ => PinStatus::ManifestNotFound { sections: sections.clone() },
                    };
                    PinOutcome::new(tool, version, status)
                })
                .collect();
        }
    };

    for (tool, version, sections) in &requests {
        for section in sections {
            set_tool(&mut manifest.content, *section, tool, version);
        }
    }

    let saved = manifest.save();
    if let Err(e) = &saved {
        warn!("{e:#}");
    }
    requests
        .iter()
        .map(|(tool, version, sections)| {
            let status = match (&saved, sections.is_empty()) {
                (_, true) => PinStatus::Unsupported,
                (Ok(()), false) => {
                    info!("Pinned {tool}@{version} in {}", manifest.path.display());
                    PinStatus::Pinned { path: manifest.path.clone(), sections: sections.clone() }
                }
                (Err(e), false) => PinStatus::WriteFailed {
                    path: manifest.path.clone(),
                    sections: sections.clone(),
                    reason: format!("{e:#}"),
                },
            };
            PinOutcome::new(tool, version, status)
        })
        .collect()
}
