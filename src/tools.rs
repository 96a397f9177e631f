use std::fmt;

/// Tools that can be pinned in `devEngines.runtime`.
pub const SUPPORTED_RUNTIMES: &[&str] = &["node", "deno", "bun"];

/// Tools that can be pinned in `devEngines.packageManager`.
pub const SUPPORTED_PACKAGE_MANAGERS: &[&str] = &["npm", "bun", "pnpm", "yarn"];

/// The two `devEngines` sub-sections a tool version can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubSection {
    Runtime,
    PackageManager,
}

impl SubSection {
    /// The JSON key of the sub-section inside `devEngines`.
    pub fn key(&self) -> &'static str {
        match self {
            SubSection::Runtime => "runtime",
            SubSection::PackageManager => "packageManager",
        }
    }

    pub fn all() -> [SubSection; 2] {
        [SubSection::Runtime, SubSection::PackageManager]
    }
}

impl fmt::Display for SubSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Checks whether `tool` is a recognized runtime.
pub fn is_runtime(tool: &str) -> bool {
    SUPPORTED_RUNTIMES.contains(&tool)
}

/// Checks whether `tool` is a recognized package manager.
pub fn is_package_manager(tool: &str) -> bool {
    SUPPORTED_PACKAGE_MANAGERS.contains(&tool)
}

pub fn is_supported(tool: &str) -> bool {
    is_runtime(tool) || is_package_manager(tool)
}

/// Returns every sub-section `tool` belongs to. `bun` is both a runtime and a
/// package manager, unknown tools belong to none.
pub fn sections_for(tool: &str) -> Vec<SubSection> {
    let mut sections = Vec::new();
    if is_runtime(tool) {
        sections.push(SubSection::Runtime);
    }
    if is_package_manager(tool) {
        sections.push(SubSection::PackageManager);
    }
    sections
}

/// Human readable name of a tool, falling back to the tool id itself.
pub fn display_name(tool: &str) -> &str {
    match tool {
        "bun" => "Bun",
        "deno" => "Deno",
        "node" => "Node",
        "npm" => "npm",
        "pnpm" => "PNPM",
        "yarn" => "Yarn",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_for() {
        assert_eq!(sections_for("node"), vec![SubSection::Runtime]);
        assert_eq!(sections_for("npm"), vec![SubSection::PackageManager]);
        assert_eq!(
            sections_for("bun"),
            vec![SubSection::Runtime, SubSection::PackageManager]
        );
        assert!(sections_for("asdf").is_empty());
    }

    #[test]
    fn test_is_supported() {
        for tool in ["node", "deno", "bun", "npm", "pnpm", "yarn"] {
            assert!(is_supported(tool), "{tool} should be supported");
        }
        assert!(!is_supported("Node"));
        assert!(!is_supported("cargo"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("pnpm"), "PNPM");
        assert_eq!(display_name("cargo"), "cargo");
    }
}
