use std::collections::BTreeMap;
use anyhow::Result;
use colored::Colorize;
use devengines::dev_engines::{raw_tool_versions, set_tool_in_dev_engines, set_tools_in_dev_engines, PinOutcome};
use devengines::global::cache::purge_catalog_cache;
use devengines::global::settings::{global_tool_versions, global_tools_path};
use devengines::global::utils::Config;
use devengines::manifest::{Manifest, MANIFEST_FILE_NAME};
use devengines::resolve::{node_resolver, resolve_version};
use devengines::tools::{display_name, is_supported};
use devengines::util::{split_name_at_version, Lookup};
use crate::cli::{DevEnginesCommand, CLI};

pub fn execute(cli: CLI) -> Result<()> {
    let config = Config::load()?;
    match cli.command {
        DevEnginesCommand::Pin { name_at_version } => {
            execute_pin(&name_at_version, &config)
        }
        DevEnginesCommand::Lts => {
            execute_pin_all("lts", &config)
        }
        DevEnginesCommand::Latest => {
            execute_pin_all("latest", &config)
        }
        DevEnginesCommand::List => {
            execute_list(&config)
        }
        DevEnginesCommand::Purge => {
            execute_purge(&config)
        }
    }
}

fn print_outcome(outcome: &PinOutcome) {
    if outcome.is_pinned() {
        println!("{}", outcome.message().green());
    } else {
        eprintln!("{}", outcome.message().yellow());
    }
}

pub fn execute_pin(name_at_version: &str, config: &Config) -> Result<()> {
    let (tool, requested) = match split_name_at_version(name_at_version) {
        Ok(parts) => parts,
        Err(e) => {
            let tool = name_at_version.split('@').next().filter(|t| !t.is_empty()).unwrap_or("node");
            eprintln!("{}", e.to_string().yellow());
            eprintln!("Try: devengines pin [toolname]@[version]");
            eprintln!("Like this: devengines pin {}@latest", tool.to_lowercase());
            return Ok(());
        }
    };
    if !is_supported(&tool) {
        eprintln!(
            "{}",
            format!("Your version of devEngines CLI does not support \"{tool}\".").yellow()
        );
        return Ok(());
    }
    let Some(version) = resolve_version(&tool, &requested, config) else {
        return Ok(());
    };
    println!("Pin local {} to {}", display_name(&tool), version);
    print_outcome(&set_tool_in_dev_engines(&tool, &version, None));
    Ok(())
}

/// Pins Node to `alias` and npm to the version bundled with that Node release.
pub fn execute_pin_all(alias: &str, config: &Config) -> Result<()> {
    let Some(release) = node_resolver(config).resolve_release(alias) else {
        return Ok(());
    };
    let mut pins = vec![("node", release.version.as_str())];
    match &release.package_manager_version {
        Some(npm) => {
            println!("Pin local to {alias}: Node {} with npm {}", release.version, npm);
            pins.push(("npm", npm.as_str()));
        }
        None => {
            println!("Pin local to {alias}: Node {}", release.version);
        }
    }
    for outcome in set_tools_in_dev_engines(&pins, None) {
        print_outcome(&outcome);
    }
    Ok(())
}

pub fn execute_list(config: &Config) -> Result<()> {
    let local = match Manifest::locate(None) {
        Lookup::Found(manifest) => raw_tool_versions(&manifest.content),
        Lookup::NotFound => {
            eprintln!("No {MANIFEST_FILE_NAME} found");
            BTreeMap::new()
        }
        Lookup::Malformed(reason) => {
            eprintln!("{}", format!("{MANIFEST_FILE_NAME} could not be parsed: {reason}").yellow());
            BTreeMap::new()
        }
    };
    let global = global_tool_versions(&global_tools_path(&config.config_dir));

    let mut rows: BTreeMap<String, (String, bool)> = global
        .into_iter()
        .map(|(tool, version)| (tool, (version, true)))
        .collect();
    for (tool, version) in local {
        rows.insert(tool, (version, false));
    }

    if rows.is_empty() {
        println!("No pinned tools");
        return Ok(());
    }
    for (tool, (version, is_global)) in rows {
        match is_global {
            true => println!("{}: {} {}", tool, version, "(global)".dimmed()),
            false => println!("{}: {}", tool, version),
        }
    }
    Ok(())
}

pub fn execute_purge(config: &Config) -> Result<()> {
    let removed = purge_catalog_cache(&config.cache_dir)?;
    println!("Removed {removed} cached release list(s) from {}", config.cache_dir.display());
    Ok(())
}
