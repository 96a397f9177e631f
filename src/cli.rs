use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    /// Print debug logging
    #[clap(short, long, global = true)]
    pub(crate) verbose: bool,
    #[command(subcommand)]
    pub(crate) command: DevEnginesCommand,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum DevEnginesCommand {
    /// Pins a tool in the closest `package.json`
    Pin {
        /// Name and version of the tool: <name>@<version>. The version may be exact (`24.0.0`),
        /// a range (`24`, `22.x.x`, `>=24.0.0`), `lts` or `latest`
        name_at_version: String,
    },
    /// Pins Node and its bundled npm to the newest LTS release
    Lts,
    /// Pins Node and its bundled npm to the newest release
    Latest,
    /// Lists pinned tool versions, falling back to the global ones
    List,
    /// Clears the local cache of tool release lists
    Purge,
}
