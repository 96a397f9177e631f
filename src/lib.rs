//! # devEngines Core Library
//!
//! This crate contains the core logic of the `devengines` tool – a small CLI that pins runtime and
//! package manager versions (Node, npm, pnpm, ...) into the `devEngines` field of a project's
//! `package.json`.
//!
//! Symbolic requests such as `lts`, `latest` or `22.x.x` are resolved against a locally cached
//! copy of the tool's release index, refreshed at most once per cool-down window. Edits to the
//! manifest keep its line endings and indentation, so the diff only shows the pinned version.
//!
//! ## Modules Overview
//! - [`format`] – Line ending and indentation detection, format-preserving JSON rendering
//! - [`manifest`] – Locating, loading and writing `package.json`
//! - [`dev_engines`] – Reading and editing `devEngines.runtime` / `devEngines.packageManager`
//! - [`tools`] – The supported runtimes and package managers
//! - [`catalog`] – Release records and the remote release index
//! - [`resolve`] – Turning `lts`, `latest` and ranges into exact versions
//! - [`global`] – Configuration, the release catalog cache and global tool versions
//! - [`util`] – Shared helpers (`Lookup`, version parsing)


pub mod format;
pub mod manifest;
pub mod dev_engines;
pub mod tools;
pub mod catalog;
pub mod resolve;
pub mod util;
pub mod global;

pub use format::*;
pub use manifest::*;
pub use dev_engines::*;
pub use catalog::*;
pub use resolve::*;
pub use util::*;
pub use global::cache::*;
pub use global::settings::*;
pub use global::utils::Config;
