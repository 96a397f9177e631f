//! Machine-wide state: directories and configuration, the release catalog
//! cache, and the global tool-version settings.

pub mod cache;
pub mod settings;
pub mod utils;
