//! Engine configuration via `tandem.toml`
//!
//! A small config file holds the index bootstrap settings. A missing file
//! means defaults; to change settings, edit the file and restart.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tandem_core::{Error, IndexSettings, Result};

/// Config file name looked up in the data directory
pub const CONFIG_FILE_NAME: &str = "tandem.toml";

/// Engine configuration loaded from `tandem.toml`
///
/// # Example
///
/// ```toml
/// [index]
/// number_of_shards = 5
/// number_of_replicas = 1
/// refresh_interval = "1s"
/// check_on_startup = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Settings applied when the search index is created on first connect
    #[serde(default)]
    pub index: IndexSettings,
}

impl Config {
    /// Load configuration from a file path; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file exists but does not parse, and
    /// [`Error::Io`] if it exists but cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(e.to_string()))
    }
}
