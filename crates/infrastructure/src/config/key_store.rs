//! Location of the persisted key record.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Key record persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyStoreConfig {
    /// JSON file holding the current key and its expiry
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("current_key.json")
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
