//! Database configuration.
//!
//! Unlike the tunables that apply to a single call (batch size, oversample
//! factors), the values here are written once when a database directory is
//! first created and are read-only on every later open.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the configuration file inside a database directory.
pub const CONFIG_FILE: &str = "config.json";

/// Current on-disk configuration format version.
pub const CONFIG_VERSION: &str = "1.0";

/// Default embedding dimension when none is supplied at creation time.
pub const DEFAULT_DIM: usize = 1024;

/// Persisted, immutable-after-creation database configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration format version.
    pub version: String,
    /// Name of the embedding model used to populate this database.
    pub model: String,
    /// Vector dimension, fixed for the lifetime of the database.
    pub dim: usize,
}

impl Config {
    /// Loads the config from `dir` if present, otherwise creates it.
    ///
    /// `model`/`dim` are only used when creating a new, empty database;
    /// on a reopen the values already on disk take precedence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptOrForeignDirectory`] if `dir` has files but
    /// no parseable `config.json`, and [`Error::StorageFailure`] on I/O
    /// failure.
    pub fn load_or_create(dir: &Path, model: &str, dim: usize) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            let text = fs::read_to_string(&config_path)?;
            return serde_json::from_str(&text)
                .map_err(|_| Error::CorruptOrForeignDirectory(dir.to_path_buf()));
        }

        let has_other_files = dir
            .read_dir()
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false);
        if has_other_files {
            return Err(Error::CorruptOrForeignDirectory(dir.to_path_buf()));
        }

        fs::create_dir_all(dir)?;
        let config = Self {
            version: CONFIG_VERSION.to_string(),
            model: model.to_string(),
            dim,
        };
        let text = serde_json::to_string_pretty(&config)
            .expect("Config serialization to JSON cannot fail");
        fs::write(&config_path, text)?;
        Ok(config)
    }
}
