//! Store location resolution
//!
//! Priority: GIFBOX_STORE env var > platform data dir (~/.local/share/gifbox)

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable overriding the store location
pub const STORE_ENV_VAR: &str = "GIFBOX_STORE";

/// Runtime configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Root directory of the store
    pub store_path: PathBuf,
}

impl Config {
    /// Resolve configuration from the environment
    pub fn from_env() -> Result<Self> {
        if let Some(path) = std::env::var_os(STORE_ENV_VAR).filter(|p| !p.is_empty()) {
            return Ok(Config {
                store_path: PathBuf::from(path),
            });
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| Error::Config("Could not find data directory".into()))?;

        Ok(Config {
            store_path: data_dir.join("gifbox"),
        })
    }

    /// Use an explicit store path
    pub fn with_store_path(path: impl Into<PathBuf>) -> Self {
        Config {
            store_path: path.into(),
        }
    }

    /// The resolved store root
    pub fn store_path(&self) -> &std::path::Path {
        &self.store_path
    }
}
