//! Application configuration.
//!
//! A small JSON document controlling where the engine's collaborators keep
//! their files and which transfer-log encoding to use. A missing or empty
//! configuration file falls back to the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::translog::LogFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Encoding of the daily transfer logs
    pub log_format: LogFormat,

    /// Directory receiving the daily transfer log files
    pub log_directory: PathBuf,

    /// JSON file holding the job definitions
    pub jobs_file: PathBuf,

    /// JSON file holding the latest state snapshot per job
    pub state_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_format: LogFormat::Json,
            log_directory: PathBuf::from("logs"),
            jobs_file: PathBuf::from("backup_jobs.json"),
            state_file: PathBuf::from("state.json"),
        }
    }
}

impl AppConfig {
    /// Load the configuration from `path`, falling back to defaults when
    /// the file is absent or empty.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let json = fs::read_to_string(path).map_err(|e| EngineError::Persistence {
            path: path.to_path_buf(),
            source: e,
        })?;
        if json.trim().is_empty() {
            return Ok(AppConfig::default());
        }
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EngineError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| EngineError::Persistence {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| EngineError::Persistence {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
