use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Result;

/// UI state that outlives a single invocation: which profile is selected.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub active_profile: Option<String>,
}

impl Session {
    /// Read the session from `path`. Missing or malformed state is treated as a fresh session.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|contents| toml::from_str(&contents).map_err(|err| err.to_string()))
            .unwrap_or_else(|err| {
                warn!("Discarding session state at {}: {err}", path.display());
                Self::default()
            })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, toml::to_string_pretty(self)?)?;

        Ok(())
    }
}
