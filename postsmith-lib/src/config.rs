use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    Result,
    fs::{config_dir, data_dir, state_dir},
    prompt::{DEFAULT_HASHTAG_COUNT, SectionMarkers},
    repository::Provider,
};

const FILE_NAME: &str = "postsmith.toml";
const PROFILES_DIR: &str = "profiles";
const SESSION_FILE: &str = "session.toml";

/// Handle to the core configuration
pub type Cfg = Arc<RwLock<CoreConfig>>;

/// The core configuration, serialized to TOML.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Where profile records live. Defaults to `<data dir>/profiles`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles_dir: Option<PathBuf>,
    /// Where downloaded replies are written. Defaults to the working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
    /// Where the session state lives. Defaults to `<state dir>/session.toml`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,
    pub prompt: PromptConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// How many hashtags and keywords the reply must carry
    pub hashtag_count: usize,
    pub markers: SectionMarkers,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            hashtag_count: DEFAULT_HASHTAG_COUNT,
            markers: SectionMarkers::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub gemini: BackendConfig,
    pub chatgpt: BackendConfig,
    pub huggingface: BackendConfig,
}

impl ProvidersConfig {
    pub fn backend(&self, provider: Provider) -> &BackendConfig {
        match provider {
            Provider::Gemini => &self.gemini,
            Provider::ChatGpt => &self.chatgpt,
            Provider::HuggingFace => &self.huggingface,
        }
    }

    #[cfg(test)]
    pub(crate) fn backend_mut(&mut self, provider: Provider) -> &mut BackendConfig {
        match provider {
            Provider::Gemini => &mut self.gemini,
            Provider::ChatGpt => &mut self.chatgpt,
            Provider::HuggingFace => &mut self.huggingface,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            gemini: BackendConfig::for_provider(Provider::Gemini),
            chatgpt: BackendConfig::for_provider(Provider::ChatGpt),
            huggingface: BackendConfig::for_provider(Provider::HuggingFace),
        }
    }
}

/// Per-provider request settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub model: String,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl BackendConfig {
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            max_output_tokens: provider.default_max_output_tokens(),
        }
    }
}

impl CoreConfig {
    /// Load the configuration from the config directory, writing the defaults out first if there
    /// is no file yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir()?.join(FILE_NAME))
    }

    /// Load the configuration from `path`. A missing file is created with the defaults; a file
    /// that fails to parse is ignored in favour of the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring malformed configuration at {}: {err}", path.display());
                Self::default()
            }))
        } else {
            let cfg = Self::default();
            cfg.save_to(path)?;
            info!("Wrote default configuration to {}", path.display());
            Ok(cfg)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;

        Ok(())
    }

    pub fn profiles_dir(&self) -> Result<PathBuf> {
        match &self.profiles_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join(PROFILES_DIR)),
        }
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn session_file(&self) -> Result<PathBuf> {
        match &self.session_file {
            Some(path) => Ok(path.clone()),
            None => Ok(state_dir()?.join(SESSION_FILE)),
        }
    }

    /// A configuration with every path rooted under `root`, for use in tests.
    #[cfg(test)]
    pub(crate) fn mock(root: &Path) -> Self {
        Self {
            profiles_dir: Some(root.join(PROFILES_DIR)),
            export_dir: Some(root.join("exports")),
            session_file: Some(root.join(SESSION_FILE)),
            ..Self::default()
        }
    }
}
