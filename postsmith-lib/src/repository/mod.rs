use std::{path::PathBuf, sync::Arc};

use parking_lot::RwLock;
use tracing::debug;

use crate::{
    Error, Result,
    config::{Cfg, CoreConfig},
    export,
    prompt::PromptBuilder,
    provider::{Dispatcher, is_error_text},
    sections::{self, GenerationResult},
};

mod models;
mod session;
mod store;

pub use models::{Channel, Links, ProfileRecord, Provider};
pub use session::Session;
pub use store::{ProfileStore, sanitize_name};

/// Central access point for an embedding UI.
///
/// The [`Repository`] owns the profile store, the configuration and the session state, and runs
/// the prompt, dispatch and parse steps of a generation in order.
#[derive(Clone, Debug)]
pub struct Repository {
    store: ProfileStore,
    cfg: Cfg,
    session_file: PathBuf,
}

impl Repository {
    /// Open the repository described by the user's configuration file.
    pub fn new() -> Result<Self> {
        Self::with_config(CoreConfig::load()?)
    }

    pub fn with_config(cfg: CoreConfig) -> Result<Self> {
        Ok(Self {
            store: ProfileStore::new(cfg.profiles_dir()?),
            session_file: cfg.session_file()?,
            cfg: Arc::new(RwLock::new(cfg)),
        })
    }

    pub fn config(&self) -> Cfg {
        self.cfg.clone()
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    // Profiles

    pub fn profiles(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// The stored profile, or an empty record if there is none.
    pub fn profile(&self, name: &str) -> ProfileRecord {
        self.store.load(name)
    }

    /// Upsert `record` and make it the active profile.
    pub fn save_profile(&self, record: &ProfileRecord) -> Result<String> {
        let key = self.store.save(record)?;
        self.write_session(Some(key.clone()))?;
        Ok(key)
    }

    pub fn session(&self) -> Session {
        Session::load(&self.session_file)
    }

    pub fn active_profile(&self) -> Option<String> {
        self.session()
            .active_profile
            .filter(|name| self.store.contains(name))
    }

    pub fn set_active_profile(&self, name: &str) -> Result<()> {
        if !self.store.contains(name) {
            return Err(Error::NotFound(name.to_string()));
        }

        self.write_session(Some(sanitize_name(name)))
    }

    fn write_session(&self, active_profile: Option<String>) -> Result<()> {
        Session { active_profile }.save(&self.session_file)
    }

    /// Pick the profile to work with: `requested` if given, else the active profile, else the
    /// first stored profile.
    pub fn resolve_profile(&self, requested: Option<&str>) -> Result<Option<ProfileRecord>> {
        if let Some(name) = requested {
            let record = self.store.load(name);
            if record.is_empty() {
                return Err(Error::NotFound(name.to_string()));
            }
            return Ok(Some(record));
        }

        let name = match self.active_profile() {
            Some(name) => Some(name),
            None => self.profiles()?.into_iter().next(),
        };

        Ok(name
            .map(|name| self.store.load(&name))
            .filter(|record| !record.is_empty()))
    }

    // Generation

    pub fn prompt_builder(&self) -> PromptBuilder {
        let cfg = self.cfg.read();
        PromptBuilder::new(cfg.prompt.markers.clone(), cfg.prompt.hashtag_count)
    }

    pub fn build_prompt(
        &self,
        record: &ProfileRecord,
        target_network: &str,
        description: &str,
    ) -> String {
        self.prompt_builder()
            .build(target_network, description, &record.links)
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.cfg.read().providers.clone())
    }

    /// Run one generation for `record`: build the prompt, send it and split the reply.
    ///
    /// Never fails. A dispatch error comes back as a result with [`GenerationResult::is_error`]
    /// set and the error text as its body.
    pub fn generate(
        &self,
        record: &ProfileRecord,
        target_network: &str,
        description: &str,
    ) -> GenerationResult {
        let prompt = self.build_prompt(record, target_network, description);

        debug!(
            profile = %record.name,
            platform = %record.platform,
            "Generating for {target_network}"
        );

        let raw = self
            .dispatcher()
            .dispatch_label(&record.platform, &record.credential, &prompt);

        self.parse(raw)
    }

    /// Split a reply with the configured markers.
    pub fn parse(&self, raw: String) -> GenerationResult {
        if is_error_text(&raw) {
            return GenerationResult::from_error(raw);
        }

        sections::parse_with(&raw, &self.cfg.read().prompt.markers)
    }

    /// Write the raw reply to the export directory.
    pub fn export(&self, target_network: &str, raw: &str) -> Result<PathBuf> {
        let dir = self.cfg.read().export_dir();
        export::write_raw(&dir, target_network, raw)
    }

    /// A repository rooted in `root`, for tests.
    #[cfg(test)]
    pub(crate) fn mock(root: &std::path::Path) -> Self {
        Self::with_config(CoreConfig::mock(root)).unwrap()
    }
}

#[cfg(test)]
mod test {
    use mockito::Server;
    use tempfile::tempdir;

    use super::*;
    use crate::provider::ERROR_MARKER;

    fn client_a() -> ProfileRecord {
        ProfileRecord::new("Client A", Provider::Gemini, "k1")
            .with_link(Channel::Website, "https://a.io")
    }

    #[test]
    fn test_profile_scenario() {
        let dir = tempdir().unwrap();
        let repo = Repository::mock(dir.path());
        let record = client_a();

        repo.save_profile(&record).unwrap();

        assert!(repo.profiles().unwrap().contains(&"Client A".to_string()));
        assert_eq!(repo.profile("Client A"), record);

        let prompt = repo.build_prompt(&record, "YouTube", "launch video");
        assert!(prompt.contains("Website: https://a.io"));
        for (_, marker) in repo.config().read().prompt.markers.ordered() {
            assert!(prompt.contains(marker));
        }
    }

    #[test]
    fn test_save_activates() {
        let dir = tempdir().unwrap();
        let repo = Repository::mock(dir.path());

        repo.save_profile(&ProfileRecord::new("One", Provider::Gemini, "k"))
            .unwrap();
        repo.save_profile(&ProfileRecord::new("Two", Provider::Gemini, "k"))
            .unwrap();

        assert_eq!(repo.active_profile().as_deref(), Some("Two"));

        repo.set_active_profile("One").unwrap();
        assert_eq!(repo.resolve_profile(None).unwrap().unwrap().name, "One");
    }

    #[test]
    fn test_set_active_missing() {
        let dir = tempdir().unwrap();
        let repo = Repository::mock(dir.path());

        assert!(matches!(
            repo.set_active_profile("Ghost"),
            Err(Error::NotFound(name)) if name == "Ghost"
        ));
    }

    #[test]
    fn test_resolve_profile() {
        let dir = tempdir().unwrap();
        let repo = Repository::mock(dir.path());

        assert!(repo.resolve_profile(None).unwrap().is_none());

        repo.store()
            .save(&ProfileRecord::new("beta", Provider::ChatGpt, "k"))
            .unwrap();
        repo.store()
            .save(&ProfileRecord::new("alpha", Provider::ChatGpt, "k"))
            .unwrap();

        // No active profile yet: first listed wins
        assert_eq!(repo.resolve_profile(None).unwrap().unwrap().name, "alpha");
        assert_eq!(
            repo.resolve_profile(Some("beta")).unwrap().unwrap().name,
            "beta"
        );
        assert!(matches!(
            repo.resolve_profile(Some("gamma")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_stale_active_profile_ignored() {
        let dir = tempdir().unwrap();
        let repo = Repository::mock(dir.path());
        repo.save_profile(&ProfileRecord::new("Kept", Provider::Gemini, "k"))
            .unwrap();
        Session {
            active_profile: Some("Deleted".into()),
        }
        .save(&repo.session_file)
        .unwrap();

        assert_eq!(repo.active_profile(), None);
        assert_eq!(repo.resolve_profile(None).unwrap().unwrap().name, "Kept");
    }

    #[test]
    fn test_generate() {
        let dir = tempdir().unwrap();
        let repo = Repository::mock(dir.path());
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content":
                        "===SECTION_TITLE===\nT\n===SECTION_BODY===\nB\n===SECTION_TAGS===\nx, y"}}]
                })
                .to_string(),
            )
            .create();
        repo.config().write().providers.chatgpt.base_url = server.url();

        let record = ProfileRecord::new("Client B", Provider::ChatGpt, "k");
        let result = repo.generate(&record, "LinkedIn", "hiring post");

        mock.assert();
        assert!(!result.is_error());
        assert_eq!(result.title(), "T");
        assert_eq!(result.body(), "B");
        assert_eq!(result.tags(), "x, y");

        let path = repo.export("LinkedIn", result.raw()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), *result.raw());
    }

    #[test]
    fn test_generate_unsupported_provider() {
        let dir = tempdir().unwrap();
        let repo = Repository::mock(dir.path());
        let record = ProfileRecord {
            name: "Legacy".into(),
            platform: "Bard".into(),
            credential: "k".into(),
            ..Default::default()
        };

        let result = repo.generate(&record, "YouTube", "anything");

        assert!(result.is_error());
        assert!(result.body().starts_with(ERROR_MARKER));
        assert!(result.title().is_empty());
    }

    #[test]
    fn test_generate_unreachable() {
        let dir = tempdir().unwrap();
        let repo = Repository::mock(dir.path());
        repo.config().write().providers.gemini.base_url = "http://127.0.0.1:1".into();

        let result = repo.generate(&client_a(), "YouTube", "launch video");

        assert!(result.is_error());
        assert!(is_error_text(result.raw()));
    }
}
