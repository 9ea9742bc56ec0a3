use crate::{
    Result,
    repository::models::{Channel, Links, Provider},
};

/// A named bundle of provider choice, credential and link set.
///
/// `platform` holds the provider label exactly as persisted so a record naming an unknown provider
/// can still be loaded, shown and re-saved; [`ProfileRecord::provider`] is where it fails closed.
/// The credential is stored in plaintext.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRecord {
    pub name: String,
    pub platform: String,
    pub credential: String,
    pub links: Links,
}

impl ProfileRecord {
    pub fn new(name: &str, provider: Provider, credential: &str) -> Self {
        Self {
            name: name.to_string(),
            platform: provider.to_string(),
            credential: credential.to_string(),
            links: Links::new(),
        }
    }

    pub fn with_link(mut self, channel: Channel, url: &str) -> Self {
        self.links.set(channel, url);
        self
    }

    pub fn provider(&self) -> Result<Provider> {
        Provider::parse(&self.platform)
    }

    pub fn has_credential(&self) -> bool {
        !self.credential.trim().is_empty()
    }

    /// An empty record is what the store hands back for a profile it could not read, so callers
    /// treat it as "not found".
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
