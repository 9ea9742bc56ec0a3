use std::collections::BTreeMap;

use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};

/// A place a profile can link out to.
///
/// Known channels sort in their fixed display order; labels that match none of them are kept as
/// [`Channel::Other`] and sort after the known ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Channel {
    #[display("YouTube")]
    YouTube,
    #[display("Instagram")]
    Instagram,
    #[display("TikTok")]
    TikTok,
    #[display("Facebook")]
    Facebook,
    #[display("Pinterest")]
    Pinterest,
    #[display("LinkedIn")]
    LinkedIn,
    #[display("X (Twitter)")]
    X,
    #[display("Tumblr")]
    Tumblr,
    #[display("Website")]
    Website,
    #[display("Digital Card")]
    DigitalCard,
    /// Any other label. One spelling a known channel is normalized to it when stored in
    /// [`Links`].
    #[display("{_0}")]
    Other(String),
}

impl Channel {
    pub const KNOWN: [Channel; 10] = [
        Channel::YouTube,
        Channel::Instagram,
        Channel::TikTok,
        Channel::Facebook,
        Channel::Pinterest,
        Channel::LinkedIn,
        Channel::X,
        Channel::Tumblr,
        Channel::Website,
        Channel::DigitalCard,
    ];

    pub fn icon(&self) -> &'static str {
        match self {
            Channel::YouTube => "📺",
            Channel::Instagram => "📸",
            Channel::TikTok => "🎵",
            Channel::Facebook => "📘",
            Channel::Pinterest => "📌",
            Channel::LinkedIn => "💼",
            Channel::X => "🐦",
            Channel::Tumblr => "📝",
            Channel::Website => "🌍",
            Channel::DigitalCard => "🪪",
            Channel::Other(_) => "🔗",
        }
    }
}

impl From<String> for Channel {
    fn from(label: String) -> Self {
        let trimmed = label.trim();
        if let Some(known) = Channel::KNOWN
            .iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(trimmed))
        {
            return known.clone();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "x" | "twitter" | "twitter/x" | "x/twitter" => Channel::X,
            "digitalcard" | "digital-card" | "digital_card" | "card" => Channel::DigitalCard,
            _ => Channel::Other(trimmed.to_string()),
        }
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.to_string()
    }
}

/// The link set of a profile, keyed by channel.
///
/// Entries with an empty URL may be present (records written by the setup form carry every
/// channel); they are skipped by [`Links::active`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<Channel, String>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URL for `channel`. A blank URL removes the entry.
    pub fn set(&mut self, channel: Channel, url: &str) {
        let channel = Channel::from(String::from(channel));
        let url = url.trim();
        if url.is_empty() {
            self.0.remove(&channel);
        } else {
            self.0.insert(channel, url.to_string());
        }
    }

    pub fn with(mut self, channel: Channel, url: &str) -> Self {
        self.set(channel, url);
        self
    }

    /// Channels with a non-blank URL, in display order.
    pub fn active(&self) -> impl Iterator<Item = (&Channel, &str)> {
        self.0
            .iter()
            .map(|(channel, url)| (channel, url.trim()))
            .filter(|(_, url)| !url.is_empty())
    }

    pub fn has_active(&self) -> bool {
        self.active().next().is_some()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Links {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut links = Links::new();
        for (label, url) in iter {
            links.set(Channel::from(label.to_string()), url);
        }
        links
    }
}
