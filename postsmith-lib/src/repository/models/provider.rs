use clap::ValueEnum;
use strum::{Display, EnumIter, EnumString};

use crate::{Error, Result};

/// One of the external text-generation services a profile can use.
///
/// The [`Display`](std::fmt::Display) form is the label persisted in profile records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, ValueEnum)]
#[strum(ascii_case_insensitive)]
pub enum Provider {
    #[strum(to_string = "Gemini")]
    #[value(name = "gemini")]
    Gemini,
    #[strum(to_string = "ChatGPT", serialize = "openai")]
    #[value(name = "chatgpt", alias = "openai")]
    ChatGpt,
    #[strum(to_string = "Hugging Face", serialize = "huggingface", serialize = "hf")]
    #[value(name = "huggingface", alias = "hf")]
    HuggingFace,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.0-flash",
            Provider::ChatGpt => "gpt-4o",
            Provider::HuggingFace => "Qwen/Qwen2.5-7B-Instruct",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Provider::ChatGpt => "https://api.openai.com/v1",
            Provider::HuggingFace => "https://router.huggingface.co/v1",
        }
    }

    pub fn default_max_output_tokens(self) -> Option<u32> {
        match self {
            Provider::HuggingFace => Some(3500),
            Provider::Gemini | Provider::ChatGpt => None,
        }
    }

    /// Parse a persisted platform label, failing closed on anything unrecognized.
    pub fn parse(label: &str) -> Result<Self> {
        label
            .trim()
            .parse::<Self>()
            .map_err(|_| Error::UnsupportedProvider(label.to_string()))
    }
}
