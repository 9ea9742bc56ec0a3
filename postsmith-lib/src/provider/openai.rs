//! The chat completions wire format, spoken by OpenAI and by the Hugging Face router.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::BackendConfig,
    provider::{ProviderError, check_status, endpoint},
    repository::Provider,
};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

pub(super) fn chat_completion(
    client: &Client,
    provider: Provider,
    backend: &BackendConfig,
    credential: &str,
    prompt: &str,
) -> Result<String, ProviderError> {
    let body = ChatRequest {
        model: &backend.model,
        messages: [ChatMessage {
            role: "user",
            content: prompt,
        }],
        max_tokens: backend.max_output_tokens,
    };

    let response = client
        .post(endpoint(&backend.base_url, "chat/completions"))
        .bearer_auth(credential)
        .json(&body)
        .send()
        .map_err(|source| ProviderError::Transport { provider, source })?;

    let parsed: ChatResponse = check_status(provider, response)?
        .json()
        .map_err(|source| ProviderError::Decode { provider, source })?;

    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default())
}
