use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::BackendConfig,
    provider::{ProviderError, check_status, endpoint},
    repository::Provider,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// `models/{model}:generateContent`, concatenating the text parts of the first candidate.
pub(super) fn generate(
    client: &Client,
    backend: &BackendConfig,
    credential: &str,
    prompt: &str,
) -> Result<String, ProviderError> {
    let provider = Provider::Gemini;
    let url = endpoint(
        &backend.base_url,
        &format!("models/{}:generateContent", backend.model),
    );
    let body = GenerateContentRequest {
        contents: [Content {
            role: "user",
            parts: [Part { text: prompt }],
        }],
        generation_config: backend
            .max_output_tokens
            .map(|max_output_tokens| GenerationConfig { max_output_tokens }),
    };

    let response = client
        .post(url)
        .header("x-goog-api-key", credential)
        .json(&body)
        .send()
        .map_err(|source| ProviderError::Transport { provider, source })?;

    let parsed: GenerateContentResponse = check_status(provider, response)?
        .json()
        .map_err(|source| ProviderError::Decode { provider, source })?;

    Ok(parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}
