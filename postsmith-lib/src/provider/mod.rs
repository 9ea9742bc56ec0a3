//! Routing a prompt to one of the text-generation backends.
//!
//! [`Dispatcher::dispatch`] never fails: every problem becomes a reply starting with
//! [`ERROR_MARKER`], so a caller that only renders text can still tell success from failure with
//! [`is_error_text`]. [`Dispatcher::try_dispatch`] keeps the typed error for callers that want it.

use std::{fmt::Display, time::Duration};

use reqwest::{
    StatusCode,
    blocking::{Client, Response},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{config::ProvidersConfig, repository::Provider};

mod gemini;
mod openai;

/// Prefix of every reply synthesized from a failure
pub const ERROR_MARKER: &str = "Error: ";

/// Longest slice of an error response body kept in the message
const MAX_ERROR_BODY: usize = 500;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unsupported provider '{0}'")]
    UnsupportedProvider(String),
    #[error("Failed to set up HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: Provider,
        status: StatusCode,
        body: String,
    },
    #[error("{provider} sent a response that could not be decoded: {source}")]
    Decode {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },
    #[error("{0} returned no text")]
    EmptyCompletion(Provider),
}

pub fn is_error_text(text: &str) -> bool {
    text.starts_with(ERROR_MARKER)
}

fn error_text(err: impl Display) -> String {
    format!("{ERROR_MARKER}{err}")
}

/// Sends single-turn prompts to the configured backends. Holds no connection between calls.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    backends: ProvidersConfig,
}

impl Dispatcher {
    pub fn new(backends: ProvidersConfig) -> Self {
        Self { backends }
    }

    /// Send `prompt` to `provider` and return its text, or an [`ERROR_MARKER`] reply.
    pub fn dispatch(&self, provider: Provider, credential: &str, prompt: &str) -> String {
        self.try_dispatch(provider, credential, prompt)
            .unwrap_or_else(|err| {
                warn!("Generation with {provider} failed: {err}");
                error_text(err)
            })
    }

    /// Like [`Dispatcher::dispatch`], for a provider given by its persisted label. An unknown label
    /// produces an error reply without any request being made.
    pub fn dispatch_label(&self, label: &str, credential: &str, prompt: &str) -> String {
        match Provider::parse(label) {
            Ok(provider) => self.dispatch(provider, credential, prompt),
            Err(_) => {
                let err = ProviderError::UnsupportedProvider(label.to_string());
                warn!("{err}");
                error_text(err)
            }
        }
    }

    pub fn try_dispatch(
        &self,
        provider: Provider,
        credential: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let backend = self.backends.backend(provider);
        // Generations can take minutes; the caller decides when to give up
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(ProviderError::Client)?;

        debug!(%provider, model = %backend.model, "Dispatching prompt");

        let text = match provider {
            Provider::Gemini => gemini::generate(&client, backend, credential, prompt)?,
            Provider::ChatGpt | Provider::HuggingFace => {
                openai::chat_completion(&client, provider, backend, credential, prompt)?
            }
        };

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion(provider));
        }

        debug!(%provider, chars = text.len(), "Received completion");

        Ok(text)
    }
}

/// Send `prompt` with the default backend settings.
pub fn dispatch(provider: Provider, credential: &str, prompt: &str) -> String {
    Dispatcher::default().dispatch(provider, credential, prompt)
}

/// Turn a non-success response into a [`ProviderError::Status`].
fn check_status(provider: Provider, response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(ProviderError::Status {
        provider,
        status,
        body: body.trim().chars().take(MAX_ERROR_BODY).collect(),
    })
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
