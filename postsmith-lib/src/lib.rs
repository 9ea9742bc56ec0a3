//! Core of Postsmith: profile storage, prompt construction, provider dispatch and reply parsing.
//!
//! An embedding UI talks to [`Repository`], which ties the pieces together. Each piece is also
//! usable on its own: [`prompt::build_prompt`] and [`sections::parse`] are pure, and
//! [`provider::Dispatcher`] never fails past its own boundary.

use std::path::PathBuf;

use thiserror::Error;

pub mod config;
pub mod export;
pub mod fs;
pub mod prompt;
pub mod provider;
pub mod repository;
pub mod sections;

pub use repository::Repository;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to persist file: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to serialize configuration: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Could not determine the home directory")]
    NoHomeDir,
    #[error("Profile name is empty after removing unsupported characters")]
    EmptyName,
    #[error("Profile '{name}' would be stored as '{key}', which already belongs to '{existing}'")]
    NameConflict {
        name: String,
        key: String,
        existing: String,
    },
    #[error("No profile named '{0}'")]
    NotFound(String),
    #[error("Unsupported provider '{0}'")]
    UnsupportedProvider(String),
    #[error("Walking {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}
