//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

/// Substring the provider returns when the supplied API key is stale or unknown.
pub const CREDENTIAL_REJECTED_SIGNAL: &str = "Requested entity was not found";

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to read reference image '{name}': {source}")]
    Encoding {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("API Key not selected. Please select an API key to proceed.")]
    MissingCredential,

    #[error("{0}")]
    RemoteService(String),

    #[error("No image was generated. The model might have returned text instead.")]
    NoImageProduced,

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("{source} ({} image(s) saved before the failure)", .saved.len())]
    PartialExport {
        saved: Vec<std::path::PathBuf>,
        #[source]
        source: Box<Error>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),
}

impl Error {
    /// True when the provider rejected the credential itself rather than the request.
    pub fn is_credential_rejection(&self) -> bool {
        match self {
            Error::RemoteService(message) => message.contains(CREDENTIAL_REJECTED_SIGNAL),
            Error::Http(e) => e.to_string().contains(CREDENTIAL_REJECTED_SIGNAL),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
