//! Errors returned by gist clients.

use thiserror::Error;

/// A failed gist request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GistError {
    /// The API answered with a non-success status.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("GitHub request failed: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected GitHub response: {0}")]
    Decode(String),
}

impl GistError {
    /// Whether the API reported the gist as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GistError::Api { status: 404, .. })
    }
}

impl From<octocrab::Error> for GistError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => GistError::Api {
                status: source.status_code.as_u16(),
                message: source.message.clone(),
            },
            octocrab::Error::Serde { source, .. } => GistError::Decode(source.to_string()),
            octocrab::Error::Json { source, .. } => GistError::Decode(source.to_string()),
            other => GistError::Transport(other.to_string()),
        }
    }
}
