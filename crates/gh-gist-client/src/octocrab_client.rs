//! Octocrab-based Gist client
//!
//! Direct implementation of the `GistClient` trait using the octocrab
//! library. Requests go through octocrab's generic route helpers so the
//! request and response bodies stay in our own types.

use crate::client::GistClient;
use crate::error::GistError;
use crate::types::{CreatedGist, NewGist};
use async_trait::async_trait;
use log::debug;
use octocrab::Octocrab;
use std::sync::Arc;

/// Direct GitHub Gist client using octocrab
#[derive(Debug, Clone)]
pub struct OctocrabGistClient {
    octocrab: Arc<Octocrab>,
}

impl OctocrabGistClient {
    /// Create a new client with the given octocrab instance
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }

    /// Build a client for api.github.com authenticated with `token`
    pub fn from_token(token: impl Into<String>) -> Result<Self, GistError> {
        let octocrab = Octocrab::builder()
            .personal_token(token.into())
            .build()
            .map_err(|e| GistError::Transport(format!("Failed to build Octocrab client: {}", e)))?;
        Ok(Self::new(Arc::new(octocrab)))
    }

    /// Get a reference to the underlying octocrab instance
    pub fn octocrab(&self) -> &Octocrab {
        &self.octocrab
    }
}

#[async_trait]
impl GistClient for OctocrabGistClient {
    async fn create_gist(&self, gist: &NewGist) -> Result<CreatedGist, GistError> {
        debug!(
            "Creating gist '{}' with {} file(s)",
            gist.description,
            gist.files.len()
        );

        let created: CreatedGist = self.octocrab.post("/gists", Some(gist)).await?;

        debug!("Created gist {}", created.id);
        Ok(created)
    }

    async fn delete_gist(&self, gist_id: &str) -> Result<(), GistError> {
        debug!("Deleting gist {}", gist_id);

        let route = format!("/gists/{}", gist_id);
        let response = self.octocrab._delete(route, None::<&()>).await?;
        let status = response.status().as_u16();

        if status == 404 {
            debug!("Gist {} already gone", gist_id);
            return Ok(());
        }

        // Turns any other non-success status into Error::GitHub
        octocrab::map_github_error(response).await?;
        Ok(())
    }
}
