//! Gist client trait
//!
//! This module defines the `GistClient` trait that all client
//! implementations must satisfy.

use crate::error::GistError;
use crate::types::{CreatedGist, NewGist};
use async_trait::async_trait;

/// GitHub Gist API client trait
///
/// Implementations can hit the API directly or be in-memory doubles for
/// tests. Each method performs exactly one request; retrying is left to
/// the caller.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a client can be moved into the
/// deferred deletion task.
///
/// # Example
///
/// ```rust,ignore
/// use gh_gist_client::{GistClient, NewGist, Visibility};
///
/// async fn share(client: &dyn GistClient, html: &str) -> Result<String, GistError> {
///     let gist = NewGist::single_file("diff", Visibility::Private, "diff.html", html);
///     Ok(client.create_gist(&gist).await?.html_url)
/// }
/// ```
#[async_trait]
pub trait GistClient: Send + Sync {
    /// Create a gist
    ///
    /// # Returns
    ///
    /// The created gist as reported by the API, or an error if the request
    /// was rejected or never completed.
    async fn create_gist(&self, gist: &NewGist) -> Result<CreatedGist, GistError>;

    /// Delete a gist
    ///
    /// A gist that no longer exists counts as deleted.
    async fn delete_gist(&self, gist_id: &str) -> Result<(), GistError>;
}
