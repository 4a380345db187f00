//! GitHub Gist client for short-lived shared pages
//!
//! This crate provides a trait-based client for the two Gist operations the
//! share flow needs: creating a gist that holds one HTML file and deleting it
//! again once its time is up.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               GistClient trait                   │
//! │  - create_gist()                                 │
//! │  - delete_gist()                                 │
//! └─────────────────────────────────────────────────┘
//!                        │
//!        ┌───────────────┴───────────────┐
//!        ▼                               ▼
//! ┌─────────────────────┐     ┌─────────────────────┐
//! │ OctocrabGistClient  │     │ test doubles        │
//! │ (REST API)          │     │ (in-memory)         │
//! └─────────────────────┘     └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_gist_client::{GistClient, NewGist, OctocrabGistClient, Visibility};
//!
//! # async fn example() -> Result<(), gh_gist_client::GistError> {
//! let client = OctocrabGistClient::from_token("token")?;
//!
//! let gist = NewGist::single_file(
//!     "Diff preview",
//!     Visibility::Private,
//!     "diff.html",
//!     "<html></html>",
//! );
//! let created = client.create_gist(&gist).await?;
//! client.delete_gist(&created.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod octocrab_client;
pub mod types;

/// Host serving raw gist file contents
pub const RAW_HOST: &str = "https://gist.githubusercontent.com";

pub use client::GistClient;
pub use error::GistError;
pub use octocrab_client::OctocrabGistClient;
pub use types::{CreatedGist, GistFile, GistFileContent, GistOwner, NewGist, Visibility};

// Re-export octocrab so consumers don't need to depend on it directly
pub use octocrab;
