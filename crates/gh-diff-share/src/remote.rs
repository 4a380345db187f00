//! Publishing rendered pages as secret gists.

use crate::policy::SecurityPolicy;
use crate::scheduler::DeletionScheduler;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use gh_gist_client::{GistClient, GistError, NewGist};
use std::sync::Arc;
use std::time::Duration;

/// Host serving gist files with an HTML content type.
const GITHACK_BASE: &str = "https://gist.githack.com";

/// Paths named in the gist description.
#[derive(Debug, Clone, Copy)]
pub struct ShareMeta<'a> {
    pub old_path: &'a str,
    pub new_path: &'a str,
}

/// A published page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedArtifact {
    /// Rendered view through the preview proxy
    pub primary_url: String,
    /// Raw file, always the latest revision
    pub raw_url: String,
    /// Gist page on github.com
    pub management_url: Option<String>,
    /// Raw file served with an HTML content type
    pub alternative_url: Option<String>,
    pub artifact_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SharedArtifact {
    pub fn edit_url(&self) -> Option<String> {
        self.management_url.as_ref().map(|url| format!("{}/edit", url))
    }
}

/// Publishes pages to gists and deletes them after their TTL.
#[derive(Clone)]
pub struct RemoteShareClient {
    client: Arc<dyn GistClient>,
    scheduler: DeletionScheduler,
    preview_base_url: String,
}

impl RemoteShareClient {
    pub fn new(
        client: Arc<dyn GistClient>,
        scheduler: DeletionScheduler,
        preview_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            scheduler,
            preview_base_url: preview_base_url.into(),
        }
    }

    /// Create one gist holding `html` and arm its deletion.
    ///
    /// Makes exactly one create request. The deletion runs after
    /// `policy.ttl_minutes`; its failure is only logged.
    pub async fn publish(
        &self,
        html: &str,
        policy: &SecurityPolicy,
        meta: ShareMeta<'_>,
    ) -> Result<SharedArtifact, GistError> {
        let now = Utc::now();
        let filename = format!("diff-{}.html", now.timestamp_millis());
        let description = format!("{} ({} → {})", policy.label, meta.old_path, meta.new_path);

        let gist = NewGist::single_file(description, policy.visibility, &filename, html);
        let created = self.client.create_gist(&gist).await?;

        let raw_url = created.latest_raw_url(&filename).ok_or_else(|| {
            GistError::Decode(format!(
                "gist {} has neither an owner nor a raw URL for {}",
                created.id, filename
            ))
        })?;

        let alternative_url = created
            .owner_login()
            .map(|owner| format!("{}/{}/{}/raw/{}", GITHACK_BASE, owner, created.id, filename));

        let ttl = policy.ttl_minutes;
        let expires_at = now + ChronoDuration::minutes(i64::from(ttl));
        self.schedule_revoke(&created.id, Duration::from_secs(u64::from(ttl) * 60));

        log::info!(
            "Published gist {} ({} bytes), deleting in {} minutes",
            created.id,
            html.len(),
            ttl
        );

        Ok(SharedArtifact {
            primary_url: format!("{}{}", self.preview_base_url, raw_url),
            raw_url,
            management_url: Some(created.html_url.clone()),
            alternative_url,
            artifact_id: created.id,
            created_at: created.created_at.unwrap_or(now),
            expires_at: Some(expires_at),
        })
    }

    /// Delete a gist now. A gist that is already gone counts as deleted.
    pub async fn revoke(&self, artifact_id: &str) -> Result<(), GistError> {
        self.client.delete_gist(artifact_id).await
    }

    /// Key under which the deletion of a gist is armed.
    pub fn cleanup_key(artifact_id: &str) -> String {
        format!("gist:{}", artifact_id)
    }

    fn schedule_revoke(&self, artifact_id: &str, delay: Duration) {
        let client = Arc::clone(&self.client);
        let id = artifact_id.to_string();

        self.scheduler
            .arm(Self::cleanup_key(artifact_id), delay, async move {
                match client.delete_gist(&id).await {
                    Ok(()) => log::info!("Gist {} deleted", id),
                    Err(e) => log::warn!("Failed to delete gist {}: {}", id, e),
                }
            });
    }
}
