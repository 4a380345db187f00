//! The delivery pipeline: normalize, render, then try each planned strategy.
//!
//! ```text
//! DeliveryRequest ──► normalize ──► render ──► plan ──┬─► Remote ────┐
//!                                                     ├─► LocalFile ─┼─► DeliverySummary
//!                                                     └─► Inline ────┘
//! ```
//!
//! Strategies are attempted in plan order. The first success ends the
//! delivery; each failure is recorded and the next strategy runs. There is
//! no retry of a failed strategy.

use crate::error::{DeliveryError, InputError, StrategyError, StrategyFailure};
use crate::inline::data_uri;
use crate::local::{ArtifactKind, LocalArtifact, LocalArtifactWriter, RenderedPages};
use crate::plan::{select_plan, DeliveryContext, DeliveryPlan, ExplicitMode, Strategy};
use crate::policy::{PolicyOverrides, PolicyResolver, SecurityLevel, SecurityPolicy};
use crate::remote::{RemoteShareClient, ShareMeta, SharedArtifact};
use crate::scheduler::DeletionScheduler;
use crate::utils::browser::{Opener, SystemOpener};
use crate::utils::chromium::ChromiumRasterizer;
use anyhow::{Context, Result};
use gh_diff_html::{
    normalize, render, render_gated, with_expiry_banner, DiffDocument, RenderOptions,
};
use gh_diff_share_config::{DeploymentContext, OutputLocation, RuntimeEnvironment, ShareConfig};
use gh_gist_client::OctocrabGistClient;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// One validated delivery request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub diff: String,
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub render: RenderOptions,
    pub auto_open: bool,
    pub explicit_mode: Option<ExplicitMode>,
    pub compatibility_mode: bool,
    pub security_level: SecurityLevel,
    pub overrides: PolicyOverrides,
    pub output: ArtifactKind,
}

impl Default for DeliveryRequest {
    fn default() -> Self {
        Self {
            diff: String::new(),
            old_path: None,
            new_path: None,
            render: RenderOptions::default(),
            auto_open: false,
            explicit_mode: None,
            compatibility_mode: false,
            security_level: SecurityLevel::default(),
            overrides: PolicyOverrides::default(),
            output: ArtifactKind::default(),
        }
    }
}

/// What a successful strategy produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    Remote(SharedArtifact),
    LocalFile(LocalArtifact),
    Inline { uri: String },
}

impl Delivered {
    pub fn strategy(&self) -> Strategy {
        match self {
            Delivered::Remote(_) => Strategy::Remote,
            Delivered::LocalFile(_) => Strategy::LocalFile,
            Delivered::Inline { .. } => Strategy::Inline,
        }
    }
}

/// Outcome of a delivery, shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverySummary {
    pub delivered: Delivered,
    /// Security label, set for remote shares
    pub label: Option<String>,
    pub notes: Vec<String>,
    /// Why the preferred channel was skipped or failed
    pub fallback_reason: Option<String>,
    /// Code that unlocks a gated page
    pub access_code: Option<String>,
}

impl fmt::Display for DeliverySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = &self.fallback_reason {
            writeln!(f, "Remote sharing unavailable: {}", reason)?;
        }

        match &self.delivered {
            Delivered::Remote(artifact) => {
                match &self.label {
                    Some(label) => writeln!(f, "Diff shared ({})", label)?,
                    None => writeln!(f, "Diff shared")?,
                }
                writeln!(f, "View: {}", artifact.primary_url)?;
                writeln!(f, "Raw: {}", artifact.raw_url)?;
                if let Some(alternative) = &artifact.alternative_url {
                    writeln!(f, "Alternative: {}", alternative)?;
                }
                if let Some(edit) = artifact.edit_url() {
                    writeln!(f, "Manage: {}", edit)?;
                }
                if let Some(expires_at) = artifact.expires_at {
                    writeln!(f, "Expires: {}", expires_at.to_rfc3339())?;
                }
                if let Some(code) = &self.access_code {
                    writeln!(f, "Access code: {}", code)?;
                }
            }
            Delivered::LocalFile(artifact) => {
                for path in &artifact.files {
                    let kind = path
                        .extension()
                        .map(|ext| ext.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    write!(f, "Generated diff {}: {}", kind, path.display())?;
                    if artifact.opened && Some(path.as_path()) == artifact.path() {
                        write!(f, " (opened automatically)")?;
                    }
                    writeln!(f)?;
                }
                if let Some(expires_at) = artifact.expires_at {
                    writeln!(f, "Expires: {}", expires_at.to_rfc3339())?;
                }
            }
            Delivered::Inline { uri } => {
                writeln!(f, "Diff rendered inline ({} bytes)", uri.len())?;
                writeln!(f, "{}", uri)?;
            }
        }

        for note in &self.notes {
            writeln!(f, "Note: {}", note)?;
        }
        Ok(())
    }
}

/// Runs requests through the pipeline. One instance serves every request.
pub struct DeliveryOrchestrator {
    deployment: DeploymentContext,
    resolver: PolicyResolver,
    preview_opener: Arc<dyn Opener>,
    remote: Option<RemoteShareClient>,
    local: LocalArtifactWriter,
    scheduler: DeletionScheduler,
}

impl DeliveryOrchestrator {
    pub fn new(
        deployment: DeploymentContext,
        resolver: PolicyResolver,
        local: LocalArtifactWriter,
        scheduler: DeletionScheduler,
    ) -> Self {
        Self {
            deployment,
            resolver,
            preview_opener: Arc::new(SystemOpener),
            remote: None,
            local,
            scheduler,
        }
    }

    /// Enable the remote strategy.
    pub fn with_remote(mut self, remote: RemoteShareClient) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Opener used for the preview URL of a remote share.
    pub fn with_opener(mut self, opener: Arc<dyn Opener>) -> Self {
        self.preview_opener = opener;
        self
    }

    /// Wire up the production components from config and environment.
    ///
    /// The gist client is only built when a token is present.
    pub fn from_environment(config: &ShareConfig, env: &RuntimeEnvironment) -> Result<Self> {
        let scheduler = DeletionScheduler::new();
        let opener: Arc<dyn Opener> = Arc::new(SystemOpener);

        let location =
            OutputLocation::resolve(env.deployment, &env.cwd, config.output_dir.as_deref());
        log::info!(
            "Deployment: {:?}, output directory: {}",
            env.deployment,
            location.dir().display()
        );

        let local = LocalArtifactWriter::new(
            location,
            env.deployment,
            Arc::new(ChromiumRasterizer::new(env.chromium_binary.clone())),
            Arc::clone(&opener),
            scheduler.clone(),
        )
        .with_cleanup(
            config
                .local_cleanup_minutes
                .map(|minutes| Duration::from_secs(u64::from(minutes) * 60)),
        );

        let orchestrator = Self::new(
            env.deployment,
            PolicyResolver::new().with_gating(config.access_gate),
            local,
            scheduler.clone(),
        )
        .with_opener(opener);

        match &env.github_token {
            Some(token) => {
                let client = OctocrabGistClient::from_token(token)
                    .context("Failed to create GitHub client")?;
                let remote = RemoteShareClient::new(
                    Arc::new(client),
                    scheduler,
                    config.preview_base_url.clone(),
                );
                Ok(orchestrator.with_remote(remote))
            }
            None => {
                log::info!("No GitHub token, remote sharing disabled");
                Ok(orchestrator)
            }
        }
    }

    /// Registry of pending cleanups armed by deliveries.
    pub fn scheduler(&self) -> &DeletionScheduler {
        &self.scheduler
    }

    pub async fn deliver(&self, request: &DeliveryRequest) -> Result<DeliverySummary, DeliveryError> {
        if request.diff.trim().is_empty() {
            return Err(InputError::MissingDiff.into());
        }

        let doc = normalize(
            &request.diff,
            request.old_path.as_deref(),
            request.new_path.as_deref(),
        );

        let ctx = DeliveryContext {
            has_remote_credential: self.remote.is_some(),
            explicit_mode: request.explicit_mode,
            compatibility_mode: request.compatibility_mode,
            deployment: self.deployment,
        };
        let plan = select_plan(&ctx);
        let mut fallback_reason = ctx.remote_skip_reason().map(str::to_string);
        let mut failures = Vec::new();

        log::info!(
            "Delivering {} bytes of diff via {:?}",
            request.diff.len(),
            plan.strategies()
        );

        for &strategy in plan.strategies() {
            let attempt = match strategy {
                Strategy::Remote => match &self.remote {
                    Some(remote) => self.share(remote, &doc, request, &plan).await,
                    None => continue,
                },
                Strategy::LocalFile => self.write_local(&doc, request).await,
                Strategy::Inline => Ok(self.inline(&doc, request)),
            };

            match attempt {
                Ok(mut summary) => {
                    summary.fallback_reason = fallback_reason;
                    log::info!("Delivered via {}", strategy);
                    return Ok(summary);
                }
                Err(error) => {
                    log::warn!("Delivery via {} failed: {}", strategy, error);
                    if fallback_reason.is_none() {
                        fallback_reason = Some(format!("{} delivery failed: {}", strategy, error));
                    }
                    failures.push(StrategyFailure { strategy, error });
                }
            }
        }

        Err(DeliveryError::AllStrategiesFailed { failures })
    }

    async fn share(
        &self,
        remote: &RemoteShareClient,
        doc: &DiffDocument,
        request: &DeliveryRequest,
        plan: &DeliveryPlan,
    ) -> Result<DeliverySummary, StrategyError> {
        let policy = self.resolver.resolve(request.security_level, &request.overrides);
        let page = with_expiry_banner(&screen_page(doc, &request.render, &policy), policy.ttl_minutes);

        let meta = ShareMeta {
            old_path: doc.display_old_path(),
            new_path: doc.display_new_path(),
        };
        let artifact = remote.publish(&page, &policy, meta).await?;

        let mut notes = Vec::new();
        if request.auto_open {
            if !plan.opens_viewer() {
                notes.push("Auto-open skipped in hosted deployment".to_string());
            } else if let Err(e) = self.preview_opener.open(&artifact.primary_url).await {
                log::warn!("Failed to open {}: {}", artifact.primary_url, e);
                notes.push(format!("Could not open browser: {}", e));
            }
        }

        Ok(DeliverySummary {
            delivered: Delivered::Remote(artifact),
            label: Some(policy.label),
            notes,
            fallback_reason: None,
            access_code: policy.access_secret,
        })
    }

    async fn write_local(
        &self,
        doc: &DiffDocument,
        request: &DeliveryRequest,
    ) -> Result<DeliverySummary, StrategyError> {
        let pages = RenderedPages {
            screen: render(doc, &request.render),
            image: request.output.wants_image().then(|| {
                render(
                    doc,
                    &RenderOptions {
                        for_image_output: true,
                        ..request.render.clone()
                    },
                )
            }),
        };

        let artifact = self
            .local
            .write(&pages, request.output, request.auto_open)
            .await?;

        Ok(DeliverySummary {
            notes: artifact.notes.clone(),
            delivered: Delivered::LocalFile(artifact),
            label: None,
            fallback_reason: None,
            access_code: None,
        })
    }

    fn inline(&self, doc: &DiffDocument, request: &DeliveryRequest) -> DeliverySummary {
        DeliverySummary {
            delivered: Delivered::Inline {
                uri: data_uri(&render(doc, &request.render)),
            },
            label: None,
            notes: Vec::new(),
            fallback_reason: None,
            access_code: None,
        }
    }
}

/// Page published remotely, behind the access gate when the policy has one.
fn screen_page(doc: &DiffDocument, opts: &RenderOptions, policy: &SecurityPolicy) -> String {
    match policy.access_gate() {
        Some(gate) => render_gated(doc, opts, &gate),
        None => render(doc, opts),
    }
}
