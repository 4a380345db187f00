//! # gh-diff-share
//!
//! Delivers a rendered diff to a human: as a self-deleting secret gist, as
//! a file in the output directory, or as an inline `data:` URI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────────┐   ┌──────────────────┐
//! │ request      │──►│ DeliveryOrchestrator   │──►│ DeliverySummary  │
//! │ (tool calls) │   │  policy ─► plan        │   └──────────────────┘
//! └──────────────┘   │  remote │ local │ inline│
//!                    └───┬────────┬───────────┘
//!                        │        │
//!                 gh-gist-client  utils::{browser, chromium}
//!                        │
//!                 DeletionScheduler (TTL cleanup)
//! ```
//!
//! Rendering itself lives in `gh-diff-html`; configuration and environment
//! detection in `gh-diff-share-config`.

pub mod error;
pub mod inline;
pub mod local;
pub mod logger;
pub mod orchestrator;
pub mod plan;
pub mod policy;
pub mod remote;
pub mod request;
pub mod scheduler;
pub mod utils;

pub use error::{DeliveryError, InputError, LocalWriteError, RasterizeError, StrategyFailure};
pub use local::{ArtifactKind, LocalArtifact, LocalArtifactWriter};
pub use orchestrator::{Delivered, DeliveryOrchestrator, DeliveryRequest, DeliverySummary};
pub use plan::{select_plan, DeliveryContext, DeliveryPlan, ExplicitMode, Strategy};
pub use policy::{PolicyOverrides, PolicyResolver, SecurityLevel, SecurityPolicy};
pub use remote::{RemoteShareClient, SharedArtifact};
pub use request::{parse_call, RequestDefaults, ToolCall};
pub use scheduler::DeletionScheduler;
