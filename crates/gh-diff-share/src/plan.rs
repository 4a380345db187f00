//! Choosing the ordered list of delivery strategies for a request.

use gh_diff_share_config::DeploymentContext;
use std::fmt;

/// One way of getting a rendered page to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Secret gist behind an HTML preview proxy
    Remote,
    /// File in the output directory
    LocalFile,
    /// `data:` URI in the response
    Inline,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Remote => "remote",
            Strategy::LocalFile => "local file",
            Strategy::Inline => "inline",
        })
    }
}

/// Channel the caller asked for explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplicitMode {
    Remote,
    Local,
}

/// Everything the selector looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryContext {
    pub has_remote_credential: bool,
    pub explicit_mode: Option<ExplicitMode>,
    /// Skip the remote channel even when a credential is present.
    pub compatibility_mode: bool,
    pub deployment: DeploymentContext,
}

impl DeliveryContext {
    /// Why the remote strategy is not part of the plan, if it was wanted.
    pub fn remote_skip_reason(&self) -> Option<&'static str> {
        if self.explicit_mode == Some(ExplicitMode::Local) {
            None
        } else if !self.has_remote_credential {
            Some("no GitHub token configured (set GITHUB_TOKEN)")
        } else if self.compatibility_mode {
            Some("compatibility mode requested")
        } else {
            None
        }
    }
}

/// Ordered strategies for one request. Built once, never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPlan {
    strategies: Vec<Strategy>,
    deployment: DeploymentContext,
}

impl DeliveryPlan {
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn includes(&self, strategy: Strategy) -> bool {
        self.strategies.contains(&strategy)
    }

    /// Whether a viewer may be opened on the user's desktop.
    pub fn opens_viewer(&self) -> bool {
        !self.deployment.is_hosted()
    }
}

/// Pick the strategies for a request, most preferred first.
///
/// A hosted deployment never ends in a local file: nobody can browse to it.
pub fn select_plan(ctx: &DeliveryContext) -> DeliveryPlan {
    let fallback = if ctx.deployment.is_hosted() {
        Strategy::Inline
    } else {
        Strategy::LocalFile
    };

    let strategies = match ctx.explicit_mode {
        Some(ExplicitMode::Local) => vec![fallback],
        _ if !ctx.has_remote_credential || ctx.compatibility_mode => vec![fallback],
        _ => vec![Strategy::Remote, fallback],
    };

    log::debug!("Delivery plan for {:?}: {:?}", ctx, strategies);
    DeliveryPlan {
        strategies,
        deployment: ctx.deployment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx(
        has_remote_credential: bool,
        explicit_mode: Option<ExplicitMode>,
        compatibility_mode: bool,
        deployment: DeploymentContext,
    ) -> DeliveryContext {
        DeliveryContext {
            has_remote_credential,
            explicit_mode,
            compatibility_mode,
            deployment,
        }
    }

    #[test]
    fn test_no_credential_falls_back_locally() {
        let plan = select_plan(&ctx(false, None, false, DeploymentContext::Local));
        assert_eq!(plan.strategies(), &[Strategy::LocalFile]);
    }

    #[test]
    fn test_credential_tries_remote_first() {
        let plan = select_plan(&ctx(true, None, false, DeploymentContext::Local));
        assert_eq!(plan.strategies(), &[Strategy::Remote, Strategy::LocalFile]);

        let plan = select_plan(&ctx(
            true,
            Some(ExplicitMode::Remote),
            false,
            DeploymentContext::Hosted,
        ));
        assert_eq!(plan.strategies(), &[Strategy::Remote, Strategy::Inline]);
    }

    #[test]
    fn test_compatibility_mode_skips_remote() {
        let context = ctx(true, None, true, DeploymentContext::Hosted);
        assert_eq!(select_plan(&context).strategies(), &[Strategy::Inline]);
        assert_eq!(
            context.remote_skip_reason(),
            Some("compatibility mode requested")
        );
    }

    #[test]
    fn test_explicit_local() {
        let context = ctx(true, Some(ExplicitMode::Local), false, DeploymentContext::Local);
        assert_eq!(select_plan(&context).strategies(), &[Strategy::LocalFile]);
        assert_eq!(context.remote_skip_reason(), None);
    }

    #[test]
    fn test_explicit_local_when_hosted_returns_inline() {
        for has_credential in [false, true] {
            let context = ctx(
                has_credential,
                Some(ExplicitMode::Local),
                false,
                DeploymentContext::Hosted,
            );
            let plan = select_plan(&context);
            assert_eq!(plan.strategies(), &[Strategy::Inline]);
            assert!(!plan.includes(Strategy::LocalFile));
        }
    }

    #[test]
    fn test_hosted_plans_never_write_files() {
        let modes = [None, Some(ExplicitMode::Remote), Some(ExplicitMode::Local)];
        for explicit_mode in modes {
            for has_credential in [false, true] {
                for compatibility_mode in [false, true] {
                    let plan = select_plan(&ctx(
                        has_credential,
                        explicit_mode,
                        compatibility_mode,
                        DeploymentContext::Hosted,
                    ));
                    assert!(!plan.includes(Strategy::LocalFile));
                    assert_eq!(plan.strategies().last(), Some(&Strategy::Inline));
                }
            }
        }
    }

    #[test]
    fn test_never_remote_without_credential() {
        let modes = [None, Some(ExplicitMode::Remote), Some(ExplicitMode::Local)];
        for explicit_mode in modes {
            for compatibility_mode in [false, true] {
                for deployment in [DeploymentContext::Local, DeploymentContext::Hosted] {
                    let plan =
                        select_plan(&ctx(false, explicit_mode, compatibility_mode, deployment));
                    assert!(!plan.includes(Strategy::Remote));
                    assert!(!plan.strategies().is_empty());
                }
            }
        }
    }

    #[test]
    fn test_hosted_never_opens_viewer() {
        let hosted = select_plan(&ctx(true, None, false, DeploymentContext::Hosted));
        assert!(!hosted.opens_viewer());

        let local = select_plan(&ctx(true, None, false, DeploymentContext::Local));
        assert!(local.opens_viewer());
    }
}
