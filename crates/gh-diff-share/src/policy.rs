//! Security levels and the policies they resolve to.

use gh_diff_html::AccessGate;
use gh_gist_client::Visibility;
use std::fmt;
use std::str::FromStr;

/// Requested security level of a share.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SecurityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl SecurityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityLevel::Low => "low",
            SecurityLevel::Medium => "medium",
            SecurityLevel::High => "high",
        }
    }

    /// Minutes a share of this level stays online.
    pub fn default_ttl_minutes(&self) -> u32 {
        match self {
            SecurityLevel::Low => 60,
            SecurityLevel::Medium => 30,
            SecurityLevel::High => 15,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            SecurityLevel::Low => "Low Security",
            SecurityLevel::Medium => "Medium Security",
            SecurityLevel::High => "High Security",
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(SecurityLevel::Low),
            "medium" => Ok(SecurityLevel::Medium),
            "high" => Ok(SecurityLevel::High),
            other => Err(format!(
                "unknown security level '{}', expected 'low', 'medium' or 'high'",
                other
            )),
        }
    }
}

/// Caller-supplied values that replace a level's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyOverrides {
    /// Already validated to lie in 1..=1440.
    pub ttl_minutes: Option<u32>,
    pub visibility: Option<Visibility>,
    pub access_secret: Option<String>,
}

/// How a rendered diff is protected once shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityPolicy {
    pub ttl_minutes: u32,
    pub gated: bool,
    pub access_secret: Option<String>,
    pub visibility: Visibility,
    pub label: String,
}

impl SecurityPolicy {
    /// Access gate to draw over the page, when gating is on.
    pub fn access_gate(&self) -> Option<AccessGate> {
        match (&self.access_secret, self.gated) {
            (Some(secret), true) => Some(AccessGate {
                secret: secret.clone(),
                ttl_minutes: self.ttl_minutes,
                label: self.label.clone(),
            }),
            _ => None,
        }
    }
}

/// Maps a security level plus overrides to a [`SecurityPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyResolver {
    gating: bool,
}

impl PolicyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn the access-code gate on or off for every resolved policy.
    pub fn with_gating(mut self, gating: bool) -> Self {
        self.gating = gating;
        self
    }

    pub fn resolve(&self, level: SecurityLevel, overrides: &PolicyOverrides) -> SecurityPolicy {
        let default_ttl = level.default_ttl_minutes();
        let label = format!(
            "{} - Secret Gist ({}min auto-delete)",
            level.title(),
            default_ttl
        );

        let access_secret = if self.gating {
            Some(
                overrides
                    .access_secret
                    .clone()
                    .unwrap_or_else(generate_access_code),
            )
        } else {
            None
        };

        SecurityPolicy {
            ttl_minutes: overrides.ttl_minutes.unwrap_or(default_ttl),
            gated: self.gating,
            access_secret,
            visibility: overrides.visibility.unwrap_or(Visibility::Private),
            label,
        }
    }
}

/// Six upper-case alphanumeric characters.
fn generate_access_code() -> String {
    uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_level_table() {
        let resolver = PolicyResolver::new();
        let none = PolicyOverrides::default();

        let low = resolver.resolve(SecurityLevel::Low, &none);
        let medium = resolver.resolve(SecurityLevel::Medium, &none);
        let high = resolver.resolve(SecurityLevel::High, &none);

        assert_eq!(low.ttl_minutes, 60);
        assert_eq!(medium.ttl_minutes, 30);
        assert_eq!(high.ttl_minutes, 15);
        assert_eq!(low.label, "Low Security - Secret Gist (60min auto-delete)");
        assert_eq!(high.label, "High Security - Secret Gist (15min auto-delete)");
    }

    #[test]
    fn test_stricter_levels_expire_sooner() {
        let resolver = PolicyResolver::new().with_gating(true);
        let none = PolicyOverrides::default();
        let ttl = |level| resolver.resolve(level, &none).ttl_minutes;

        assert!(ttl(SecurityLevel::High) < ttl(SecurityLevel::Medium));
        assert!(ttl(SecurityLevel::Medium) < ttl(SecurityLevel::Low));
    }

    #[test]
    fn test_gating_off_by_default() {
        let policy = PolicyResolver::new().resolve(
            SecurityLevel::High,
            &PolicyOverrides {
                access_secret: Some("ignored".to_string()),
                ..PolicyOverrides::default()
            },
        );

        assert!(!policy.gated);
        assert_eq!(policy.access_secret, None);
        assert_eq!(policy.visibility, Visibility::Private);
        assert!(policy.access_gate().is_none());
    }

    #[test]
    fn test_resolve_is_deterministic_without_gating() {
        let resolver = PolicyResolver::new();
        let overrides = PolicyOverrides {
            ttl_minutes: Some(5),
            ..PolicyOverrides::default()
        };
        assert_eq!(
            resolver.resolve(SecurityLevel::Low, &overrides),
            resolver.resolve(SecurityLevel::Low, &overrides)
        );
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let policy = PolicyResolver::new().resolve(
            SecurityLevel::Low,
            &PolicyOverrides {
                ttl_minutes: Some(1440),
                visibility: Some(Visibility::Public),
                access_secret: None,
            },
        );

        assert_eq!(policy.ttl_minutes, 1440);
        assert_eq!(policy.visibility, Visibility::Public);
    }

    #[test]
    fn test_gating_uses_override_secret() {
        let policy = PolicyResolver::new().with_gating(true).resolve(
            SecurityLevel::Medium,
            &PolicyOverrides {
                access_secret: Some("open-sesame".to_string()),
                ..PolicyOverrides::default()
            },
        );

        let gate = policy.access_gate().unwrap();
        assert_eq!(gate.secret, "open-sesame");
        assert_eq!(gate.ttl_minutes, 30);
    }

    #[test]
    fn test_gating_generates_code() {
        let policy = PolicyResolver::new()
            .with_gating(true)
            .resolve(SecurityLevel::Medium, &PolicyOverrides::default());

        let code = policy.access_secret.unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("high".parse::<SecurityLevel>(), Ok(SecurityLevel::High));
        assert!("extreme".parse::<SecurityLevel>().is_err());
        assert_eq!(SecurityLevel::default(), SecurityLevel::Medium);
    }
}
