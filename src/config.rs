use tracing::{debug, warn};

pub const USER_VAR: &str = "GH_USER";
pub const TOKEN_VAR: &str = "GH_TOKEN";
pub const REPO_VAR: &str = "GH_REPO";

/// Credentials for the repository-dispatch call. The three values only make
/// sense together; a partial set counts as no configuration (logged, so a
/// typo in one variable does not pass silently).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    pub username: String,
    pub token: String,
    /// "owner/name" of the repository whose workflows get re-triggered.
    pub repo: String,
}

impl NotifyConfig {
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Option<Self> {
        match (get(USER_VAR), get(TOKEN_VAR), get(REPO_VAR)) {
            (Some(username), Some(token), Some(repo)) => Some(NotifyConfig {
                username,
                token,
                repo,
            }),
            (None, None, None) => {
                debug!("No dispatch credentials set");
                None
            }
            _ => {
                warn!(
                    "Incomplete dispatch configuration: set all of {}, {} and {}, or none",
                    USER_VAR, TOKEN_VAR, REPO_VAR
                );
                None
            }
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_set_builds_config() {
        let cfg = NotifyConfig::from_lookup(|key| match key {
            USER_VAR => Some("alice".into()),
            TOKEN_VAR => Some("s3cret".into()),
            REPO_VAR => Some("openZH/covid_19".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.username, "alice");
        assert_eq!(cfg.repo, "openZH/covid_19");
    }

    #[test]
    fn absent_set_means_skip() {
        assert!(NotifyConfig::from_lookup(|_| None).is_none());
    }

    #[test]
    fn partial_set_means_skip() {
        let cfg = NotifyConfig::from_lookup(|key| (key == USER_VAR).then(|| "alice".to_string()));
        assert!(cfg.is_none());
    }
}
