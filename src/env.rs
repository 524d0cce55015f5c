//! Environment snapshot.
//!
//! Process environment is read in exactly one place so the collector itself
//! only ever sees explicit [`CollectOptions`].
//!
//! ## Environment Variables
//! - `STAGE` - Active stage; selects `<name>.<stage>.yaml` overrides
//! - `IN_CONTAINER` - Set to `true` when running inside the deployment container

use crate::config::CollectOptions;

/// Variable naming the active stage.
pub const STAGE_VAR: &str = "STAGE";

/// Variable flagging a containerized run.
pub const IN_CONTAINER_VAR: &str = "IN_CONTAINER";

/// Read an environment variable, falling back to `default` when it is unset
/// or not valid unicode.
pub fn get_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Values captured from the process environment at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Active stage, `None` when `STAGE` is unset or empty
    pub stage: Option<String>,
    /// Whether `IN_CONTAINER` is `true`
    pub in_container: bool,
}

impl Environment {
    /// Capture `STAGE` and `IN_CONTAINER` from the current process.
    pub fn capture() -> Self {
        Self::from_values(&get_env(STAGE_VAR, ""), &get_env(IN_CONTAINER_VAR, ""))
    }

    /// Build a snapshot from raw variable values.
    pub fn from_values(stage: &str, in_container: &str) -> Self {
        let stage = stage.trim();
        Self {
            stage: (!stage.is_empty()).then(|| stage.to_string()),
            in_container: in_container.trim().eq_ignore_ascii_case("true"),
        }
    }

    /// Collector options for this snapshot.
    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions::new().with_stage(self.stage.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stage_means_none() {
        let env = Environment::from_values("", "");
        assert_eq!(env.stage, None);
        assert!(!env.in_container);

        let env = Environment::from_values("   ", "false");
        assert_eq!(env.stage, None);
    }

    #[test]
    fn test_values_are_trimmed() {
        let env = Environment::from_values(" test ", "TRUE");
        assert_eq!(env.stage.as_deref(), Some("test"));
        assert!(env.in_container);
    }

    #[test]
    fn test_collect_options_carry_stage() {
        let env = Environment::from_values("prod", "");
        assert_eq!(env.collect_options().stage(), Some("prod"));
    }

    #[test]
    fn test_get_env_default_for_unset() {
        assert_eq!(
            get_env("STAGE_CONFIG_TEST_SURELY_UNSET_VARIABLE", "fallback"),
            "fallback"
        );
    }
}
