//! Environment-driven bout configuration.
//!
//! Environment variables must be set by the runtime environment (compose
//! env_file, `docker run --env-file`, or sourcing an env file in dev).

use std::time::Duration;

use crate::domain::roster::{CastingPolicy, Roster};
use crate::error::AppError;

/// Settings for the HTTP model gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Everything the match controller needs to run a bout.
#[derive(Debug, Clone)]
pub struct BoutConfig {
    pub roster: Roster,
    pub total_rounds: u64,
    pub casting: CastingPolicy,
    pub prompt_timeout: Duration,
    pub answer_timeout: Duration,
    pub vote_timeout: Duration,
    /// Hard ceiling for the voting phase as a whole; judges still pending
    /// when it expires are recorded as failed.
    pub vote_group_deadline: Option<Duration>,
    /// Cosmetic delay before the next round so viewers can read the result.
    pub round_break: Duration,
    pub start_paused: bool,
    pub build_version: String,
}

fn env_u64(name: &str, default: u64) -> Result<u64, AppError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| AppError::config(format!("{name} must be an integer, got '{value}'"))),
        Err(_) => Ok(default),
    }
}

fn env_secs(name: &str, default_secs: u64) -> Result<Duration, AppError> {
    Ok(Duration::from_secs(env_u64(name, default_secs)?))
}

/// Boolean env convention: unset, empty, `0` and `false` are off.
fn flag_enabled(value: Option<&str>) -> bool {
    match value {
        Some(v) => !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"),
        None => false,
    }
}

impl BoutConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let models = std::env::var("BOUT_MODELS")
            .map_err(|_| AppError::config("BOUT_MODELS must be set".to_string()))?;
        let roster = Roster::parse(&models)?;

        let casting_name =
            std::env::var("BOUT_CASTING").unwrap_or_else(|_| "rotation".to_string());
        let casting = CastingPolicy::from_name(&casting_name).ok_or_else(|| {
            AppError::config(format!("unknown BOUT_CASTING policy '{casting_name}'"))
        })?;

        Ok(Self {
            roster,
            total_rounds: env_u64("BOUT_TOTAL_ROUNDS", 20)?,
            casting,
            prompt_timeout: env_secs("BOUT_PROMPT_TIMEOUT_SECS", 30)?,
            answer_timeout: env_secs("BOUT_ANSWER_TIMEOUT_SECS", 45)?,
            vote_timeout: env_secs("BOUT_VOTE_TIMEOUT_SECS", 30)?,
            vote_group_deadline: Some(env_secs("BOUT_VOTE_GROUP_DEADLINE_SECS", 60)?),
            round_break: env_secs("BOUT_ROUND_BREAK_SECS", 6)?,
            start_paused: flag_enabled(std::env::var("BOUT_START_PAUSED").ok().as_deref()),
            build_version: std::env::var("BUILD_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
        })
    }

    /// Fast-running configuration for tests: tiny timeouts, no round break.
    pub fn for_tests(roster: Roster, total_rounds: u64) -> Self {
        Self {
            roster,
            total_rounds,
            casting: CastingPolicy::Rotation,
            prompt_timeout: Duration::from_millis(500),
            answer_timeout: Duration::from_millis(500),
            vote_timeout: Duration::from_millis(500),
            vote_group_deadline: Some(Duration::from_secs(2)),
            round_break: Duration::ZERO,
            start_paused: false,
            build_version: "test".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{env_u64, flag_enabled, BoutConfig};
    use crate::domain::roster::Roster;

    #[test]
    fn env_u64_defaults_when_unset() {
        assert_eq!(env_u64("BOUT_TEST_UNSET_VAR", 7).unwrap(), 7);
    }

    #[test]
    fn flags_treat_false_and_zero_as_off() {
        assert!(!flag_enabled(None));
        assert!(!flag_enabled(Some("")));
        assert!(!flag_enabled(Some("0")));
        assert!(!flag_enabled(Some("false")));
        assert!(!flag_enabled(Some("FALSE")));
        assert!(flag_enabled(Some("1")));
        assert!(flag_enabled(Some("true")));
    }

    #[test]
    fn test_config_has_no_round_break() {
        let roster = Roster::parse("a,b,c").unwrap();
        let config = BoutConfig::for_tests(roster, 3);
        assert!(config.round_break.is_zero());
        assert_eq!(config.total_rounds, 3);
    }
}
