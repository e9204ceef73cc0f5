//! Log subscriber setup.
//!
//! Library code logs through the `log` facade; [`init_logging`] installs a
//! `tracing-subscriber` formatter that also collects those records.
//!
//! `LOG_LEVEL` accepts a level (`debug`, `INFO`, ...) or a full filter
//! directive (`trsm_data=debug,tiberius=warn`). Defaults to `info`.

use std::env;

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Level used when `LOG_LEVEL` is unset or blank.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const LEVEL_NAMES: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Build the filter for a `LOG_LEVEL` value.
///
/// Bare level names are matched case-insensitively; directives are passed
/// through untouched so target names keep their case.
pub fn log_filter(raw: Option<&str>) -> Result<EnvFilter> {
    let value = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let directive = if LEVEL_NAMES.iter().any(|l| l.eq_ignore_ascii_case(value)) {
        value.to_ascii_lowercase()
    } else {
        value.to_string()
    };

    EnvFilter::try_new(&directive).map_err(|e| anyhow!("invalid LOG_LEVEL '{}': {}", directive, e))
}

/// Install the global subscriber, honouring `LOG_LEVEL`.
///
/// # Errors
/// Fails when `LOG_LEVEL` does not parse or a subscriber is already set.
pub fn init_logging() -> Result<()> {
    let filter = log_filter(env::var("LOG_LEVEL").ok().as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {}", e))?;

    tracing::debug!("logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        let filter = log_filter(None).unwrap();
        assert_eq!(filter.to_string(), "info");
        assert_eq!(log_filter(Some("  ")).unwrap().to_string(), "info");
    }

    #[test]
    fn test_level_is_case_insensitive() {
        assert_eq!(log_filter(Some("DEBUG")).unwrap().to_string(), "debug");
    }

    #[test]
    fn test_directives_are_accepted() {
        assert!(log_filter(Some("trsm_data=debug,tiberius=warn")).is_ok());
    }

    #[test]
    fn test_directive_targets_keep_their_case() {
        let filter = log_filter(Some("SalesDashboard=debug")).unwrap();
        assert!(filter.to_string().contains("SalesDashboard"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(log_filter(Some("trsm_data=loud")).is_err());
    }
}
