//! Tracing subscriber setup for host shells embedding the core.

use tracing_subscriber::EnvFilter;

use crate::app_config::AppConfig;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, falling back to the
/// configured `log_level`.
///
/// Returns `false` when a global subscriber was already installed (for
/// example by the host or an earlier call); the existing one is kept.
///
/// # Errors
///
/// Returns an error if neither `RUST_LOG` nor `log_level` is a valid filter
/// directive.
pub fn init_tracing(config: &AppConfig) -> Result<bool, tracing_subscriber::filter::ParseError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    Ok(tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok())
}
