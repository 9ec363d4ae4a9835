//! Structured logging setup

use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    error::{Error, Result},
};

/// Install the global JSON tracing subscriber
///
/// `service.log_level` accepts a level (`debug`) or a full filter directive
/// (`acton_crud=debug,tower_http=info`). An unparsable value falls back to
/// `info`. Fails if a global subscriber is already installed.
pub fn init_tracing(config: &Config) -> Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(&config.service.log_level))
        .try_init()
        .map_err(|err| Error::Internal(format!("failed to install tracing subscriber: {err}")))?;

    tracing::info!(
        environment = %config.service.environment,
        "Tracing initialized for service: {}",
        config.service.name
    );

    Ok(())
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_falls_back_to_info() {
        assert_eq!(
            env_filter("acton_crud=loud").to_string(),
            EnvFilter::new("info").to_string()
        );
        assert_eq!(
            env_filter("acton_crud=debug").to_string(),
            EnvFilter::new("acton_crud=debug").to_string()
        );
    }

    #[test]
    fn test_second_init_is_an_error() {
        let config = Config::default();
        let _ = init_tracing(&config);
        assert!(matches!(init_tracing(&config), Err(Error::Internal(_))));
    }
}
