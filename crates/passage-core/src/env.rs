// Environment detection and logger setup.

use std::sync::OnceLock;

/// Cached environment mode.
static ENV_MODE: OnceLock<EnvMode> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMode {
    Production,
    Development,
    Test,
}

/// Detect the current environment mode.
/// Checks `PASSAGE_ENV`, then `RUST_ENV`.
pub fn detect_env_mode() -> EnvMode {
    *ENV_MODE.get_or_init(|| {
        let env_val = std::env::var("PASSAGE_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default()
            .to_lowercase();

        match env_val.as_str() {
            "production" | "prod" => EnvMode::Production,
            "test" | "testing" => EnvMode::Test,
            _ => EnvMode::Development,
        }
    })
}

pub fn is_production() -> bool {
    detect_env_mode() == EnvMode::Production
}

/// The public base URL of the service, used to build OAuth redirect URIs and
/// verification links. Must be set in production.
pub fn base_url_from_env() -> Option<String> {
    std::env::var("PASSAGE_BASE_URL").ok()
}

/// Initialize the `tracing` subscriber with sensible defaults.
/// `RUST_LOG` overrides; otherwise info in production, debug elsewhere.
pub fn init_logger() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production() {
            EnvFilter::new("passage=info")
        } else {
            EnvFilter::new("passage=debug")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_mode_is_cached() {
        // Two calls observe the same value regardless of env changes between them.
        assert_eq!(detect_env_mode(), detect_env_mode());
    }
}
