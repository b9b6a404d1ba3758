use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_level: String,
}

impl LoggingConfig {
    /// `RUST_LOG` wins over the configured default.
    pub fn from_env(default_level: &str) -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string()),
        }
    }
}

/// Console logging on stderr so stdout stays clean for `--json` output.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| anyhow!("invalid log level '{}': {e}", config.log_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow!("init logging: {e}"))?;

    Ok(())
}
