//! Tracing setup

use kinema_core::{KinemaError, KinemaResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of the human-readable format
    pub json: bool,
    /// Include the module path of each event
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "kinema=info".to_string(),
            json: false,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        self.env_filter().map(|_| ())
    }

    fn env_filter(&self) -> KinemaResult<EnvFilter> {
        EnvFilter::try_new(&self.filter).map_err(|e| {
            KinemaError::InvalidConfig(format!("invalid log filter {:?}: {}", self.filter, e))
        })
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured filter. Fails if a
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> KinemaResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.env_filter()?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| KinemaError::InvalidConfig(format!("tracing init failed: {}", e)))
}
