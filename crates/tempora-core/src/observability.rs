//! Tracing subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::{TemporaError, TemporaResult};

/// Install the global subscriber. `RUST_LOG` wins over `config.log_level`.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(config: &ObservabilityConfig) -> TemporaResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TemporaError::ConfigError(format!("log filter: {e}")))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let result = if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_target(true).with_line_number(true))
            .try_init()
    } else {
        subscriber.with(fmt::layer().with_target(true)).try_init()
    };
    result.map_err(|e| TemporaError::ConfigError(format!("tracing init: {e}")))
}
