use std::net::SocketAddr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

use super::TracingConfig;

/// Installs the global subscriber. `RUST_LOG` wins over the configured
/// directives. Fails if a subscriber is already installed.
pub fn init_tracing(config: &TracingConfig, addr: SocketAddr) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json_format {
        registry
            .with(fmt::layer().json().with_current_span(true).flatten_event(true))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_file(true).with_line_number(true))
            .try_init()?;
    }

    tracing::info!(
        %addr,
        environment = %config.environment,
        json_format = config.json_format,
        directives = %config.default_directives,
        "Tracing initialized"
    );

    Ok(())
}
