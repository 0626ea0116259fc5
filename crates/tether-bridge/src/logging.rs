//! Tracing subscriber setup for hosts embedding the bridge

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` overrides `config.filter`. Returns `false` if a global
/// subscriber was already installed, which leaves the existing one in place.
pub fn init(config: &LogConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true);

    if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
