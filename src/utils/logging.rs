use std::sync::Once;

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static LOGGER_INITIALIZED: Once = Once::new();

/// Install the stderr subscriber for the binary.
///
/// `RUST_LOG` overrides `default_level`. Safe to call more than once; only
/// the first call installs anything. Library code never calls this.
pub fn init_logging(default_level: &str) {
    LOGGER_INITIALIZED.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        // stdout carries command output, so logs go to stderr
        let console_layer = fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(env_filter);

        // No-op if a global subscriber is already set
        let _ = tracing_subscriber::registry().with(console_layer).try_init();
    });
}
