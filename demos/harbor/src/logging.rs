//! Logging initialisation.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.  The level comes from `RUST_LOG`
/// (default `info`); `json` switches to one JSON object per line.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(true).with_thread_names(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true).with_thread_names(true)).init();
    }
}
