pub use tracing::{debug, error, info, instrument, trace, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
};

fn env_filter(default: &str) -> (EnvFilter, bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let is_debug = filter.to_string().contains("debug")
        || std::env::var("RUST_LOG").unwrap_or_default().contains("debug");
    (filter, is_debug)
}

/// Installs the global subscriber. Stage spans are reported on close when
/// `RUST_LOG` enables debug output.
pub fn init() {
    let (filter, is_debug) = env_filter("info");

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(if is_debug { FmtSpan::CLOSE } else { FmtSpan::NONE });

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Like [`init`] but captured by the test harness; safe to call repeatedly.
pub fn init_for_tests() {
    let (filter, _) = env_filter("warn");
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer().with_target(false))
        .try_init();
}
