use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Initialise the global `tracing` subscriber with a standard `fmt` layer.
///
/// Respects the `RUST_LOG` environment variable. Falls back to
/// `info,tower_http=debug` when `RUST_LOG` is not set.
///
/// Call this once, at the very start of `main`, before any tracing macro.
/// Calling it a second time is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Returns a `TraceLayer` configured for HTTP request/response tracing.
///
/// Uses `tower_http`'s default classification which logs at the `DEBUG` level
/// for requests and responses.
pub fn default_trace() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}
