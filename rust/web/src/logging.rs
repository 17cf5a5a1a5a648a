use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Respects `RUST_LOG` when set; defaults to info globally and debug for
/// this crate. Safe to call once at process start.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bingo_web=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
