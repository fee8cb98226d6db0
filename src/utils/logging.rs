use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Whether `TIERCALC_DEBUG` asks for verbose output
pub fn debug_enabled() -> bool {
    std::env::var("TIERCALC_DEBUG").is_ok()
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` with
/// `TIERCALC_DEBUG` and `warn` without. Safe to call more than once.
pub fn init_tracing() {
    let default_level = if debug_enabled() { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
