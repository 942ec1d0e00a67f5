use tracing_subscriber::EnvFilter;

/// Environment variable that switches the probe into verbose diagnostics.
pub const DEBUG_ENV_VAR: &str = "DEBUG";

/// Set up logging for a single probe invocation.
///
/// The container runtime keeps whatever the probe prints in its health log, so the
/// default level only lets warnings through. Setting `DEBUG` raises it to `debug`, and
/// `RUST_LOG` overrides both.
pub fn setup_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .flatten_event(true)
        .init();
}

pub fn debug_enabled() -> bool {
    std::env::var_os(DEBUG_ENV_VAR).is_some()
}
