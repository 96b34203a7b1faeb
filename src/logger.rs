use tracing_subscriber::{fmt, EnvFilter};

/// Honors `RUST_LOG`, falling back to `level`. Logs go to stderr so command
/// output on stdout stays clean.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
