use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Sets up logging to stdout and to a daily rotating file under `logs/`.
///
/// Levels come from `RUST_LOG`, defaulting to `info` for dependencies and
/// `debug` for the rallypoint crates.
pub fn setup_logging() {
    let file_appender = tracing_appender::rolling::daily("logs", "rallypoint.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_thread_ids(true)
        .with_target(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true);

    let default_filter = "info,rallypoint=debug";

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    // The guard flushes the file writer on drop; it must live as long as the process.
    std::mem::forget(guard);
}
