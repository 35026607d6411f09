use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr: stdout belongs to the terminal UI and to the MCP stdio
/// transport. `RUST_LOG` takes precedence over `default_filter`.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
