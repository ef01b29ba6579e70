// ABOUTME: tracing subscriber setup driven by -v flags or RUST_LOG
// ABOUTME: Logs go to stderr so JSON suggestions on stdout stay machine-readable

use tracing_subscriber::EnvFilter;

/// Create an environment filter based on verbosity level
pub fn create_env_filter(verbosity: u8) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbosity {
            0 => EnvFilter::new("ssh_bookmarker=warn"),
            1 => EnvFilter::new("ssh_bookmarker=info"),
            2 => EnvFilter::new("ssh_bookmarker=debug"),
            _ => EnvFilter::new("ssh_bookmarker=trace"),
        }
    }
}

pub fn init_logging(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(create_env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
