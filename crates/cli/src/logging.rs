use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber. `RUST_LOG` wins over `default`.
pub fn init(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Only fails if a subscriber is already installed.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).try_init();
}
