//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `directives` is an `EnvFilter` string such as `info` or
/// `gembridge_core=debug,tower_http=info`.
pub fn init_logger(directives: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_new(directives)?;
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init()?;
    Ok(())
}
