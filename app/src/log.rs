use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the process-wide logger for the CLI
///
/// Records from the `log` facade are bridged into a fmt subscriber on stderr,
/// leaving stdout to progress output. `RUST_LOG` overrides the level, which is
/// Debug in development builds and Info in production builds.
pub fn init() {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    // A second init (e.g. from tests) keeps the first logger
    if subscriber.try_init().is_err() {
        log::debug!("Logger already initialised");
    }
}
