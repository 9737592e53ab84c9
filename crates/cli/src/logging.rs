//! Logging initialization.

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Load `.env` and install a stderr subscriber filtered by `RUST_LOG`.
///
/// The default level is `warn` so log lines don't interleave with the prompt.
pub fn init_logging() {
    // Loaded first so RUST_LOG from the dotenv file takes effect.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match dotenv {
        Ok(path) => debug!("read dotenv file from: {}", path.display()),
        Err(err) if err.not_found() => debug!("no dotenv file found"),
        Err(err) => warn!("error reading dotenv file: {err}"),
    }
}
