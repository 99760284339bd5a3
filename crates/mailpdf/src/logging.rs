//! Log subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber and routes `log` records into it.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies to this
/// crate and `warn` to everything else.
pub fn init_logging(default_level: &str) {
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records into tracing: {}", e);
    }

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(default_filter(default_level))
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn default_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,mailpdf={}", default_level)))
}
