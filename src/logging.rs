use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_DIR: &str = "./logs";
pub const LOG_FILE: &str = "nse-hero-zero.log";

/// Initialize logging to both console and file
/// Log files are created in ./logs directory with daily rotation.
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let file_layer = std::fs::create_dir_all(LOG_DIR).ok().map(|_| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE);

        // File output with JSON formatting
        tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_ansi(false)
            .json()
    });

    let _ = tracing_subscriber::registry()
        .with(
            // Console output
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_ansi(true),
        )
        .with(file_layer)
        .with(
            // RUST_LOG wins, info otherwise
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
