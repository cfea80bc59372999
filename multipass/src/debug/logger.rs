//! Logging initialization

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use super::config::{DebugConfig, DEFAULT_LOG_LEVEL, LOG_FILE_NAME};

/// Initialize the logging system
///
/// Sets up:
/// - An `EnvFilter` from `RUST_LOG` (default `multipass=info,warn`)
/// - Human-readable (or JSON) output on stderr
/// - A daily rotated, non-blocking log file when `MULTIPASS_LOG_DIR` is set
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the program.
pub fn init() -> Option<WorkerGuard> {
    init_with(&DebugConfig::from_env())
}

pub fn init_with(config: &DebugConfig) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let stderr_layer = if config.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let mut guard = None;
    let file_layer = config.log_dir.as_ref().and_then(|dir| {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!(
                "Warning: Failed to create log directory {}: {}",
                dir.display(),
                e
            );
            return None;
        }

        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        Some(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false), // No ANSI codes in log files
        )
    });

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if installed.is_err() {
        // A subscriber is already installed (e.g. by a test harness).
        return guard;
    }

    tracing::debug!(
        log_level = %config.log_level,
        log_file = ?config.log_file(),
        json = config.json,
        "Logging initialized"
    );

    setup_panic_hook();
    guard
}

/// Log panics through tracing before the default hook runs
fn setup_panic_hook() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };

        tracing::error!(location = %location, message = %message, "PANIC");
        default_panic(panic_info);
    }));
}
