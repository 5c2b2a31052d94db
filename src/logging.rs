//! Tracing configuration and log routing.
//!
//! Console output uses a compact formatter: stdout for the HTTP server, stderr for the CLI so
//! that its JSON report stays clean on stdout. Logs are also appended to a file: the path in
//! `BRAND_GUARDIAN_LOG_FILE` when set, otherwise `logs/brand-guardian.log`. A non‑blocking
//! writer keeps file I/O off request paths.
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, fmt::writer::BoxMakeWriter, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Configure tracing for the HTTP server: stdout plus optional file logging.
///
/// - Respects `RUST_LOG` for filtering (defaults to `info`).
/// - Uses a global guard to keep the non‑blocking writer alive for the process lifetime.
/// - Leaves an already-installed subscriber in place.
pub fn init_tracing() {
    install(BoxMakeWriter::new(std::io::stdout));
}

/// Configure tracing for command-line use: stderr plus optional file logging.
pub fn init_cli_tracing() {
    install(BoxMakeWriter::new(std::io::stderr));
}

fn install(console: BoxMakeWriter) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_writer(console)
        .with_target(false)
        .compact();
    let file_layer = configure_file_writer().map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Build a non‑blocking writer for file logging.
///
/// Returns `None` when the logs directory cannot be created or the target file cannot be opened.
fn configure_file_writer() -> Option<NonBlocking> {
    if let Ok(path) = std::env::var("BRAND_GUARDIAN_LOG_FILE") {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                let _ = LOG_GUARD.set(guard);
                Some(non_blocking)
            }
            Err(err) => {
                eprintln!("Failed to open log file {path}: {err}");
                None
            }
        }
    } else {
        if let Err(err) = std::fs::create_dir_all("logs") {
            eprintln!("Failed to create logs directory: {err}");
            return None;
        }
        let file_appender = tracing_appender::rolling::never("logs", "brand-guardian.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);
        Some(non_blocking)
    }
}
