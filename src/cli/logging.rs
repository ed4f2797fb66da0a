//! Logging initialization

use std::path::PathBuf;

/// Initialize logging based on debug flag
///
/// Returns the log file path if debug logging is enabled. The path is also
/// exported as ARGONAUT_LOG_FILE so the error views can open the log with
/// the `l` key.
pub fn init_logging(debug: bool) -> Option<PathBuf> {
    if !debug {
        // No logging by default (silent operation)
        return None;
    }

    // Temp log file so the TUI keeps stdout/stderr to itself
    let log_path = tempfile::Builder::new()
        .prefix("argonaut-")
        .suffix(".log")
        .tempfile()
        .map(|f| {
            let path = f.path().to_path_buf();
            // Keep the file alive for the process lifetime
            std::mem::forget(f);
            path
        })
        .unwrap_or_else(|_| {
            std::env::temp_dir().join(format!("argonaut-{}.log", std::process::id()))
        });

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&log_path)
    {
        Ok(f) => f,
        Err(_) => return None,
    };

    tracing_subscriber::fmt()
        .with_writer(file)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_ansi(false)
        .with_target(true)
        .init();

    // SAFETY: called once at startup before any threads are spawned
    unsafe {
        std::env::set_var("ARGONAUT_LOG_FILE", &log_path);
    }

    Some(log_path)
}

/// Read the current log file contents, if logging is enabled.
pub fn read_log_content() -> Option<String> {
    let path = std::env::var("ARGONAUT_LOG_FILE").ok()?;
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    std::fs::read_to_string(path).ok()
}
