//! Version command handler

use update_informer::{registry, Check};

/// Display version information
pub fn display_version(debug: bool) {
    let version = env!("CARGO_PKG_VERSION");
    println!("argonaut {}", version);
    println!("  {}", env!("CARGO_PKG_DESCRIPTION"));
    println!("  License: {}", env!("CARGO_PKG_LICENSE"));
    println!("  Repository: {}", env!("CARGO_PKG_REPOSITORY"));

    check_for_updates_blocking(debug);
}

/// Check for newer versions available on crates.io (blocking)
/// Respects NO_UPDATE_NOTIFIER environment variable.
pub fn check_for_updates_blocking(debug: bool) {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    // Duration::ZERO in debug mode checks immediately; otherwise the
    // informer caches the answer for 24 hours
    let interval = if debug {
        std::time::Duration::ZERO
    } else {
        std::time::Duration::from_secs(60 * 60 * 24)
    };

    let informer = update_informer::new(registry::Crates, name, version).interval(interval);

    match informer.check_version() {
        Ok(Some(new_version)) => {
            eprintln!(
                "A new version of argonaut is available: {} (current: v{}) - Disable: NO_UPDATE_NOTIFIER=1",
                new_version, version
            );
        }
        Ok(None) => {
            if debug {
                eprintln!("DEBUG: No update available (current: v{})", version);
            }
        }
        Err(e) => {
            if debug {
                eprintln!("DEBUG: Update check failed: {}", e);
            }
        }
    }
}

/// Check for a newer release without printing; used by the :upgrade command.
/// Returns Ok(Some(version)) when a newer version exists.
pub fn check_latest_version() -> anyhow::Result<Option<String>> {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");
    let informer = update_informer::new(registry::Crates, name, version)
        .interval(std::time::Duration::ZERO);
    match informer.check_version() {
        Ok(found) => Ok(found.map(|v| v.to_string())),
        Err(e) => Err(anyhow::anyhow!("update check failed: {}", e)),
    }
}
