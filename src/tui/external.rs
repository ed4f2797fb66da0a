//! External process launches
//!
//! k9s and the log pager take over the terminal. The event loop restores the
//! terminal before calling [`run_external`] and re-enters raw mode after.

use crate::tui::app::ExternalRequest;
use anyhow::{Context, Result};
use std::io::Write;

pub fn run_external(req: &ExternalRequest) -> Result<()> {
    match req {
        ExternalRequest::K9s {
            context,
            kind,
            namespace,
            name: _,
        } => {
            let mut cmd = std::process::Command::new("k9s");
            if let Some(ctx) = context {
                cmd.arg("--context").arg(ctx);
            }
            if !namespace.is_empty() {
                cmd.arg("--namespace").arg(namespace);
            }
            cmd.arg("--command").arg(kind.to_lowercase());
            let status = cmd.status().context("failed to launch k9s (is it installed?)")?;
            if !status.success() {
                anyhow::bail!("k9s exited with status {}", status);
            }
            Ok(())
        }
        ExternalRequest::Pager { title: _, content } => {
            let mut file = tempfile::NamedTempFile::new().context("failed to create temp file")?;
            file.write_all(content.as_bytes())?;
            let pager = std::env::var("PAGER").unwrap_or_else(|_| "less".to_string());
            let status = std::process::Command::new(&pager)
                .arg(file.path())
                .status()
                .with_context(|| format!("failed to launch pager '{}'", pager))?;
            if !status.success() {
                anyhow::bail!("pager exited with status {}", status);
            }
            Ok(())
        }
    }
}
