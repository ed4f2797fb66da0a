//! argonaut — a keyboard-driven terminal UI for operating ArgoCD
//!
//! Navigates the GitOps control plane (clusters, namespaces, projects,
//! application sets, applications, and their live resource trees) and runs
//! the day-two operations — sync, diff, rollback, refresh, delete — through
//! a modal, k9s-inspired interface.

pub mod api;
pub mod cli;
pub mod config;
pub mod kubeconfig;
pub mod services;
pub mod tui;
pub mod watcher;

pub use api::{AppItem, ArgoClient, ServerOptions};
pub use config::{Config, ConfigLoader};
pub use tui::{App, Theme};
