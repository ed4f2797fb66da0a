//! Application state structures
//!
//! State sub-structures grouping the App's fields into logical pieces:
//! navigation, scope selections, UI scratch, and per-modal payloads.

use crate::api::RevisionRow;
use crate::tui::treeview::ResourceSelection;
use std::collections::HashSet;
use std::time::Instant;

/// Sentinel target marking a multi-app operation in modal state
pub const MULTI_TARGET: &str = "__MULTI__";

/// Hierarchy views. Clusters → Namespaces → Projects → Apps → Tree is the
/// main drill path; ApplicationSets is a side hierarchy into Apps.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum View {
    Clusters,
    Namespaces,
    Projects,
    ApplicationSets,
    Apps,
    Tree,
}

impl View {
    /// Parse a view name as used by commands and the `default_view` config.
    pub fn parse(s: &str) -> Option<View> {
        match s.to_lowercase().as_str() {
            "cls" | "cluster" | "clusters" => Some(View::Clusters),
            "ns" | "namespace" | "namespaces" => Some(View::Namespaces),
            "proj" | "project" | "projects" => Some(View::Projects),
            "appset" | "appsets" | "applicationsets" => Some(View::ApplicationSets),
            "app" | "apps" | "applications" => Some(View::Apps),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Clusters => "Clusters",
            View::Namespaces => "Namespaces",
            View::Projects => "Projects",
            View::ApplicationSets => "ApplicationSets",
            View::Apps => "Applications",
            View::Tree => "Resources",
        }
    }
}

/// The exclusive UI mode determining which key table is active.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Normal,
    Search,
    Command,
    Help,
    Theme,
    ConfirmSync,
    Rollback,
    ConfirmAppDelete,
    ConfirmResourceDelete,
    ConfirmResourceSync,
    Diff,
    NoDiff,
    K9sContextSelect,
    K9sError,
    DefaultViewWarning,
    Error,
    ConnectionError,
    AuthRequired,
    Upgrade,
    UpgradeError,
    UpgradeSuccess,
    CoreDetected,
}

/// Navigation state: current view, cursor, and key-chord timestamps.
#[derive(Debug)]
pub struct NavigationState {
    pub view: View,
    pub selected_idx: usize,
    /// Last Escape keypress, for the 100 ms debounce
    pub last_esc: Option<Instant>,
    /// Last `Z` keypress, for the 500 ms ZZ/ZQ chord window
    pub last_z: Option<Instant>,
}

impl NavigationState {
    pub fn new(view: View) -> Self {
        Self {
            view,
            selected_idx: 0,
            last_esc: None,
            last_z: None,
        }
    }
}

/// Scope sets restricting deeper views, plus the multi-target app set.
#[derive(Debug, Default)]
pub struct Selections {
    pub scope_clusters: HashSet<String>,
    pub scope_namespaces: HashSet<String>,
    pub scope_projects: HashSet<String>,
    pub scope_app_sets: HashSet<String>,
    pub selected_apps: HashSet<String>,
}

/// Transient UI inputs: filters, the command line, tree bookkeeping.
#[derive(Debug, Default)]
pub struct UiState {
    /// Filter committed with Enter from search mode
    pub active_filter: String,
    /// Live query while the search editor is open
    pub search_query: String,
    /// Command line buffer (without the leading ':')
    pub command: String,
    pub command_history: Vec<String>,
    pub command_history_idx: Option<usize>,
    /// App shown in the tree view when a single app is open
    pub tree_app_name: Option<String>,
    /// Transient status line message
    pub status: Option<String>,
    /// Theme active before the picker opened, restored on cancel
    pub theme_original: Option<String>,
}

/// Sort order for the Apps list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Health,
    Sync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppSort {
    pub field: Option<SortField>,
    pub ascending: bool,
}

/// Kubernetes deletion propagation policy, cycled with `p` in delete modals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationPolicy {
    Foreground,
    Background,
    Orphan,
}

impl PropagationPolicy {
    pub fn next(self) -> Self {
        match self {
            PropagationPolicy::Foreground => PropagationPolicy::Background,
            PropagationPolicy::Background => PropagationPolicy::Orphan,
            PropagationPolicy::Orphan => PropagationPolicy::Foreground,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropagationPolicy::Foreground => "foreground",
            PropagationPolicy::Background => "background",
            PropagationPolicy::Orphan => "orphan",
        }
    }
}

/// Sync confirmation modal payload.
#[derive(Debug)]
pub struct ConfirmSyncState {
    /// App name, or [`MULTI_TARGET`] for the checked set
    pub target: String,
    pub prune: bool,
    pub watch: bool,
    /// 0 = Sync, 1 = Cancel
    pub selected_button: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub session: u64,
}

impl ConfirmSyncState {
    pub fn new(target: String, session: u64) -> Self {
        Self {
            target,
            prune: false,
            watch: false,
            selected_button: 0,
            loading: false,
            error: None,
            session,
        }
    }
}

/// Rollback runs in two phases: pick a revision, then confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackPhase {
    List,
    Confirm,
}

/// Rollback session state, allocated on entry and dropped on exit.
#[derive(Debug)]
pub struct RollbackState {
    pub app_name: String,
    pub app_namespace: Option<String>,
    pub rows: Vec<RevisionRow>,
    pub selected_idx: usize,
    pub phase: RollbackPhase,
    pub prune: bool,
    pub watch: bool,
    pub dry_run: bool,
    /// 0 = Yes, 1 = Cancel
    pub confirm_selected: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub session: u64,
}

impl RollbackState {
    pub fn new(app_name: String, app_namespace: Option<String>, session: u64) -> Self {
        Self {
            app_name,
            app_namespace,
            rows: Vec::new(),
            selected_idx: 0,
            phase: RollbackPhase::List,
            prune: false,
            watch: false,
            dry_run: false,
            confirm_selected: 0,
            loading: true,
            error: None,
            session,
        }
    }
}

/// App delete confirmation payload.
#[derive(Debug)]
pub struct AppDeleteState {
    /// App name, or [`MULTI_TARGET`]
    pub target: String,
    pub app_namespace: Option<String>,
    pub cascade: bool,
    pub policy: PropagationPolicy,
    pub loading: bool,
    pub error: Option<String>,
    pub session: u64,
}

impl AppDeleteState {
    pub fn new(target: String, app_namespace: Option<String>, session: u64) -> Self {
        Self {
            target,
            app_namespace,
            cascade: true,
            policy: PropagationPolicy::Foreground,
            loading: false,
            error: None,
            session,
        }
    }
}

/// Resource delete confirmation payload (tree view).
#[derive(Debug)]
pub struct ResourceDeleteState {
    pub app_name: String,
    pub targets: Vec<ResourceSelection>,
    pub cascade: bool,
    pub policy: PropagationPolicy,
    pub force: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub session: u64,
}

impl ResourceDeleteState {
    pub fn new(app_name: String, targets: Vec<ResourceSelection>, session: u64) -> Self {
        Self {
            app_name,
            targets,
            cascade: true,
            policy: PropagationPolicy::Foreground,
            force: false,
            loading: false,
            error: None,
            session,
        }
    }
}

/// Resource sync confirmation payload (tree view).
#[derive(Debug)]
pub struct ResourceSyncState {
    pub app_name: String,
    pub targets: Vec<ResourceSelection>,
    pub prune: bool,
    pub force: bool,
    /// 0 = Sync, 1 = Cancel
    pub selected_button: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub session: u64,
}

impl ResourceSyncState {
    pub fn new(app_name: String, targets: Vec<ResourceSelection>, session: u64) -> Self {
        Self {
            app_name,
            targets,
            prune: false,
            force: false,
            selected_button: 0,
            loading: false,
            error: None,
            session,
        }
    }
}

pub use crate::services::diff::{DiffLine, DiffLineKind};

/// Diff viewer state.
#[derive(Debug)]
pub struct DiffState {
    pub title: String,
    pub lines: Vec<DiffLine>,
    pub loading: bool,
    pub session: u64,
}

/// Pending k9s launch waiting for a context choice.
#[derive(Debug)]
pub struct K9sPendingState {
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub contexts: Vec<String>,
    pub selected: usize,
}

/// Upgrade check result shown in the upgrade modals.
#[derive(Debug)]
pub struct UpgradeState {
    pub current: String,
    pub latest: Option<String>,
}

/// Modal payloads. At most one is populated at a time; the active [`Mode`]
/// decides which one handlers may read.
#[derive(Debug, Default)]
pub struct Modals {
    pub confirm_sync: Option<ConfirmSyncState>,
    pub app_delete: Option<AppDeleteState>,
    pub resource_delete: Option<ResourceDeleteState>,
    pub resource_sync: Option<ResourceSyncState>,
    pub k9s_pending: Option<K9sPendingState>,
    pub k9s_error: Option<String>,
    pub default_view_warning: Option<String>,
    pub error_message: Option<String>,
    pub upgrade: Option<UpgradeState>,
    pub upgrade_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_parse_aliases() {
        assert_eq!(View::parse("cls"), Some(View::Clusters));
        assert_eq!(View::parse("clusters"), Some(View::Clusters));
        assert_eq!(View::parse("ns"), Some(View::Namespaces));
        assert_eq!(View::parse("proj"), Some(View::Projects));
        assert_eq!(View::parse("appsets"), Some(View::ApplicationSets));
        assert_eq!(View::parse("applicationsets"), Some(View::ApplicationSets));
        assert_eq!(View::parse("apps"), Some(View::Apps));
        assert_eq!(View::parse("bogus"), None);
    }

    #[test]
    fn test_propagation_policy_cycles() {
        let p = PropagationPolicy::Foreground;
        assert_eq!(p.next(), PropagationPolicy::Background);
        assert_eq!(p.next().next(), PropagationPolicy::Orphan);
        assert_eq!(p.next().next().next(), PropagationPolicy::Foreground);
    }
}
