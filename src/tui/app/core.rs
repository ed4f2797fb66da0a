//! Application state and main TUI logic

use super::state::{
    AppSort, Mode, Modals, NavigationState, RollbackPhase, Selections, SortField, UiState, View,
};
use crate::api::AppItem;
use crate::config::Config;
use crate::services::NavigationService;
use crate::tui::app::async_ops::Command;
use crate::tui::navigator::ListNavigator;
use crate::tui::theme::Theme;
use crate::tui::treeview::TreeView;
use crate::watcher::{AppMsg, MsgErrorKind};
use std::time::{Duration, Instant};

/// How long the refresh feedback flash stays on screen
const FLASH_DURATION: Duration = Duration::from_millis(600);

/// One row of a list view: a plain name (clusters, namespaces, projects,
/// appsets) or a full application row.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEntry {
    Name(String),
    App(AppItem),
}

impl ListEntry {
    pub fn label(&self) -> &str {
        match self {
            ListEntry::Name(n) => n,
            ListEntry::App(a) => &a.name,
        }
    }
}

/// Main application state. Mutated only by the event loop.
pub struct App {
    pub(crate) config: Config,
    pub(crate) theme: Theme,
    pub(crate) theme_name: String,

    // Inventory
    pub(crate) apps: Vec<AppItem>,
    pub(crate) apps_loaded: bool,

    // Navigation + mode
    pub(crate) mode: Mode,
    pub(crate) nav: NavigationState,
    pub(crate) selections: Selections,
    pub(crate) ui: UiState,
    pub(crate) modals: Modals,
    pub(crate) rollback: Option<super::state::RollbackState>,
    pub(crate) diff: Option<super::state::DiffState>,
    pub(crate) sort: AppSort,

    // Tree view
    pub(crate) tree: TreeView,
    pub(crate) tree_loading: bool,
    pub(crate) tree_session: u64,
    pub(crate) flash_until: Option<Instant>,

    // Panel navigators
    pub(crate) list_nav: ListNavigator,
    pub(crate) tree_nav: ListNavigator,
    pub(crate) theme_nav: ListNavigator,
    pub(crate) rollback_nav: ListNavigator,
    pub(crate) k9s_nav: ListNavigator,
    pub(crate) diff_scroll: usize,
    pub(crate) tree_scroll: usize,

    // Async bookkeeping
    pub(crate) session_counter: u64,
    pub(crate) pending_commands: Vec<Command>,
    pub(crate) last_project_filter: Option<String>,
    pub(crate) fatal_error: Option<String>,

    // Terminal size
    pub(crate) term_rows: u16,
    pub(crate) term_cols: u16,

    /// ArgoCD core install without an API server: read-only warning, no data
    pub(crate) core_mode: bool,
}

impl App {
    pub fn new(config: Config, theme: Theme, theme_name: String, core_mode: bool) -> Self {
        let mut modals = Modals::default();
        let (view, mode) = match config.default_view.as_deref() {
            None => (View::Apps, Mode::Normal),
            Some(raw) => match View::parse(raw) {
                Some(v) => (v, Mode::Normal),
                None => {
                    modals.default_view_warning = Some(format!(
                        "Unknown default_view '{}' in config; falling back to apps",
                        raw
                    ));
                    (View::Apps, Mode::DefaultViewWarning)
                }
            },
        };
        let mode = if core_mode { Mode::CoreDetected } else { mode };

        Self {
            config,
            theme,
            theme_name,
            apps: Vec::new(),
            apps_loaded: false,
            mode,
            nav: NavigationState::new(view),
            selections: Selections::default(),
            ui: UiState::default(),
            modals,
            rollback: None,
            diff: None,
            sort: AppSort::default(),
            tree: TreeView::new(),
            tree_loading: false,
            tree_session: 0,
            flash_until: None,
            list_nav: ListNavigator::new(),
            tree_nav: ListNavigator::new(),
            theme_nav: ListNavigator::new(),
            rollback_nav: ListNavigator::new(),
            k9s_nav: ListNavigator::new(),
            diff_scroll: 0,
            tree_scroll: 0,
            session_counter: 0,
            pending_commands: Vec::new(),
            last_project_filter: None,
            fatal_error: None,
            term_rows: 24,
            term_cols: 80,
            core_mode,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui
    }

    pub fn modals(&self) -> &Modals {
        &self.modals
    }

    pub fn rollback_state(&self) -> Option<&super::state::RollbackState> {
        self.rollback.as_ref()
    }

    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }

    pub fn sort(&self) -> AppSort {
        self.sort
    }

    pub fn tree_view(&self) -> &TreeView {
        &self.tree
    }

    pub fn current_view(&self) -> View {
        self.nav.view
    }

    pub fn selected_idx(&self) -> usize {
        self.nav.selected_idx
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn core_mode(&self) -> bool {
        self.core_mode
    }

    pub fn terminal_size(&self) -> (u16, u16) {
        (self.term_cols, self.term_rows)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.term_cols = cols;
        self.term_rows = rows;
    }

    pub(crate) fn next_session(&mut self) -> u64 {
        self.session_counter += 1;
        self.session_counter
    }

    pub(crate) fn push_cmd(&mut self, cmd: Command) {
        self.pending_commands.push(cmd);
    }

    /// Drain the follow-up commands produced by the last update.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending_commands)
    }

    pub(crate) fn set_status(&mut self, message: impl Into<String>) {
        self.ui.status = Some(message.into());
    }

    pub fn status(&self) -> Option<&str> {
        self.ui.status.as_deref()
    }

    /// Clear the refresh flash once its window has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(until) = self.flash_until {
            if now >= until {
                self.flash_until = None;
                self.tree.set_flash_all(false);
            }
        }
    }

    // ----- Inventory and visibility -----

    /// The text filter applied to the current list: the live search query
    /// while the search editor is open, the committed filter otherwise.
    pub(crate) fn text_filter(&self) -> &str {
        if self.mode == Mode::Search && self.nav.view != View::Tree {
            &self.ui.search_query
        } else {
            &self.ui.active_filter
        }
    }

    /// Apps passing the scope sets (no text filter applied).
    pub(crate) fn apps_in_scope(&self) -> Vec<&AppItem> {
        self.apps
            .iter()
            .filter(|a| {
                (self.selections.scope_clusters.is_empty()
                    || self.selections.scope_clusters.contains(&a.cluster_label))
                    && (self.selections.scope_namespaces.is_empty()
                        || self.selections.scope_namespaces.contains(&a.namespace))
                    && (self.selections.scope_projects.is_empty()
                        || self.selections.scope_projects.contains(&a.project))
                    && (self.selections.scope_app_sets.is_empty()
                        || a.app_set
                            .as_ref()
                            .is_some_and(|s| self.selections.scope_app_sets.contains(s)))
            })
            .collect()
    }

    /// The rows shown in the current list view, scope- and text-filtered.
    pub fn visible_items(&self) -> Vec<ListEntry> {
        let filter = self.text_filter().to_lowercase();
        let matches = |label: &str| filter.is_empty() || label.to_lowercase().contains(&filter);

        let mut items: Vec<ListEntry> = match self.nav.view {
            View::Clusters => {
                let mut names: Vec<String> =
                    self.apps.iter().map(|a| a.cluster_label.clone()).collect();
                names.sort();
                names.dedup();
                names.into_iter().map(ListEntry::Name).collect()
            }
            View::Namespaces => {
                let mut names: Vec<String> = self
                    .apps
                    .iter()
                    .filter(|a| {
                        self.selections.scope_clusters.is_empty()
                            || self.selections.scope_clusters.contains(&a.cluster_label)
                    })
                    .map(|a| a.namespace.clone())
                    .filter(|n| !n.is_empty())
                    .collect();
                names.sort();
                names.dedup();
                names.into_iter().map(ListEntry::Name).collect()
            }
            View::Projects => {
                let mut names: Vec<String> = self
                    .apps
                    .iter()
                    .filter(|a| {
                        (self.selections.scope_clusters.is_empty()
                            || self.selections.scope_clusters.contains(&a.cluster_label))
                            && (self.selections.scope_namespaces.is_empty()
                                || self.selections.scope_namespaces.contains(&a.namespace))
                    })
                    .map(|a| a.project.clone())
                    .collect();
                names.sort();
                names.dedup();
                names.into_iter().map(ListEntry::Name).collect()
            }
            View::ApplicationSets => {
                let mut names: Vec<String> =
                    self.apps.iter().filter_map(|a| a.app_set.clone()).collect();
                names.sort();
                names.dedup();
                names.into_iter().map(ListEntry::Name).collect()
            }
            View::Apps => {
                let mut apps: Vec<AppItem> =
                    self.apps_in_scope().into_iter().cloned().collect();
                self.sort_apps(&mut apps);
                apps.into_iter().map(ListEntry::App).collect()
            }
            View::Tree => Vec::new(),
        };

        items.retain(|entry| matches(entry.label()));
        items
    }

    fn sort_apps(&self, apps: &mut [AppItem]) {
        match self.sort.field {
            None => apps.sort_by(|a, b| a.name.cmp(&b.name)),
            Some(SortField::Health) => {
                apps.sort_by(|a, b| {
                    let ord = a
                        .health_status
                        .cmp(&b.health_status)
                        .then_with(|| a.name.cmp(&b.name));
                    if self.sort.ascending { ord } else { ord.reverse() }
                });
            }
            Some(SortField::Sync) => {
                apps.sort_by(|a, b| {
                    let ord = a
                        .sync_status
                        .cmp(&b.sync_status)
                        .then_with(|| a.name.cmp(&b.name));
                    if self.sort.ascending { ord } else { ord.reverse() }
                });
            }
        }
    }

    /// Clamp the cursor into the visible range after any list change.
    pub(crate) fn clamp_selection(&mut self) {
        let count = self.visible_items().len();
        self.nav.selected_idx = NavigationService::validate_bounds(self.nav.selected_idx, count);
        self.list_nav.set_item_count(count);
        self.list_nav.set_cursor(self.nav.selected_idx);
    }

    /// App under the cursor, Apps view only.
    pub(crate) fn current_app(&self) -> Option<AppItem> {
        if self.nav.view != View::Apps {
            return None;
        }
        match self.visible_items().into_iter().nth(self.nav.selected_idx) {
            Some(ListEntry::App(app)) => Some(app),
            _ => None,
        }
    }

    /// The checked apps when any, the cursor app otherwise.
    pub(crate) fn checked_or_cursor_apps(&self) -> Vec<AppItem> {
        if self.selections.selected_apps.is_empty() {
            return self.current_app().into_iter().collect();
        }
        self.apps
            .iter()
            .filter(|a| self.selections.selected_apps.contains(&a.name))
            .cloned()
            .collect()
    }

    pub(crate) fn find_app(&self, name: &str) -> Option<&AppItem> {
        self.apps.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Checked apps that fell out of scope are dropped rather than operated
    /// on invisibly.
    pub(crate) fn prune_hidden_selected_apps(&mut self) {
        let visible: std::collections::HashSet<String> = self
            .apps_in_scope()
            .iter()
            .map(|a| a.name.clone())
            .collect();
        self.selections
            .selected_apps
            .retain(|name| visible.contains(name));
    }

    /// Single-project scopes become a server-side filter on the apps watch.
    pub(crate) fn project_filter(&self) -> Option<String> {
        if self.selections.scope_projects.len() == 1 {
            self.selections.scope_projects.iter().next().cloned()
        } else {
            None
        }
    }

    /// Queue an apps-watch restart when the effective project scope changed.
    pub(crate) fn maybe_restart_watch_for_scope(&mut self) {
        let filter = self.project_filter();
        if filter != self.last_project_filter {
            self.last_project_filter = filter.clone();
            self.push_cmd(Command::RestartAppsWatch { project: filter });
        }
    }

    // ----- Tree view entry/exit -----

    /// Open the resource tree for the given apps and start their watchers.
    pub(crate) fn open_resources(&mut self, apps: Vec<AppItem>) {
        if apps.is_empty() {
            self.set_status("No app selected for resources");
            return;
        }
        self.push_cmd(Command::CloseTree);
        self.tree.clear();
        for app in &apps {
            self.tree
                .set_app_meta(&app.name, &app.health_status, &app.sync_status);
        }
        self.ui.tree_app_name = if apps.len() == 1 {
            Some(apps[0].name.clone())
        } else {
            None
        };
        self.tree_loading = true;
        self.tree_nav.reset();
        self.nav.view = View::Tree;
        self.nav.selected_idx = 0;
        self.push_cmd(Command::OpenTree { apps });
    }

    /// Leave the tree view, cancelling all watchers.
    pub(crate) fn leave_tree(&mut self) {
        self.tree.clear_filter();
        self.tree.clear_selection();
        self.push_cmd(Command::CloseTree);
        self.ui.tree_app_name = None;
        self.tree_loading = false;
        self.nav.view = View::Apps;
        self.clamp_selection();
    }

    /// App owning the tree view: the single open app, or the cursor's app.
    pub(crate) fn tree_app(&self) -> Option<AppItem> {
        let name = self
            .ui
            .tree_app_name
            .clone()
            .or_else(|| self.tree.selected_app_name())
            .or_else(|| self.tree.first_app_name())?;
        self.find_app(&name).cloned().or(Some(AppItem {
            name,
            app_namespace: None,
            project: String::new(),
            namespace: String::new(),
            cluster_label: String::new(),
            cluster_id: None,
            sync_status: String::new(),
            health_status: String::new(),
            app_set: None,
            last_synced_at: None,
        }))
    }

    // ----- Theme handling -----

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub(crate) fn apply_theme_preview(&mut self, name: &str) {
        if let Ok(theme) = Theme::named(name) {
            self.theme = theme;
            self.theme_name = name.to_string();
        }
    }

    // ----- Message handling -----

    /// Apply one message from the event plane. Stale sessions are dropped.
    pub fn handle_msg(&mut self, msg: AppMsg) {
        match msg {
            AppMsg::AppsLoaded { result } => match result {
                Ok(apps) => {
                    let count = apps.len();
                    self.apps = apps;
                    self.apps_loaded = true;
                    self.prune_hidden_selected_apps();
                    self.clamp_selection();
                    self.set_status(format!("Loaded {} applications", count));
                }
                Err(e) => self.enter_error_mode(e.kind, e.message),
            },
            AppMsg::AppUpserted { app } => {
                let name = app.name.clone();
                match self.apps.iter_mut().find(|a| a.name == name) {
                    Some(existing) => *existing = app.clone(),
                    None => self.apps.push(app.clone()),
                }
                self.apps.sort_by(|a, b| a.name.cmp(&b.name));
                if self.nav.view == View::Tree {
                    self.tree
                        .set_app_meta(&name, &app.health_status, &app.sync_status);
                }
                self.clamp_selection();
            }
            AppMsg::AppRemoved { name } => {
                self.apps.retain(|a| a.name != name);
                self.selections.selected_apps.remove(&name);
                if self.nav.view == View::Tree {
                    self.tree.remove_app(&name);
                }
                self.clamp_selection();
            }
            AppMsg::AppsWatchError { error } => match error.kind {
                MsgErrorKind::Auth => self.enter_error_mode(error.kind, error.message),
                MsgErrorKind::Connection => self.enter_error_mode(error.kind, error.message),
                MsgErrorKind::Other => self.set_status(error.message),
            },

            AppMsg::TreeSnapshot { session, app, tree } => {
                if session != self.tree_session || self.nav.view != View::Tree {
                    return;
                }
                if let Some(item) = self.find_app(&app) {
                    let (health, sync) =
                        (item.health_status.clone(), item.sync_status.clone());
                    self.tree.set_app_meta(&app, &health, &sync);
                }
                self.tree.upsert_app_tree(&app, &tree);
                self.tree_loading = false;
                self.sync_tree_nav();
            }
            AppMsg::TreeStatuses {
                session,
                app,
                statuses,
            } => {
                if session != self.tree_session || self.nav.view != View::Tree {
                    return;
                }
                self.tree.set_resource_statuses(&app, &statuses);
            }
            AppMsg::TreeWatchError {
                session,
                app,
                message,
            } => {
                if session != self.tree_session {
                    return;
                }
                self.set_status(format!("Watch error for {}: {}", app, message));
            }

            AppMsg::SyncDone {
                session,
                synced,
                result,
            } => {
                let Some(modal) = self.modals.confirm_sync.as_mut() else {
                    return;
                };
                if modal.session != session {
                    return;
                }
                match result {
                    Ok(()) => {
                        let watch = modal.watch;
                        self.modals.confirm_sync = None;
                        self.mode = Mode::Normal;
                        self.set_status(format!("Sync started for {} app(s)", synced.len()));
                        if watch {
                            let apps: Vec<AppItem> = synced
                                .iter()
                                .filter_map(|n| self.find_app(n).cloned())
                                .collect();
                            if !apps.is_empty() {
                                self.open_resources(apps);
                            }
                        }
                    }
                    Err(e) => {
                        modal.loading = false;
                        modal.error = Some(e.message);
                    }
                }
            }
            AppMsg::ResourceSyncDone { session, result } => {
                let Some(modal) = self.modals.resource_sync.as_mut() else {
                    return;
                };
                if modal.session != session {
                    return;
                }
                match result {
                    Ok(()) => {
                        let count = modal.targets.len();
                        self.modals.resource_sync = None;
                        self.mode = Mode::Normal;
                        self.set_status(format!("Sync started for {} resource(s)", count));
                    }
                    Err(e) => {
                        modal.loading = false;
                        modal.error = Some(e.message);
                    }
                }
            }
            AppMsg::HistoryLoaded { session, result } => {
                let Some(rb) = self.rollback.as_mut() else {
                    return;
                };
                if rb.session != session {
                    return;
                }
                rb.loading = false;
                match result {
                    Ok(rows) => {
                        rb.rows = rows;
                        rb.selected_idx = 0;
                        rb.phase = RollbackPhase::List;
                        self.rollback_nav.reset();
                        self.rollback_nav.set_item_count(
                            self.rollback.as_ref().map(|r| r.rows.len()).unwrap_or(0),
                        );
                    }
                    Err(e) => rb.error = Some(e.message),
                }
            }
            AppMsg::RollbackDone { session, result } => {
                let Some(rb) = self.rollback.as_mut() else {
                    return;
                };
                if rb.session != session {
                    return;
                }
                match result {
                    Ok(()) => {
                        let app = rb.app_name.clone();
                        self.rollback = None;
                        self.mode = Mode::Normal;
                        self.set_status(format!("Rollback started for {}", app));
                    }
                    Err(e) => {
                        rb.loading = false;
                        rb.error = Some(e.message);
                    }
                }
            }
            AppMsg::AppsDeleted { session, result } => {
                let Some(modal) = self.modals.app_delete.as_mut() else {
                    return;
                };
                if modal.session != session {
                    return;
                }
                match result {
                    Ok(()) => {
                        self.modals.app_delete = None;
                        self.mode = Mode::Normal;
                        self.selections.selected_apps.clear();
                        self.set_status("Delete requested");
                    }
                    Err(e) => {
                        modal.loading = false;
                        modal.error = Some(e.message);
                    }
                }
            }
            AppMsg::ResourcesDeleted { session, result } => {
                let Some(modal) = self.modals.resource_delete.as_mut() else {
                    return;
                };
                if modal.session != session {
                    return;
                }
                match result {
                    Ok(()) => {
                        let count = modal.targets.len();
                        self.modals.resource_delete = None;
                        self.mode = Mode::Normal;
                        self.tree.clear_selection();
                        self.set_status(format!("Delete requested for {} resource(s)", count));
                    }
                    Err(e) => {
                        modal.loading = false;
                        modal.error = Some(e.message);
                    }
                }
            }
            AppMsg::RefreshDone { result } => match result {
                Ok(count) => {
                    self.set_status(format!("Refreshed {} application(s)", count));
                    if self.nav.view == View::Tree {
                        self.tree.set_flash_all(true);
                        self.flash_until = Some(Instant::now() + FLASH_DURATION);
                    }
                }
                Err(e) => self.set_status(format!("Refresh failed: {}", e.message)),
            },
            AppMsg::DiffReady {
                session,
                title,
                result,
            } => {
                let Some(diff) = self.diff.as_mut() else {
                    return;
                };
                if diff.session != session {
                    return;
                }
                match result {
                    Ok(lines) if lines.is_empty() => {
                        self.diff = None;
                        self.mode = Mode::NoDiff;
                    }
                    Ok(lines) => {
                        diff.title = title;
                        diff.lines = lines;
                        diff.loading = false;
                        self.diff_scroll = 0;
                        self.mode = Mode::Diff;
                    }
                    Err(e) => {
                        self.diff = None;
                        self.mode = Mode::Normal;
                        self.set_status(format!("Diff failed: {}", e.message));
                    }
                }
            }
            AppMsg::UpgradeChecked { result } => match result {
                Ok(latest) => {
                    let is_current = latest.is_none();
                    self.modals.upgrade = Some(super::state::UpgradeState {
                        current: env!("CARGO_PKG_VERSION").to_string(),
                        latest,
                    });
                    self.mode = if is_current {
                        Mode::UpgradeSuccess
                    } else {
                        Mode::Upgrade
                    };
                }
                Err(e) => {
                    self.modals.upgrade_error = Some(e);
                    self.mode = Mode::UpgradeError;
                }
            },
            AppMsg::Status { message } => self.set_status(message),
        }
    }

    fn enter_error_mode(&mut self, kind: MsgErrorKind, message: String) {
        // Failing before anything loaded is a fatal startup error; the
        // process exits non-zero once the user quits out of the modal
        if !self.apps_loaded {
            self.fatal_error = Some(message.clone());
        }
        self.modals.error_message = Some(message);
        self.mode = match kind {
            MsgErrorKind::Auth => Mode::AuthRequired,
            MsgErrorKind::Connection => Mode::ConnectionError,
            MsgErrorKind::Other => Mode::Error,
        };
    }

    /// The startup failure to report on exit, if apps never loaded.
    pub fn fatal_error(&self) -> Option<&str> {
        if self.apps_loaded {
            None
        } else {
            self.fatal_error.as_deref()
        }
    }

    /// Adopt the watch coordinator's session after tree watchers start or
    /// stop; messages carrying any other session are dropped.
    pub fn set_tree_session(&mut self, session: u64) {
        self.tree_session = session;
    }

    /// Surface a k9s launch failure as the K9sError modal.
    pub fn report_k9s_error(&mut self, message: String) {
        self.modals.k9s_error = Some(message);
        self.mode = Mode::K9sError;
    }

    /// Status-line feedback from the event loop.
    pub fn report_status(&mut self, message: String) {
        self.set_status(message);
    }

    /// Keep the tree navigator in sync with the tree's visible rows.
    pub(crate) fn sync_tree_nav(&mut self) {
        self.tree_nav.set_item_count(self.tree.visible_count());
        self.tree_nav.set_cursor(self.tree.selected_index());
    }
}
