//! Keyboard event handling
//!
//! Single entry point for keystrokes. Evaluation order: kill switch, escape
//! debounce, centralized list navigation, then the active mode's key table,
//! then the view-specific fallthrough for Normal mode.

use super::core::App;
use super::state::{
    AppDeleteState, ConfirmSyncState, K9sPendingState, Mode, ResourceDeleteState,
    ResourceSyncState, RollbackPhase, RollbackState, View, MULTI_TARGET,
};
use crate::api::AppItem;
use crate::services::NavigationService;
use crate::tui::app::async_ops::{Command, DiffScope, ExternalRequest};
use crate::tui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

const ESCAPE_DEBOUNCE: Duration = Duration::from_millis(100);
const Z_CHORD_WINDOW: Duration = Duration::from_millis(500);

/// Panels whose movement keys route through a shared navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavPanel {
    List,
    Tree,
    ThemeList,
    RollbackRows,
    Diff,
    K9sContexts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavKey {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

fn nav_key(key: &KeyEvent) -> Option<NavKey> {
    match key.code {
        KeyCode::Up => Some(NavKey::Up),
        KeyCode::Down => Some(NavKey::Down),
        KeyCode::PageUp => Some(NavKey::PageUp),
        KeyCode::PageDown => Some(NavKey::PageDown),
        KeyCode::Char('k') => Some(NavKey::Up),
        KeyCode::Char('j') => Some(NavKey::Down),
        KeyCode::Char('g') => Some(NavKey::Top),
        KeyCode::Char('G') => Some(NavKey::Bottom),
        _ => None,
    }
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

impl App {
    /// Main keyboard entry point. Returns Some(true) to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<bool> {
        self.handle_key_at(key, Instant::now())
    }

    /// Same as [`App::handle_key`] with an explicit clock, so chord and
    /// debounce windows are testable.
    pub fn handle_key_at(&mut self, key: KeyEvent, now: Instant) -> Option<bool> {
        // Kill switch: Ctrl+C always quits, regardless of mode
        if is_ctrl(&key, 'c') {
            return Some(true);
        }

        // Escape debounce: drop rapid consecutive Escapes
        if key.code == KeyCode::Esc {
            if let Some(last) = self.nav.last_esc {
                if now.duration_since(last) < ESCAPE_DEBOUNCE {
                    return None;
                }
            }
            self.nav.last_esc = Some(now);
        }

        // Transient status messages last until the next interaction
        if self.mode == Mode::Normal {
            self.ui.status = None;
        }

        // Centralized list navigation for every panel that scrolls
        if let Some(nk) = nav_key(&key) {
            if let Some(panel) = self.navigator_panel() {
                self.execute_navigation(panel, nk);
                return None;
            }
        }

        // Mode-specific key tables
        match self.mode {
            Mode::Normal => {}
            Mode::Search => return self.handle_search_keys(key),
            Mode::Command => return self.handle_command_keys(key),
            Mode::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
                    self.mode = Mode::Normal;
                }
                return None;
            }
            Mode::Theme => return self.handle_theme_keys(key),
            Mode::ConfirmSync => return self.handle_confirm_sync_keys(key),
            Mode::Rollback => return self.handle_rollback_keys(key),
            Mode::ConfirmAppDelete => return self.handle_app_delete_keys(key),
            Mode::ConfirmResourceDelete => return self.handle_resource_delete_keys(key),
            Mode::ConfirmResourceSync => return self.handle_resource_sync_keys(key),
            Mode::Diff => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                    self.diff = None;
                    self.diff_scroll = 0;
                    self.mode = Mode::Normal;
                }
                return None;
            }
            Mode::NoDiff => {
                // Any key closes the modal
                self.mode = Mode::Normal;
                return None;
            }
            Mode::K9sContextSelect => return self.handle_k9s_select_keys(key),
            Mode::K9sError => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                    self.modals.k9s_error = None;
                    self.mode = Mode::Normal;
                }
                return None;
            }
            Mode::DefaultViewWarning => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                    self.modals.default_view_warning = None;
                    self.mode = Mode::Normal;
                }
                return None;
            }
            Mode::Error => return self.handle_error_keys(key),
            Mode::ConnectionError => return self.handle_connection_error_keys(key),
            Mode::AuthRequired => return self.handle_auth_required_keys(key),
            Mode::Upgrade | Mode::UpgradeError | Mode::UpgradeSuccess => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                    self.modals.upgrade = None;
                    self.modals.upgrade_error = None;
                    self.mode = Mode::Normal;
                }
                return None;
            }
            Mode::CoreDetected => {
                // Read-only warning: quitting is the only way out, and the
                // command line stays disabled
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                    return Some(true);
                }
                return None;
            }
        }

        // Normal mode: tree-view keys first, then the list-view table
        if self.nav.view == View::Tree {
            return self.handle_tree_keys(key, now);
        }
        self.handle_list_keys(key, now)
    }

    // ----- Centralized navigation -----

    fn navigator_panel(&self) -> Option<NavPanel> {
        match self.mode {
            Mode::Normal => {
                if self.nav.view == View::Tree {
                    Some(NavPanel::Tree)
                } else {
                    Some(NavPanel::List)
                }
            }
            Mode::Theme => Some(NavPanel::ThemeList),
            Mode::Rollback => {
                let rb = self.rollback.as_ref()?;
                if !rb.loading && rb.phase == RollbackPhase::List {
                    Some(NavPanel::RollbackRows)
                } else {
                    None
                }
            }
            Mode::Diff => Some(NavPanel::Diff),
            Mode::K9sContextSelect => Some(NavPanel::K9sContexts),
            _ => None,
        }
    }

    fn execute_navigation(&mut self, panel: NavPanel, key: NavKey) {
        match panel {
            NavPanel::List => {
                let count = self.visible_items().len();
                let height = self.list_viewport_height();
                self.list_nav.set_item_count(count);
                self.list_nav.set_viewport_height(height);
                Self::apply_nav_key(&mut self.list_nav, key);
                self.nav.selected_idx = self.list_nav.cursor();
            }
            NavPanel::Tree => {
                let height = self.tree_viewport_height();
                self.tree_nav.set_item_count(self.tree.visible_count());
                self.tree_nav.set_viewport_height(height);
                Self::apply_nav_key(&mut self.tree_nav, key);
                self.tree.set_selected_index(self.tree_nav.cursor());
            }
            NavPanel::ThemeList => {
                self.theme_nav.set_item_count(Theme::available().len());
                self.theme_nav.set_viewport_height(self.theme_page_size());
                Self::apply_nav_key(&mut self.theme_nav, key);
                let name = Theme::available()[self.theme_nav.cursor()];
                self.apply_theme_preview(name);
            }
            NavPanel::RollbackRows => {
                let count = self.rollback.as_ref().map(|r| r.rows.len()).unwrap_or(0);
                self.rollback_nav.set_item_count(count);
                self.rollback_nav
                    .set_viewport_height(self.rollback_page_size());
                Self::apply_nav_key(&mut self.rollback_nav, key);
                if let Some(rb) = self.rollback.as_mut() {
                    rb.selected_idx = self.rollback_nav.cursor();
                }
            }
            NavPanel::Diff => {
                let line_count = self.diff.as_ref().map(|d| d.lines.len()).unwrap_or(0);
                let page = self.diff_page_size();
                let max_scroll = line_count.saturating_sub(1);
                self.diff_scroll = match key {
                    NavKey::Up => self.diff_scroll.saturating_sub(1),
                    NavKey::Down => (self.diff_scroll + 1).min(max_scroll),
                    NavKey::PageUp => self.diff_scroll.saturating_sub(page),
                    NavKey::PageDown => (self.diff_scroll + page).min(max_scroll),
                    NavKey::Top => 0,
                    NavKey::Bottom => max_scroll,
                };
            }
            NavPanel::K9sContexts => {
                let count = self
                    .modals
                    .k9s_pending
                    .as_ref()
                    .map(|k| k.contexts.len())
                    .unwrap_or(0);
                self.k9s_nav.set_item_count(count);
                self.k9s_nav.set_viewport_height(10);
                Self::apply_nav_key(&mut self.k9s_nav, key);
                if let Some(k9s) = self.modals.k9s_pending.as_mut() {
                    k9s.selected = self.k9s_nav.cursor();
                }
            }
        }
    }

    fn apply_nav_key(nav: &mut crate::tui::navigator::ListNavigator, key: NavKey) {
        match key {
            NavKey::Up => nav.move_up(),
            NavKey::Down => nav.move_down(),
            NavKey::PageUp => nav.page_up(),
            NavKey::PageDown => nav.page_down(),
            NavKey::Top => nav.jump_top(),
            NavKey::Bottom => nav.jump_bottom(),
        }
    }

    // ----- Search / command editors -----

    fn handle_search_keys(&mut self, key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Esc => {
                self.ui.search_query.clear();
                if self.nav.view == View::Tree {
                    self.tree.clear_filter();
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                if self.nav.view == View::Tree {
                    self.tree.jump_to_first_match();
                    self.sync_tree_nav();
                } else {
                    self.ui.active_filter = self.ui.search_query.clone();
                    self.nav.selected_idx = 0;
                    self.list_nav.reset();
                }
                self.ui.search_query.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Backspace => {
                self.ui.search_query.pop();
                self.apply_live_search();
            }
            KeyCode::Char(c) => {
                self.ui.search_query.push(c);
                self.apply_live_search();
            }
            _ => {}
        }
        None
    }

    fn apply_live_search(&mut self) {
        if self.nav.view == View::Tree {
            let query = self.ui.search_query.clone();
            self.tree.set_filter(&query);
            self.tree.jump_to_first_match();
            self.sync_tree_nav();
        } else {
            self.nav.selected_idx = 0;
            self.list_nav.reset();
        }
    }

    fn handle_command_keys(&mut self, key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Esc => {
                self.ui.command.clear();
                self.ui.command_history_idx = None;
                self.mode = Mode::Normal;
                None
            }
            KeyCode::Enter => {
                let command = self.ui.command.trim().to_string();
                self.ui.command.clear();
                self.ui.command_history_idx = None;
                self.mode = Mode::Normal;
                if command.is_empty() {
                    return None;
                }
                if self.ui.command_history.last() != Some(&command) {
                    self.ui.command_history.push(command.clone());
                }
                self.execute_command(&command)
            }
            KeyCode::Up => {
                // Walk back through command history
                let len = self.ui.command_history.len();
                if len == 0 {
                    return None;
                }
                let idx = match self.ui.command_history_idx {
                    None => len - 1,
                    Some(i) => i.saturating_sub(1),
                };
                self.ui.command_history_idx = Some(idx);
                self.ui.command = self.ui.command_history[idx].clone();
                None
            }
            KeyCode::Down => {
                let len = self.ui.command_history.len();
                match self.ui.command_history_idx {
                    Some(i) if i + 1 < len => {
                        self.ui.command_history_idx = Some(i + 1);
                        self.ui.command = self.ui.command_history[i + 1].clone();
                    }
                    Some(_) => {
                        self.ui.command_history_idx = None;
                        self.ui.command.clear();
                    }
                    None => {}
                }
                None
            }
            KeyCode::Backspace => {
                self.ui.command.pop();
                None
            }
            KeyCode::Char(c) => {
                self.ui.command.push(c);
                None
            }
            _ => None,
        }
    }

    // ----- Theme picker -----

    pub(crate) fn enter_theme_mode(&mut self) {
        self.ui.theme_original = Some(self.theme_name.clone());
        let idx = Theme::available()
            .iter()
            .position(|n| *n == self.theme_name)
            .unwrap_or(0);
        self.theme_nav.set_item_count(Theme::available().len());
        self.theme_nav.set_cursor(idx);
        self.mode = Mode::Theme;
    }

    fn handle_theme_keys(&mut self, key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                // Restore the theme that was active before the preview
                if let Some(original) = self.ui.theme_original.take() {
                    self.apply_theme_preview(&original);
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                let name = self.theme_name.clone();
                if let Err(e) = crate::config::ConfigLoader::persist_theme(&name) {
                    self.set_status(format!("Failed to save theme: {}", e));
                } else {
                    self.set_status(format!("Theme changed to {}", name));
                }
                self.ui.theme_original = None;
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        None
    }

    // ----- Sync confirmation -----

    pub(crate) fn open_sync_modal(&mut self) {
        if self.nav.view != View::Apps {
            self.set_status("Navigate to apps view to sync applications");
            return;
        }
        let target = if self.selections.selected_apps.is_empty() {
            match self.current_app() {
                Some(app) => app.name,
                None => {
                    self.set_status("No applications visible to sync");
                    return;
                }
            }
        } else {
            MULTI_TARGET.to_string()
        };
        let session = self.next_session();
        self.modals.confirm_sync = Some(ConfirmSyncState::new(target, session));
        self.mode = Mode::ConfirmSync;
    }

    fn handle_confirm_sync_keys(&mut self, key: KeyEvent) -> Option<bool> {
        let Some(modal) = self.modals.confirm_sync.as_mut() else {
            self.mode = Mode::Normal;
            return None;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.modals.confirm_sync = None;
                self.mode = Mode::Normal;
            }
            KeyCode::Left | KeyCode::Char('h') => modal.selected_button = 0,
            KeyCode::Right | KeyCode::Char('l') => modal.selected_button = 1,
            KeyCode::Char('p') => modal.prune = !modal.prune,
            KeyCode::Char('w') => modal.watch = !modal.watch,
            KeyCode::Enter if modal.selected_button == 1 => {
                self.modals.confirm_sync = None;
                self.mode = Mode::Normal;
            }
            KeyCode::Enter | KeyCode::Char('y') => self.execute_sync(),
            _ => {}
        }
        None
    }

    fn execute_sync(&mut self) {
        let Some(modal) = self.modals.confirm_sync.as_mut() else {
            return;
        };
        let targets: Vec<(String, Option<String>)> = if modal.target == MULTI_TARGET {
            self.apps
                .iter()
                .filter(|a| self.selections.selected_apps.contains(&a.name))
                .map(|a| (a.name.clone(), a.app_namespace.clone()))
                .collect()
        } else {
            let ns = self
                .apps
                .iter()
                .find(|a| a.name == modal.target)
                .and_then(|a| a.app_namespace.clone());
            vec![(modal.target.clone(), ns)]
        };
        if targets.is_empty() {
            self.modals.confirm_sync = None;
            self.mode = Mode::Normal;
            self.set_status("No applications to sync");
            return;
        }
        let modal = self.modals.confirm_sync.as_mut().unwrap();
        modal.loading = true;
        modal.error = None;
        let session = modal.session;
        let prune = modal.prune;
        self.push_cmd(Command::Sync {
            session,
            targets,
            prune,
        });
    }

    // ----- Rollback -----

    pub(crate) fn open_rollback(&mut self) {
        if self.nav.view != View::Apps {
            return;
        }
        let app = match self.selections.selected_apps.len() {
            0 => self.current_app(),
            1 => {
                let name = self.selections.selected_apps.iter().next().cloned();
                name.and_then(|n| self.find_app(&n).cloned())
            }
            _ => {
                self.set_status("Rollback not supported for multiple apps");
                return;
            }
        };
        let Some(app) = app else {
            self.set_status("No app selected for rollback");
            return;
        };
        let session = self.next_session();
        self.rollback = Some(RollbackState::new(
            app.name.clone(),
            app.app_namespace.clone(),
            session,
        ));
        self.rollback_nav.reset();
        self.mode = Mode::Rollback;
        tracing::info!(app = %app.name, "starting rollback session");
        self.push_cmd(Command::FetchHistory {
            session,
            app: app.name,
            app_ns: app.app_namespace,
        });
    }

    fn handle_rollback_keys(&mut self, key: KeyEvent) -> Option<bool> {
        // Exit is allowed even while history is loading
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
            self.rollback = None;
            self.mode = Mode::Normal;
            return None;
        }
        let Some(rb) = self.rollback.as_mut() else {
            return None;
        };
        if rb.loading {
            return None;
        }
        match rb.phase {
            RollbackPhase::List => match key.code {
                KeyCode::Enter => {
                    if !rb.rows.is_empty() {
                        rb.phase = RollbackPhase::Confirm;
                        rb.confirm_selected = 0;
                    }
                }
                KeyCode::Char('d') => {
                    // Revision diff from the history list is not wired up yet;
                    // deliberate no-op so the key doesn't fall through
                }
                _ => {}
            },
            RollbackPhase::Confirm => match key.code {
                KeyCode::Char('p') => rb.prune = !rb.prune,
                KeyCode::Char('w') => rb.watch = !rb.watch,
                KeyCode::Left | KeyCode::Char('h') => rb.confirm_selected = 0,
                KeyCode::Right | KeyCode::Char('l') => rb.confirm_selected = 1,
                KeyCode::Enter => {
                    if rb.confirm_selected == 1 {
                        self.rollback = None;
                        self.mode = Mode::Normal;
                        return None;
                    }
                    if let Some(row) = rb.rows.get(rb.selected_idx) {
                        let cmd = Command::ExecuteRollback {
                            session: rb.session,
                            app: rb.app_name.clone(),
                            app_ns: rb.app_namespace.clone(),
                            id: row.id,
                            prune: rb.prune,
                            dry_run: rb.dry_run,
                        };
                        rb.loading = true;
                        rb.error = None;
                        self.push_cmd(cmd);
                    }
                }
                _ => {}
            },
        }
        None
    }

    // ----- App delete -----

    pub(crate) fn open_app_delete(&mut self) {
        if self.nav.view != View::Apps {
            return;
        }
        let session = self.next_session();
        if self.selections.selected_apps.is_empty() {
            let Some(app) = self.current_app() else {
                return;
            };
            self.modals.app_delete = Some(AppDeleteState::new(
                app.name,
                app.app_namespace,
                session,
            ));
        } else {
            self.modals.app_delete =
                Some(AppDeleteState::new(MULTI_TARGET.to_string(), None, session));
        }
        self.mode = Mode::ConfirmAppDelete;
    }

    fn handle_app_delete_keys(&mut self, key: KeyEvent) -> Option<bool> {
        let Some(modal) = self.modals.app_delete.as_mut() else {
            self.mode = Mode::Normal;
            return None;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.modals.app_delete = None;
                self.mode = Mode::Normal;
            }
            KeyCode::Char('c') => modal.cascade = !modal.cascade,
            KeyCode::Char('p') => modal.policy = modal.policy.next(),
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let targets: Vec<(String, Option<String>)> = if modal.target == MULTI_TARGET {
                    self.apps
                        .iter()
                        .filter(|a| self.selections.selected_apps.contains(&a.name))
                        .map(|a| (a.name.clone(), a.app_namespace.clone()))
                        .collect()
                } else {
                    vec![(modal.target.clone(), modal.app_namespace.clone())]
                };
                let modal = self.modals.app_delete.as_mut().unwrap();
                modal.loading = true;
                modal.error = None;
                let cmd = Command::DeleteApps {
                    session: modal.session,
                    targets,
                    cascade: modal.cascade,
                    policy: modal.policy.as_str().to_string(),
                };
                self.push_cmd(cmd);
            }
            _ => {}
        }
        None
    }

    // ----- Resource delete (tree view) -----

    pub(crate) fn open_resource_delete(&mut self) {
        if self.nav.view != View::Tree {
            return;
        }
        // Cursor on a Missing resource with no multi-selection: silent drop
        if !self.tree.has_selection() && self.tree.current_resource_is_missing() {
            return;
        }
        let selections = self.tree.get_selected_resources();
        // Missing resources are already gone upstream; drop them silently
        let targets: Vec<_> = selections.into_iter().filter(|s| !s.is_missing()).collect();
        if targets.is_empty() {
            return;
        }
        let app_name = targets[0].app_name.clone();
        let session = self.next_session();
        self.modals.resource_delete =
            Some(ResourceDeleteState::new(app_name, targets, session));
        self.mode = Mode::ConfirmResourceDelete;
    }

    fn handle_resource_delete_keys(&mut self, key: KeyEvent) -> Option<bool> {
        let Some(modal) = self.modals.resource_delete.as_mut() else {
            self.mode = Mode::Normal;
            return None;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.modals.resource_delete = None;
                self.mode = Mode::Normal;
            }
            KeyCode::Char('c') => modal.cascade = !modal.cascade,
            KeyCode::Char('p') => modal.policy = modal.policy.next(),
            KeyCode::Char('f') => modal.force = !modal.force,
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                modal.loading = true;
                modal.error = None;
                let cmd = Command::DeleteResources {
                    session: modal.session,
                    targets: modal.targets.iter().map(|t| t.to_resource_ref()).collect(),
                    policy: modal.policy.as_str().to_string(),
                    force: modal.force,
                };
                self.push_cmd(cmd);
            }
            _ => {}
        }
        None
    }

    // ----- Resource sync (tree view) -----

    pub(crate) fn open_resource_sync(&mut self) {
        if self.nav.view != View::Tree {
            return;
        }
        let selections = self.tree.get_selected_resources();
        if selections.is_empty() {
            // Cursor on the Application root: fall back to a full app sync
            if let Some(app) = self.tree_app() {
                let session = self.next_session();
                self.modals.confirm_sync = Some(ConfirmSyncState::new(app.name, session));
                self.mode = Mode::ConfirmSync;
            }
            return;
        }
        // Missing resources stay in: syncing recreates them from git
        let app_name = selections[0].app_name.clone();
        let session = self.next_session();
        self.modals.resource_sync =
            Some(ResourceSyncState::new(app_name, selections, session));
        self.mode = Mode::ConfirmResourceSync;
    }

    fn handle_resource_sync_keys(&mut self, key: KeyEvent) -> Option<bool> {
        let Some(modal) = self.modals.resource_sync.as_mut() else {
            self.mode = Mode::Normal;
            return None;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.modals.resource_sync = None;
                self.mode = Mode::Normal;
            }
            KeyCode::Left | KeyCode::Char('h') => modal.selected_button = 0,
            KeyCode::Right | KeyCode::Char('l') => modal.selected_button = 1,
            KeyCode::Char('p') => modal.prune = !modal.prune,
            KeyCode::Char('f') => modal.force = !modal.force,
            KeyCode::Enter if modal.selected_button == 1 => {
                self.modals.resource_sync = None;
                self.mode = Mode::Normal;
            }
            KeyCode::Enter | KeyCode::Char('y') => {
                let app_name = modal.app_name.clone();
                let app_ns = self
                    .find_app(&app_name)
                    .and_then(|a| a.app_namespace.clone());
                let modal = self.modals.resource_sync.as_mut().unwrap();
                modal.loading = true;
                modal.error = None;
                let cmd = Command::SyncResources {
                    session: modal.session,
                    targets: modal.targets.iter().map(|t| t.to_resource_ref()).collect(),
                    app_ns,
                    prune: modal.prune,
                    force: modal.force,
                };
                self.push_cmd(cmd);
            }
            _ => {}
        }
        None
    }

    // ----- k9s -----

    fn handle_k9s_select_keys(&mut self, key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.modals.k9s_pending = None;
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                if let Some(k9s) = self.modals.k9s_pending.take() {
                    let context = k9s.contexts.get(k9s.selected).cloned();
                    self.mode = Mode::Normal;
                    self.push_cmd(Command::External(ExternalRequest::K9s {
                        context,
                        kind: k9s.kind,
                        namespace: k9s.namespace,
                        name: k9s.name,
                    }));
                } else {
                    self.mode = Mode::Normal;
                }
            }
            _ => {}
        }
        None
    }

    /// Launch k9s for the cursor resource, auto-detecting the context from
    /// the app's cluster id. Only an exact kubeconfig context match counts;
    /// "in-cluster" never auto-matches.
    pub(crate) fn open_k9s_for_tree_resource(&mut self) {
        let Some((_, kind, namespace, name)) = self.tree.selected_resource() else {
            self.set_status("No resource selected");
            return;
        };
        if kind == "Application" {
            self.open_k9s_for_application(&name);
            return;
        }
        let context = self
            .tree_app()
            .and_then(|app| app.cluster_id)
            .filter(|id| id != "in-cluster")
            .and_then(|id| {
                crate::kubeconfig::KubeContexts::load()
                    .ok()
                    .and_then(|kc| kc.find_context_by_name(&id))
            });
        match context {
            Some(ctx) => self.push_cmd(Command::External(ExternalRequest::K9s {
                context: Some(ctx),
                kind,
                namespace,
                name,
            })),
            None => self.show_k9s_picker(kind, namespace, name),
        }
    }

    /// Launch k9s on the Application CR itself. The management cluster is
    /// never guessable from the destination, so the picker always opens.
    pub(crate) fn open_k9s_for_application(&mut self, app_name: &str) {
        let namespace = self
            .find_app(app_name)
            .and_then(|a| a.app_namespace.clone())
            .unwrap_or_else(|| "argocd".to_string());
        self.show_k9s_picker(
            "Application".to_string(),
            namespace,
            app_name.to_string(),
        );
    }

    fn show_k9s_picker(&mut self, kind: String, namespace: String, name: String) {
        let contexts = crate::kubeconfig::list_context_names().unwrap_or_default();
        if contexts.is_empty() {
            // No kubeconfig contexts: let k9s resolve its own default
            self.push_cmd(Command::External(ExternalRequest::K9s {
                context: None,
                kind,
                namespace,
                name,
            }));
            return;
        }
        let mut selected = 0;
        if let Ok(kc) = crate::kubeconfig::KubeContexts::load() {
            if let Some(current) = kc.current_context() {
                if let Some(idx) = contexts.iter().position(|c| c == current) {
                    selected = idx;
                }
            }
        }
        self.k9s_nav.set_item_count(contexts.len());
        self.k9s_nav.set_cursor(selected);
        self.modals.k9s_pending = Some(K9sPendingState {
            kind,
            namespace,
            name,
            contexts,
            selected,
        });
        self.mode = Mode::K9sContextSelect;
    }

    // ----- Error modes -----

    fn open_logs_pager(&mut self) {
        match crate::cli::read_log_content() {
            Some(content) => self.push_cmd(Command::External(ExternalRequest::Pager {
                title: "Logs".to_string(),
                content,
            })),
            None => self.set_status("No logs available"),
        }
    }

    fn handle_error_keys(&mut self, key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                // Nothing loaded yet means the startup failed outright
                if !self.apps_loaded {
                    return Some(true);
                }
                self.modals.error_message = None;
                self.mode = Mode::Normal;
                None
            }
            KeyCode::Char('l') => {
                self.modals.error_message = None;
                self.mode = Mode::Normal;
                self.open_logs_pager();
                None
            }
            _ => None,
        }
    }

    fn handle_connection_error_keys(&mut self, key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Char('q') => Some(true),
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                None
            }
            KeyCode::Char('l') => {
                self.open_logs_pager();
                None
            }
            _ => None,
        }
    }

    fn handle_auth_required_keys(&mut self, key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Char('q') => Some(true),
            KeyCode::Char('l') => {
                self.open_logs_pager();
                None
            }
            _ => None,
        }
    }

    // ----- Tree view fallthrough -----

    fn handle_tree_keys(&mut self, key: KeyEvent, _now: Instant) -> Option<bool> {
        if is_ctrl(&key, 'd') {
            self.open_resource_delete();
            return None;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.leave_tree();
            }
            KeyCode::Char('/') => {
                self.ui.search_query = self.tree.filter().to_string();
                self.mode = Mode::Search;
            }
            KeyCode::Char('n') => {
                if self.tree.match_count() > 0 {
                    self.tree.next_match();
                    self.sync_tree_nav();
                }
            }
            KeyCode::Char('N') => {
                if self.tree.match_count() > 0 {
                    self.tree.prev_match();
                    self.sync_tree_nav();
                }
            }
            KeyCode::Left if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.tree.collapse_all();
                self.sync_tree_nav();
            }
            KeyCode::Right if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.tree.expand_all();
                self.sync_tree_nav();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.tree.collapse_or_parent();
                self.sync_tree_nav();
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => {
                self.tree.expand_current();
                self.sync_tree_nav();
            }
            KeyCode::Char('H') => {
                self.tree.collapse_all();
                self.sync_tree_nav();
            }
            KeyCode::Char('L') => {
                self.tree.expand_all();
                self.sync_tree_nav();
            }
            KeyCode::Char('K') => self.open_k9s_for_tree_resource(),
            KeyCode::Char('d') => self.open_resource_diff(),
            KeyCode::Char(' ') => {
                if !self.tree.toggle_selection() && self.tree.current_resource_is_missing() {
                    self.set_status("Cannot select: resource is missing");
                }
            }
            KeyCode::Char('s') => self.open_resource_sync(),
            KeyCode::Char(':') => self.mode = Mode::Command,
            KeyCode::Char('?') => self.mode = Mode::Help,
            _ => {}
        }
        None
    }

    // ----- Normal list fallthrough -----

    fn handle_list_keys(&mut self, key: KeyEvent, now: Instant) -> Option<bool> {
        // Any key other than the chord pair breaks a pending Z chord
        if !matches!(key.code, KeyCode::Char('Z') | KeyCode::Char('Q')) {
            self.nav.last_z = None;
        }
        if is_ctrl(&key, 'd') {
            if self.nav.view == View::Apps {
                self.open_app_delete();
            }
            return None;
        }
        match key.code {
            KeyCode::Char(' ') => self.toggle_app_selection(),
            KeyCode::Enter => self.drill_down(),
            KeyCode::Char('/') => {
                self.ui.search_query.clear();
                self.mode = Mode::Search;
            }
            KeyCode::Char(':') => {
                self.ui.command.clear();
                self.ui.command_history_idx = None;
                self.mode = Mode::Command;
            }
            KeyCode::Char('?') => self.mode = Mode::Help,
            KeyCode::Char('s') => {
                if self.nav.view == View::Apps {
                    self.open_sync_modal();
                }
            }
            KeyCode::Char('r') => {
                if self.nav.view == View::Apps {
                    self.open_resources(self.checked_or_cursor_apps());
                }
            }
            KeyCode::Char('d') => {
                if self.nav.view == View::Apps {
                    self.open_app_diff();
                }
            }
            KeyCode::Char('K') => {
                if self.nav.view == View::Apps {
                    if let Some(app) = self.current_app() {
                        self.open_k9s_for_application(&app.name);
                    } else {
                        self.set_status("No application selected");
                    }
                }
            }
            KeyCode::Char('R') => {
                if self.nav.view == View::Apps {
                    self.open_rollback();
                }
            }
            KeyCode::Esc => self.handle_escape(),
            KeyCode::Char('Z') => {
                if let Some(last) = self.nav.last_z {
                    if now.duration_since(last) < Z_CHORD_WINDOW {
                        return Some(true);
                    }
                }
                self.nav.last_z = Some(now);
            }
            KeyCode::Char('Q') => {
                if let Some(last) = self.nav.last_z.take() {
                    if now.duration_since(last) < Z_CHORD_WINDOW {
                        return Some(true);
                    }
                }
            }
            _ => {}
        }
        None
    }

    fn toggle_app_selection(&mut self) {
        if self.nav.view != View::Apps {
            // Space has no effect on the scope list views
            return;
        }
        let Some(app) = self.current_app() else {
            return;
        };
        if !self.selections.selected_apps.remove(&app.name) {
            self.selections.selected_apps.insert(app.name);
        }
    }

    fn drill_down(&mut self) {
        if self.nav.view == View::Apps {
            self.open_resources(self.checked_or_cursor_apps());
            return;
        }
        let items = self.visible_items();
        let Some(entry) = items.get(self.nav.selected_idx) else {
            return;
        };
        let item = entry.label().to_string();
        let Some(result) =
            NavigationService::drill_down(self.nav.view, &item, &self.selections)
        else {
            return;
        };
        let prev_view = self.nav.view;
        if let Some(view) = result.new_view {
            self.nav.view = view;
        }
        if let Some(set) = result.scope_clusters {
            self.selections.scope_clusters = set;
        }
        if let Some(set) = result.scope_namespaces {
            self.selections.scope_namespaces = set;
        }
        if let Some(set) = result.scope_projects {
            self.selections.scope_projects = set;
        }
        if let Some(set) = result.scope_app_sets {
            self.selections.scope_app_sets = set;
        }
        if result.reset_navigation {
            self.nav.selected_idx = 0;
            self.ui.active_filter.clear();
            self.ui.search_query.clear();
            self.list_nav.reset();
        }
        if result.clear_lower_level_selections {
            NavigationService::clear_lower_level_selections(prev_view, &mut self.selections);
        }
        self.prune_hidden_selected_apps();
        self.maybe_restart_watch_for_scope();
    }

    /// Escape in Normal mode: clear the filter first in Apps, then drill the
    /// hierarchy upward clearing this level's and the prior level's scopes.
    pub(crate) fn handle_escape(&mut self) {
        let view = self.nav.view;

        if view == View::Apps
            && (!self.ui.active_filter.is_empty() || !self.ui.search_query.is_empty())
        {
            self.ui.active_filter.clear();
            self.ui.search_query.clear();
            self.clamp_selection();
            return;
        }

        self.ui.active_filter.clear();
        self.ui.search_query.clear();
        self.ui.command.clear();

        match view {
            View::Tree => {
                self.leave_tree();
                self.nav.selected_idx = NavigationService::validate_bounds(
                    self.nav.selected_idx,
                    self.visible_items().len(),
                );
            }
            View::Apps => {
                if !self.selections.scope_app_sets.is_empty() {
                    self.selections.selected_apps.clear();
                    self.selections.scope_app_sets.clear();
                    self.nav.view = View::ApplicationSets;
                } else {
                    self.selections.selected_apps.clear();
                    self.selections.scope_projects.clear();
                    self.nav.view = View::Projects;
                }
                self.nav.selected_idx = 0;
                self.list_nav.reset();
            }
            View::ApplicationSets => {
                self.selections.scope_app_sets.clear();
                self.nav.selected_idx = 0;
                self.list_nav.reset();
            }
            View::Projects => {
                self.selections.scope_projects.clear();
                self.selections.scope_namespaces.clear();
                self.nav.view = View::Namespaces;
                self.nav.selected_idx = 0;
                self.list_nav.reset();
            }
            View::Namespaces => {
                self.selections.scope_namespaces.clear();
                self.selections.scope_clusters.clear();
                self.nav.view = View::Clusters;
                self.nav.selected_idx = 0;
                self.list_nav.reset();
            }
            View::Clusters => {
                self.selections.scope_clusters.clear();
                self.nav.selected_idx = 0;
                self.list_nav.reset();
            }
        }
        self.prune_hidden_selected_apps();
        self.maybe_restart_watch_for_scope();
    }

    // ----- Diff -----

    pub(crate) fn open_app_diff(&mut self) {
        let checked: Vec<&String> = self.selections.selected_apps.iter().collect();
        let app = match checked.len() {
            0 => self.current_app(),
            1 => self.find_app(checked[0]).cloned(),
            _ => {
                self.set_status("Cannot show diff for multiple apps");
                return;
            }
        };
        let Some(app) = app else {
            self.set_status("No app selected for diff");
            return;
        };
        self.start_diff(
            format!("Diff: {}", app.name),
            DiffScope::App {
                name: app.name,
                app_ns: app.app_namespace,
            },
        );
    }

    pub(crate) fn open_resource_diff(&mut self) {
        let Some((group, kind, namespace, name)) = self.tree.selected_resource() else {
            return;
        };
        if kind == "Application" {
            let Some(app) = self.find_app(&name).cloned() else {
                self.set_status("Could not determine application name");
                return;
            };
            self.start_diff(
                format!("Diff: {}", app.name),
                DiffScope::App {
                    name: app.name,
                    app_ns: app.app_namespace,
                },
            );
            return;
        }
        let Some(app) = self.tree_app() else {
            self.set_status("Could not determine application name");
            return;
        };
        self.start_diff(
            format!("Diff: {}/{}", kind, name),
            DiffScope::Resource {
                app: app.name.clone(),
                app_ns: app.app_namespace,
                target: crate::api::ResourceRef {
                    app_name: app.name,
                    group,
                    version: String::new(),
                    kind,
                    namespace,
                    name,
                },
            },
        );
    }

    fn start_diff(&mut self, title: String, scope: DiffScope) {
        let session = self.next_session();
        self.diff = Some(super::state::DiffState {
            title: title.clone(),
            lines: Vec::new(),
            loading: true,
            session,
        });
        self.push_cmd(Command::Diff {
            session,
            title,
            scope,
        });
    }

    // ----- Refresh -----

    /// The :refresh / :refresh! command. In the tree view the parent app is
    /// refreshed; in the apps view the explicit argument, the checked set,
    /// or the cursor app.
    pub(crate) fn refresh_command(&mut self, arg: Option<&str>, hard: bool) {
        if self.nav.view == View::Tree {
            let Some(app) = self.tree_app() else {
                self.set_status("No application in tree view to refresh");
                return;
            };
            self.push_cmd(Command::Refresh {
                targets: vec![(app.name, app.app_namespace)],
                hard,
            });
            return;
        }

        if self.nav.view != View::Apps && arg.is_none() {
            self.set_status("Navigate to apps or tree view to refresh");
            return;
        }

        let targets: Vec<(String, Option<String>)> = match arg {
            Some(name) => match self.find_app(name) {
                Some(app) => vec![(app.name.clone(), app.app_namespace.clone())],
                None => {
                    self.set_status(format!("App not found: {}", name));
                    return;
                }
            },
            None => self
                .checked_or_cursor_apps()
                .into_iter()
                .map(|a| (a.name, a.app_namespace))
                .collect(),
        };
        if targets.is_empty() {
            self.set_status("No app selected for refresh");
            return;
        }
        self.push_cmd(Command::Refresh { targets, hard });
    }

    /// Resolve an optional command argument to apps, falling back to the
    /// cursor or checked apps.
    pub(crate) fn arg_or_selection(&mut self, arg: Option<&str>) -> Vec<AppItem> {
        match arg {
            Some(name) => match self.find_app(name) {
                Some(app) => vec![app.clone()],
                None => {
                    self.set_status(format!("App not found: {}", name));
                    Vec::new()
                }
            },
            None => self.checked_or_cursor_apps(),
        }
    }
}
