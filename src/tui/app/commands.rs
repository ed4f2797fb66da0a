//! Command line execution
//!
//! Parses and runs the `:` commands: view switches, actions with an optional
//! target app, and utility commands. Unknown commands and bad arguments set
//! a status message instead of changing mode.

use super::core::App;
use super::state::{
    AppDeleteState, AppSort, ConfirmSyncState, Mode, RollbackState, SortField, View,
};
use crate::tui::app::async_ops::{Command, DiffScope, ExternalRequest};

impl App {
    /// Execute a command line (without the leading ':'). Returns Some(true)
    /// to quit the application.
    pub(crate) fn execute_command(&mut self, input: &str) -> Option<bool> {
        let mut parts = input.split_whitespace();
        let name = parts.next()?.to_lowercase();
        let arg = parts.next();
        let arg2 = parts.next();

        if let Some(view) = View::parse(&name) {
            self.switch_view(view);
            return None;
        }

        match name.as_str() {
            "q" | "quit" => return Some(true),
            "sync" => self.command_sync(arg),
            "diff" => self.command_diff(arg),
            "rollback" => self.command_rollback(arg),
            "delete" => self.command_delete(arg),
            "refresh" => self.refresh_command(arg, false),
            "refresh!" => self.refresh_command(arg, true),
            "resources" | "res" => {
                let apps = self.arg_or_selection(arg);
                if !apps.is_empty() {
                    self.open_resources(apps);
                }
            }
            "theme" => self.enter_theme_mode(),
            "logs" => match crate::cli::read_log_content() {
                Some(content) => self.push_cmd(Command::External(ExternalRequest::Pager {
                    title: "Logs".to_string(),
                    content,
                })),
                None => self.set_status("No logs available"),
            },
            "up" => self.handle_escape(),
            "all" => {
                self.selections.scope_clusters.clear();
                self.selections.scope_namespaces.clear();
                self.selections.scope_projects.clear();
                self.selections.scope_app_sets.clear();
                self.selections.selected_apps.clear();
                self.ui.active_filter.clear();
                self.ui.search_query.clear();
                self.switch_view(View::Apps);
                self.maybe_restart_watch_for_scope();
            }
            "sort" => self.command_sort(arg, arg2),
            "upgrade" => {
                self.set_status("Checking for updates...");
                self.push_cmd(Command::CheckUpgrade);
            }
            other => self.set_status(format!("Unknown command: {}", other)),
        }
        None
    }

    /// Switch list views directly. Checked apps do not survive leaving the
    /// Apps view, and tree watchers never outlive the tree view.
    pub(crate) fn switch_view(&mut self, view: View) {
        if self.nav.view == View::Tree && view != View::Tree {
            self.leave_tree();
        }
        if view != View::Apps {
            self.selections.selected_apps.clear();
        }
        self.nav.view = view;
        self.nav.selected_idx = 0;
        self.list_nav.reset();
        self.clamp_selection();
    }

    fn command_sync(&mut self, arg: Option<&str>) {
        match arg {
            Some(name) => {
                if self.find_app(name).is_none() {
                    self.set_status(format!("App not found: {}", name));
                    return;
                }
                let session = self.next_session();
                self.modals.confirm_sync =
                    Some(ConfirmSyncState::new(name.to_string(), session));
                self.mode = Mode::ConfirmSync;
            }
            None => self.open_sync_modal(),
        }
    }

    fn command_diff(&mut self, arg: Option<&str>) {
        match arg {
            Some(name) => match self.find_app(name).cloned() {
                Some(app) => self.start_app_diff(app),
                None => self.set_status(format!("App not found: {}", name)),
            },
            None => self.open_app_diff(),
        }
    }

    fn start_app_diff(&mut self, app: crate::api::AppItem) {
        let session = self.next_session();
        let title = format!("Diff: {}", app.name);
        self.diff = Some(super::state::DiffState {
            title: title.clone(),
            lines: Vec::new(),
            loading: true,
            session,
        });
        self.push_cmd(Command::Diff {
            session,
            title,
            scope: DiffScope::App {
                name: app.name,
                app_ns: app.app_namespace,
            },
        });
    }

    fn command_rollback(&mut self, arg: Option<&str>) {
        match arg {
            Some(name) => {
                let Some(app) = self.find_app(name).cloned() else {
                    self.set_status(format!("App not found: {}", name));
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
                self.push_cmd(Command::FetchHistory {
                    session,
                    app: app.name,
                    app_ns: app.app_namespace,
                });
            }
            None => self.open_rollback(),
        }
    }

    fn command_delete(&mut self, arg: Option<&str>) {
        match arg {
            Some(name) => {
                let Some(app) = self.find_app(name).cloned() else {
                    self.set_status(format!("App not found: {}", name));
                    return;
                };
                let session = self.next_session();
                self.modals.app_delete =
                    Some(AppDeleteState::new(app.name, app.app_namespace, session));
                self.mode = Mode::ConfirmAppDelete;
            }
            None => self.open_app_delete(),
        }
    }

    fn command_sort(&mut self, field: Option<&str>, direction: Option<&str>) {
        let parsed_field = match field.map(str::to_lowercase).as_deref() {
            Some("health") => Some(SortField::Health),
            Some("sync") => Some(SortField::Sync),
            _ => None,
        };
        let Some(parsed_field) = parsed_field else {
            self.set_status("Usage: :sort health|sync [asc|desc]");
            return;
        };
        let ascending = match direction.map(str::to_lowercase).as_deref() {
            None | Some("asc") => true,
            Some("desc") => false,
            Some(other) => {
                self.set_status(format!("Invalid sort direction: {}", other));
                return;
            }
        };
        self.sort = AppSort {
            field: Some(parsed_field),
            ascending,
        };
        self.clamp_selection();
    }
}
