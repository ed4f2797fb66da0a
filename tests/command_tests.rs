//! Tests for the `:` command line

use argonaut::api::AppItem;
use argonaut::config::Config;
use argonaut::tui::app::state::{Mode, SortField, View};
use argonaut::tui::app::Command;
use argonaut::tui::{App, Theme};
use argonaut::watcher::AppMsg;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

fn create_test_app() -> App {
    App::new(Config::default(), Theme::default(), "default".to_string(), false)
}

fn app_item(name: &str, project: &str) -> AppItem {
    AppItem {
        name: name.to_string(),
        app_namespace: None,
        project: project.to_string(),
        namespace: "prod".to_string(),
        cluster_label: "prod-east".to_string(),
        cluster_id: Some("prod-east".to_string()),
        sync_status: "Synced".to_string(),
        health_status: "Degraded".to_string(),
        app_set: None,
        last_synced_at: None,
    }
}

fn load_apps(app: &mut App, apps: Vec<AppItem>) {
    app.handle_msg(AppMsg::AppsLoaded { result: Ok(apps) });
}

fn run_command(app: &mut App, command: &str) -> Option<bool> {
    app.handle_key_at(
        KeyEvent::new(KeyCode::Char(':'), KeyModifiers::NONE),
        Instant::now(),
    );
    for c in command.chars() {
        app.handle_key_at(
            KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE),
            Instant::now(),
        );
    }
    app.handle_key_at(
        KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
        Instant::now(),
    )
}

#[test]
fn test_view_switch_commands() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "default")]);
    run_command(&mut app, "cls");
    assert_eq!(app.current_view(), View::Clusters);
    run_command(&mut app, "namespaces");
    assert_eq!(app.current_view(), View::Namespaces);
    run_command(&mut app, "proj");
    assert_eq!(app.current_view(), View::Projects);
    run_command(&mut app, "appsets");
    assert_eq!(app.current_view(), View::ApplicationSets);
    run_command(&mut app, "apps");
    assert_eq!(app.current_view(), View::Apps);
}

#[test]
fn test_quit_command() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "default")]);
    assert_eq!(run_command(&mut app, "q"), Some(true));
}

#[test]
fn test_unknown_command_sets_status() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "default")]);
    run_command(&mut app, "frobnicate");
    assert_eq!(app.mode(), Mode::Normal);
    assert!(app.status().unwrap().contains("Unknown command"));
}

#[test]
fn test_sort_command() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "default")]);
    run_command(&mut app, "sort health desc");
    assert_eq!(app.sort().field, Some(SortField::Health));
    assert!(!app.sort().ascending);

    run_command(&mut app, "sort sync");
    assert_eq!(app.sort().field, Some(SortField::Sync));
    assert!(app.sort().ascending);

    run_command(&mut app, "sort bogus");
    assert!(app.status().unwrap().contains("Usage"));
}

#[test]
fn test_sync_command_with_target() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "default")]);
    run_command(&mut app, "sync x");
    assert_eq!(app.mode(), Mode::ConfirmSync);
    assert_eq!(app.modals().confirm_sync.as_ref().unwrap().target, "x");
}

#[test]
fn test_sync_command_with_unknown_target() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "default")]);
    run_command(&mut app, "sync nope");
    assert_eq!(app.mode(), Mode::Normal);
    assert!(app.status().unwrap().contains("not found"));
}

#[test]
fn test_refresh_commands() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "default")]);
    run_command(&mut app, "refresh");
    let cmds = app.take_commands();
    match cmds.iter().find(|c| matches!(c, Command::Refresh { .. })) {
        Some(Command::Refresh { hard, targets }) => {
            assert!(!hard);
            assert_eq!(targets.len(), 1);
        }
        _ => panic!("expected refresh command"),
    }

    run_command(&mut app, "refresh! x");
    let cmds = app.take_commands();
    match cmds.iter().find(|c| matches!(c, Command::Refresh { .. })) {
        Some(Command::Refresh { hard, .. }) => assert!(hard),
        _ => panic!("expected hard refresh command"),
    }
}

#[test]
fn test_resources_command_opens_tree() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "default")]);
    run_command(&mut app, "resources x");
    assert_eq!(app.current_view(), View::Tree);
    let cmds = app.take_commands();
    assert!(cmds.iter().any(|c| matches!(c, Command::OpenTree { .. })));
}

#[test]
fn test_all_command_clears_scopes() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "p1"), app_item("y", "p2")]);
    run_command(&mut app, "cls");
    app.handle_key_at(
        KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
        Instant::now(),
    );
    assert!(!app.selections().scope_clusters.is_empty());

    run_command(&mut app, "all");
    assert_eq!(app.current_view(), View::Apps);
    assert!(app.selections().scope_clusters.is_empty());
    assert!(app.selections().scope_namespaces.is_empty());
    assert!(app.selections().scope_projects.is_empty());
    assert!(app.selections().scope_app_sets.is_empty());
    assert_eq!(app.visible_items().len(), 2);
}

#[test]
fn test_up_command_escapes_one_level() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "default")]);
    assert_eq!(app.current_view(), View::Apps);
    run_command(&mut app, "up");
    assert_eq!(app.current_view(), View::Projects);
}

#[test]
fn test_theme_command_enters_theme_mode() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "default")]);
    run_command(&mut app, "theme");
    assert_eq!(app.mode(), Mode::Theme);
}

#[test]
fn test_upgrade_command_dispatches_check() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "default")]);
    run_command(&mut app, "upgrade");
    let cmds = app.take_commands();
    assert!(cmds.iter().any(|c| matches!(c, Command::CheckUpgrade)));

    app.handle_msg(AppMsg::UpgradeChecked {
        result: Ok(Some("9.9.9".to_string())),
    });
    assert_eq!(app.mode(), Mode::Upgrade);

    app.handle_key_at(
        KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
        Instant::now(),
    );
    assert_eq!(app.mode(), Mode::Normal);

    app.handle_msg(AppMsg::UpgradeChecked { result: Ok(None) });
    assert_eq!(app.mode(), Mode::UpgradeSuccess);
}

#[test]
fn test_single_project_scope_restarts_watch() {
    let mut app = create_test_app();
    load_apps(&mut app, vec![app_item("x", "p1"), app_item("y", "p2")]);
    run_command(&mut app, "proj");
    app.handle_key_at(
        KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
        Instant::now(),
    );
    assert_eq!(app.current_view(), View::Apps);
    let cmds = app.take_commands();
    match cmds
        .iter()
        .find(|c| matches!(c, Command::RestartAppsWatch { .. }))
    {
        Some(Command::RestartAppsWatch { project }) => {
            assert_eq!(project.as_deref(), Some("p1"))
        }
        _ => panic!("expected watch restart with the project filter"),
    }
}

#[test]
fn test_default_view_config_is_honored() {
    let config = Config {
        default_view: Some("clusters".to_string()),
        ..Config::default()
    };
    let app = App::new(config, Theme::default(), "default".to_string(), false);
    assert_eq!(app.current_view(), View::Clusters);
    assert_eq!(app.mode(), Mode::Normal);
}
