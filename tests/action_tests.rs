//! Tests for the action pipelines: sync, rollback, delete, and the tree
//! view's batch operations. The event loop is simulated by draining
//! commands and feeding result messages back into the model.

use argonaut::api::{AppItem, HealthSummary, ParentRef, ResourceNode, ResourceTree, RevisionRow};
use argonaut::config::Config;
use argonaut::tui::app::state::{Mode, RollbackPhase, View, MULTI_TARGET};
use argonaut::tui::app::Command;
use argonaut::tui::{App, Theme};
use argonaut::watcher::{AppMsg, MsgError, MsgErrorKind};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

fn create_test_app() -> App {
    App::new(Config::default(), Theme::default(), "default".to_string(), false)
}

fn app_item(name: &str) -> AppItem {
    AppItem {
        name: name.to_string(),
        app_namespace: Some("argocd".to_string()),
        project: "default".to_string(),
        namespace: "prod".to_string(),
        cluster_label: "prod-east".to_string(),
        cluster_id: Some("prod-east".to_string()),
        sync_status: "OutOfSync".to_string(),
        health_status: "Healthy".to_string(),
        app_set: None,
        last_synced_at: None,
    }
}

fn press(app: &mut App, code: KeyCode) -> Option<bool> {
    app.handle_key_at(KeyEvent::new(code, KeyModifiers::NONE), Instant::now())
}

fn ctrl(app: &mut App, c: char) -> Option<bool> {
    app.handle_key_at(
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL),
        Instant::now(),
    )
}

fn load_apps(app: &mut App, names: &[&str]) {
    app.handle_msg(AppMsg::AppsLoaded {
        result: Ok(names.iter().map(|n| app_item(n)).collect()),
    });
}

fn node(uid: &str, kind: &str, name: &str, health: &str, parent: Option<&str>) -> ResourceNode {
    ResourceNode {
        group: String::new(),
        version: "v1".to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
        namespace: Some("prod".to_string()),
        uid: uid.to_string(),
        parent_refs: parent
            .map(|p| vec![ParentRef { uid: p.to_string() }])
            .unwrap_or_default(),
        health: Some(HealthSummary {
            status: Some(health.to_string()),
        }),
    }
}

fn history_row(id: i64) -> RevisionRow {
    RevisionRow {
        id,
        revision: format!("abc{}", id),
        deployed_at: None,
        source: "https://git.example.com/repo".to_string(),
    }
}

/// Simulate the loop's tree-watch handling for a 'r' / drill-down press.
fn open_tree(app: &mut App, trees: &[(&str, ResourceTree)]) {
    let cmds = app.take_commands();
    assert!(
        cmds.iter().any(|c| matches!(c, Command::OpenTree { .. })),
        "expected an OpenTree command"
    );
    app.set_tree_session(1);
    for (name, tree) in trees {
        app.handle_msg(AppMsg::TreeSnapshot {
            session: 1,
            app: name.to_string(),
            tree: tree.clone(),
        });
    }
}

// ----- Sync -----

#[test]
fn test_sync_modal_single_app() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);
    press(&mut app, KeyCode::Char('s'));
    assert_eq!(app.mode(), Mode::ConfirmSync);
    let modal = app.modals().confirm_sync.as_ref().unwrap();
    assert_eq!(modal.target, "x");
    assert!(!modal.prune);
}

#[test]
fn test_sync_prune_toggle_and_execute() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);
    press(&mut app, KeyCode::Char('s'));
    press(&mut app, KeyCode::Char('p'));
    press(&mut app, KeyCode::Enter);

    let cmds = app.take_commands();
    let sync = cmds
        .iter()
        .find_map(|c| match c {
            Command::Sync {
                session,
                targets,
                prune,
                ..
            } => Some((*session, targets.clone(), *prune)),
            _ => None,
        })
        .expect("sync command dispatched");
    assert_eq!(sync.1, vec![("x".to_string(), Some("argocd".to_string()))]);
    assert!(sync.2, "prune toggled on");
    assert!(app.modals().confirm_sync.as_ref().unwrap().loading);

    // Success closes the modal
    app.handle_msg(AppMsg::SyncDone {
        session: sync.0,
        synced: vec!["x".to_string()],
        result: Ok(()),
    });
    assert_eq!(app.mode(), Mode::Normal);
    assert!(app.modals().confirm_sync.is_none());
}

#[test]
fn test_sync_multi_target_uses_sentinel() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x", "y"]);
    press(&mut app, KeyCode::Char(' ')); // check x
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char(' ')); // check y
    press(&mut app, KeyCode::Char('s'));
    let modal = app.modals().confirm_sync.as_ref().unwrap();
    assert_eq!(modal.target, MULTI_TARGET);

    press(&mut app, KeyCode::Char('y'));
    let cmds = app.take_commands();
    match cmds.iter().find(|c| matches!(c, Command::Sync { .. })) {
        Some(Command::Sync { targets, .. }) => assert_eq!(targets.len(), 2),
        _ => panic!("expected sync command"),
    }
}

#[test]
fn test_sync_error_keeps_modal_open() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);
    press(&mut app, KeyCode::Char('s'));
    press(&mut app, KeyCode::Char('y'));
    let session = app.modals().confirm_sync.as_ref().unwrap().session;
    app.take_commands();

    app.handle_msg(AppMsg::SyncDone {
        session,
        synced: vec![],
        result: Err(MsgError {
            kind: MsgErrorKind::Other,
            message: "sync refused".to_string(),
        }),
    });
    assert_eq!(app.mode(), Mode::ConfirmSync, "modal stays open for retry");
    let modal = app.modals().confirm_sync.as_ref().unwrap();
    assert!(!modal.loading);
    assert_eq!(modal.error.as_deref(), Some("sync refused"));
}

#[test]
fn test_stale_sync_result_is_dropped() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);
    press(&mut app, KeyCode::Char('s'));
    let session = app.modals().confirm_sync.as_ref().unwrap().session;

    // Result from an earlier session must not touch the new modal
    app.handle_msg(AppMsg::SyncDone {
        session: session + 100,
        synced: vec![],
        result: Ok(()),
    });
    assert_eq!(app.mode(), Mode::ConfirmSync);
    assert!(app.modals().confirm_sync.is_some());
}

// ----- Rollback -----

#[test]
fn test_rollback_two_phase_flow() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);

    press(&mut app, KeyCode::Char('R'));
    assert_eq!(app.mode(), Mode::Rollback);
    let rb = app.rollback_state().unwrap();
    assert!(rb.loading);
    let session = rb.session;
    let cmds = app.take_commands();
    assert!(cmds.iter().any(|c| matches!(c, Command::FetchHistory { .. })));

    app.handle_msg(AppMsg::HistoryLoaded {
        session,
        result: Ok(vec![history_row(3), history_row(2), history_row(1)]),
    });
    let rb = app.rollback_state().unwrap();
    assert!(!rb.loading);
    assert_eq!(rb.phase, RollbackPhase::List);
    assert_eq!(rb.selected_idx, 0);
    assert_eq!(rb.rows.len(), 3);

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.rollback_state().unwrap().phase, RollbackPhase::Confirm);

    press(&mut app, KeyCode::Left);
    assert_eq!(app.rollback_state().unwrap().confirm_selected, 0);

    press(&mut app, KeyCode::Enter);
    let rb = app.rollback_state().unwrap();
    assert!(rb.loading);
    let cmds = app.take_commands();
    match cmds
        .iter()
        .find(|c| matches!(c, Command::ExecuteRollback { .. }))
    {
        Some(Command::ExecuteRollback { id, app: name, .. }) => {
            assert_eq!(*id, 3);
            assert_eq!(name, "x");
        }
        _ => panic!("expected rollback command"),
    }

    app.handle_msg(AppMsg::RollbackDone {
        session,
        result: Ok(()),
    });
    assert_eq!(app.mode(), Mode::Normal);
    assert!(app.rollback_state().is_none());
}

#[test]
fn test_rollback_exit_allowed_while_loading() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);
    press(&mut app, KeyCode::Char('R'));
    assert!(app.rollback_state().unwrap().loading);
    press(&mut app, KeyCode::Char('q'));
    assert_eq!(app.mode(), Mode::Normal);
    assert!(app.rollback_state().is_none());
}

#[test]
fn test_rollback_rejected_for_multiple_apps() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x", "y"]);
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char('R'));
    assert_eq!(app.mode(), Mode::Normal);
    assert!(app.rollback_state().is_none());
    assert!(app.status().is_some());
}

// ----- App delete -----

#[test]
fn test_app_delete_policy_cycle_and_confirm() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);
    ctrl(&mut app, 'd');
    assert_eq!(app.mode(), Mode::ConfirmAppDelete);
    let modal = app.modals().app_delete.as_ref().unwrap();
    assert!(modal.cascade);
    assert_eq!(modal.policy.as_str(), "foreground");

    press(&mut app, KeyCode::Char('p'));
    assert_eq!(
        app.modals().app_delete.as_ref().unwrap().policy.as_str(),
        "background"
    );
    press(&mut app, KeyCode::Char('c'));
    assert!(!app.modals().app_delete.as_ref().unwrap().cascade);

    press(&mut app, KeyCode::Char('y'));
    let cmds = app.take_commands();
    match cmds.iter().find(|c| matches!(c, Command::DeleteApps { .. })) {
        Some(Command::DeleteApps {
            targets,
            cascade,
            policy,
            ..
        }) => {
            assert_eq!(targets.len(), 1);
            assert!(!cascade);
            assert_eq!(policy, "background");
        }
        _ => panic!("expected delete command"),
    }
}

// ----- Tree view flows -----

#[test]
fn test_multi_app_tree_overlay_via_r() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x", "y"]);
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char('r'));
    assert_eq!(app.current_view(), View::Tree);

    let tree = ResourceTree {
        nodes: vec![node("d1", "Deployment", "web", "Healthy", None)],
    };
    open_tree(&mut app, &[("y", tree.clone()), ("x", tree)]);

    let tv = app.tree_view();
    assert_eq!(tv.visible_count(), 4);
    assert_eq!(tv.visible_line_count(), tv.visible_count() + 1);
    assert_eq!(tv.first_app_name().as_deref(), Some("x"));
}

#[test]
fn test_tree_delete_drops_missing_silently() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);
    press(&mut app, KeyCode::Enter); // open resources for cursor app
    let tree = ResourceTree {
        nodes: vec![
            node("r1", "ConfigMap", "one", "Healthy", None),
            node("r2", "ConfigMap", "two", "Missing", None),
            node("r3", "ConfigMap", "three", "Healthy", None),
        ],
    };
    open_tree(&mut app, &[("x", tree)]);

    // Order: root, one, three, two. Select one and three; the Missing
    // resource refuses selection.
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char(' '));
    assert_eq!(app.tree_view().selection_count(), 2);

    ctrl(&mut app, 'd');
    assert_eq!(app.mode(), Mode::ConfirmResourceDelete);
    let modal = app.modals().resource_delete.as_ref().unwrap();
    assert_eq!(modal.targets.len(), 2);
    assert!(modal.targets.iter().all(|t| !t.is_missing()));
}

#[test]
fn test_tree_delete_on_missing_cursor_is_silent_noop() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);
    press(&mut app, KeyCode::Enter);
    let tree = ResourceTree {
        nodes: vec![node("r2", "ConfigMap", "two", "Missing", None)],
    };
    open_tree(&mut app, &[("x", tree)]);

    press(&mut app, KeyCode::Char('j')); // cursor on the Missing resource
    ctrl(&mut app, 'd');
    assert_eq!(app.mode(), Mode::Normal, "no modal for a Missing-only cursor");
}

#[test]
fn test_tree_sync_on_app_root_falls_back_to_app_sync() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);
    press(&mut app, KeyCode::Enter);
    let tree = ResourceTree {
        nodes: vec![node("d1", "Deployment", "web", "Healthy", None)],
    };
    open_tree(&mut app, &[("x", tree)]);

    // Cursor starts on the synthetic Application root
    press(&mut app, KeyCode::Char('s'));
    assert_eq!(app.mode(), Mode::ConfirmSync);
    assert_eq!(
        app.modals().confirm_sync.as_ref().unwrap().target,
        "x"
    );
}

#[test]
fn test_tree_resource_sync_includes_force_toggle() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);
    press(&mut app, KeyCode::Enter);
    let tree = ResourceTree {
        nodes: vec![node("d1", "Deployment", "web", "Healthy", None)],
    };
    open_tree(&mut app, &[("x", tree)]);

    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char('s'));
    assert_eq!(app.mode(), Mode::ConfirmResourceSync);
    press(&mut app, KeyCode::Char('f'));
    press(&mut app, KeyCode::Char('y'));
    let cmds = app.take_commands();
    match cmds
        .iter()
        .find(|c| matches!(c, Command::SyncResources { .. }))
    {
        Some(Command::SyncResources { targets, force, .. }) => {
            assert_eq!(targets.len(), 1);
            assert!(force);
        }
        _ => panic!("expected resource sync command"),
    }
}

#[test]
fn test_leaving_tree_cancels_watchers() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);
    press(&mut app, KeyCode::Enter);
    let tree = ResourceTree {
        nodes: vec![node("d1", "Deployment", "web", "Healthy", None)],
    };
    open_tree(&mut app, &[("x", tree)]);
    assert_eq!(app.current_view(), View::Tree);

    press(&mut app, KeyCode::Char('q'));
    assert_eq!(app.current_view(), View::Apps);
    let cmds = app.take_commands();
    assert!(cmds.iter().any(|c| matches!(c, Command::CloseTree)));

    // A late snapshot from the cancelled session is dropped
    app.set_tree_session(2);
    app.handle_msg(AppMsg::TreeSnapshot {
        session: 1,
        app: "x".to_string(),
        tree: ResourceTree::default(),
    });
    assert_eq!(app.current_view(), View::Apps);
}

// ----- Diff -----

#[test]
fn test_diff_empty_result_enters_no_diff_mode() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x"]);
    press(&mut app, KeyCode::Char('d'));
    let cmds = app.take_commands();
    let session = match cmds.iter().find(|c| matches!(c, Command::Diff { .. })) {
        Some(Command::Diff { session, .. }) => *session,
        _ => panic!("expected diff command"),
    };

    app.handle_msg(AppMsg::DiffReady {
        session,
        title: "Diff: x".to_string(),
        result: Ok(vec![]),
    });
    assert_eq!(app.mode(), Mode::NoDiff);

    // Any key dismisses the no-diff modal
    press(&mut app, KeyCode::Char('x'));
    assert_eq!(app.mode(), Mode::Normal);
}

#[test]
fn test_diff_for_multiple_checked_apps_is_rejected() {
    let mut app = create_test_app();
    load_apps(&mut app, &["x", "y"]);
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char('d'));
    assert_eq!(app.mode(), Mode::Normal);
    assert!(app.take_commands().is_empty());
    assert!(app.status().is_some());
}
