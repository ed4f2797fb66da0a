//! Tests for the key dispatcher: debounce windows, quit chords, and
//! mode entry/exit round-trips.

use argonaut::api::AppItem;
use argonaut::config::Config;
use argonaut::tui::app::state::Mode;
use argonaut::tui::{App, Theme};
use argonaut::watcher::AppMsg;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

fn create_test_app() -> App {
    App::new(Config::default(), Theme::default(), "default".to_string(), false)
}

fn app_item(name: &str) -> AppItem {
    AppItem {
        name: name.to_string(),
        app_namespace: None,
        project: "default".to_string(),
        namespace: "prod".to_string(),
        cluster_label: "in-cluster".to_string(),
        cluster_id: None,
        sync_status: "Synced".to_string(),
        health_status: "Healthy".to_string(),
        app_set: None,
        last_synced_at: None,
    }
}

fn load_one_app(app: &mut App) {
    app.handle_msg(AppMsg::AppsLoaded {
        result: Ok(vec![app_item("x")]),
    });
}

fn press_at(app: &mut App, code: KeyCode, now: Instant) -> Option<bool> {
    app.handle_key_at(KeyEvent::new(code, KeyModifiers::NONE), now)
}

#[test]
fn test_escape_debounce_drops_second_escape() {
    let mut app = create_test_app();
    load_one_app(&mut app);
    let t0 = Instant::now();

    // First escape drills Apps -> Projects
    press_at(&mut app, KeyCode::Esc, t0);
    assert_eq!(
        app.current_view(),
        argonaut::tui::app::state::View::Projects
    );

    // 50 ms later: dropped
    press_at(&mut app, KeyCode::Esc, t0 + Duration::from_millis(50));
    assert_eq!(
        app.current_view(),
        argonaut::tui::app::state::View::Projects
    );

    // 150 ms after the first: accepted, drills to Namespaces
    press_at(&mut app, KeyCode::Esc, t0 + Duration::from_millis(200));
    assert_eq!(
        app.current_view(),
        argonaut::tui::app::state::View::Namespaces
    );
}

#[test]
fn test_zz_chord_quits_within_window() {
    let mut app = create_test_app();
    load_one_app(&mut app);
    let t0 = Instant::now();
    assert_eq!(press_at(&mut app, KeyCode::Char('Z'), t0), None);
    assert_eq!(
        press_at(&mut app, KeyCode::Char('Z'), t0 + Duration::from_millis(300)),
        Some(true)
    );
}

#[test]
fn test_zq_chord_quits_within_window() {
    let mut app = create_test_app();
    load_one_app(&mut app);
    let t0 = Instant::now();
    press_at(&mut app, KeyCode::Char('Z'), t0);
    assert_eq!(
        press_at(&mut app, KeyCode::Char('Q'), t0 + Duration::from_millis(499)),
        Some(true)
    );
}

#[test]
fn test_z_chord_expires_after_window() {
    let mut app = create_test_app();
    load_one_app(&mut app);
    let t0 = Instant::now();
    press_at(&mut app, KeyCode::Char('Z'), t0);
    assert_eq!(
        press_at(&mut app, KeyCode::Char('Z'), t0 + Duration::from_millis(600)),
        None,
        "second Z past the window re-arms instead of quitting"
    );
    // The re-armed chord still completes
    assert_eq!(
        press_at(&mut app, KeyCode::Char('Z'), t0 + Duration::from_millis(800)),
        Some(true)
    );
}

#[test]
fn test_z_chord_broken_by_other_key() {
    let mut app = create_test_app();
    load_one_app(&mut app);
    let t0 = Instant::now();
    press_at(&mut app, KeyCode::Char('Z'), t0);
    press_at(&mut app, KeyCode::Char('j'), t0 + Duration::from_millis(100));
    assert_eq!(
        press_at(&mut app, KeyCode::Char('Z'), t0 + Duration::from_millis(200)),
        None,
        "an interloper key breaks the chord"
    );
}

#[test]
fn test_ctrl_c_quits_from_any_mode() {
    let mut app = create_test_app();
    load_one_app(&mut app);
    press_at(&mut app, KeyCode::Char('?'), Instant::now());
    assert_eq!(app.mode(), Mode::Help);
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(app.handle_key_at(ctrl_c, Instant::now()), Some(true));
}

#[test]
fn test_search_cancel_restores_state() {
    let mut app = create_test_app();
    load_one_app(&mut app);
    let t0 = Instant::now();
    press_at(&mut app, KeyCode::Char('/'), t0);
    assert_eq!(app.mode(), Mode::Search);
    press_at(&mut app, KeyCode::Char('x'), t0);
    press_at(&mut app, KeyCode::Esc, t0 + Duration::from_millis(200));
    assert_eq!(app.mode(), Mode::Normal);
    assert!(app.ui_state().search_query.is_empty());
    assert!(app.ui_state().active_filter.is_empty());
}

#[test]
fn test_search_commit_applies_filter() {
    let mut app = create_test_app();
    app.handle_msg(AppMsg::AppsLoaded {
        result: Ok(vec![app_item("web"), app_item("api")]),
    });
    let t0 = Instant::now();
    press_at(&mut app, KeyCode::Char('/'), t0);
    press_at(&mut app, KeyCode::Char('w'), t0);
    // Live filtering already narrows the list
    assert_eq!(app.visible_items().len(), 1);
    press_at(&mut app, KeyCode::Enter, t0);
    assert_eq!(app.mode(), Mode::Normal);
    assert_eq!(app.ui_state().active_filter, "w");
    assert_eq!(app.visible_items().len(), 1);
}

#[test]
fn test_help_toggles_closed() {
    let mut app = create_test_app();
    load_one_app(&mut app);
    press_at(&mut app, KeyCode::Char('?'), Instant::now());
    assert_eq!(app.mode(), Mode::Help);
    press_at(&mut app, KeyCode::Char('?'), Instant::now());
    assert_eq!(app.mode(), Mode::Normal);
}

#[test]
fn test_theme_escape_restores_original() {
    let mut app = create_test_app();
    load_one_app(&mut app);
    let t0 = Instant::now();
    for c in ":theme".chars() {
        press_at(&mut app, KeyCode::Char(c), t0);
    }
    press_at(&mut app, KeyCode::Enter, t0);
    assert_eq!(app.mode(), Mode::Theme);
    assert_eq!(app.theme_name(), "default");

    // Preview the next theme, then cancel
    press_at(&mut app, KeyCode::Char('j'), t0);
    assert_ne!(app.theme_name(), "default");
    press_at(&mut app, KeyCode::Esc, t0 + Duration::from_millis(200));
    assert_eq!(app.mode(), Mode::Normal);
    assert_eq!(app.theme_name(), "default");
}

#[test]
fn test_core_detected_blocks_command_mode() {
    let mut app = App::new(Config::default(), Theme::default(), "default".to_string(), true);
    assert_eq!(app.mode(), Mode::CoreDetected);
    press_at(&mut app, KeyCode::Char(':'), Instant::now());
    assert_eq!(app.mode(), Mode::CoreDetected);
    assert_eq!(
        press_at(&mut app, KeyCode::Char('q'), Instant::now()),
        Some(true)
    );
}

#[test]
fn test_error_mode_quits_when_nothing_loaded() {
    let mut app = create_test_app();
    app.handle_msg(AppMsg::AppsLoaded {
        result: Err(argonaut::watcher::MsgError {
            kind: argonaut::watcher::MsgErrorKind::Other,
            message: "boom".to_string(),
        }),
    });
    assert_eq!(app.mode(), Mode::Error);
    // Nothing was loaded, so q exits the process
    assert_eq!(
        press_at(&mut app, KeyCode::Char('q'), Instant::now()),
        Some(true)
    );
}

#[test]
fn test_auth_error_enters_auth_required() {
    let mut app = create_test_app();
    app.handle_msg(AppMsg::AppsLoaded {
        result: Err(argonaut::watcher::MsgError {
            kind: argonaut::watcher::MsgErrorKind::Auth,
            message: "token expired".to_string(),
        }),
    });
    assert_eq!(app.mode(), Mode::AuthRequired);
}

#[test]
fn test_connection_error_escape_returns_to_normal() {
    let mut app = create_test_app();
    load_one_app(&mut app);
    app.handle_msg(AppMsg::AppsWatchError {
        error: argonaut::watcher::MsgError {
            kind: argonaut::watcher::MsgErrorKind::Connection,
            message: "refused".to_string(),
        },
    });
    assert_eq!(app.mode(), Mode::ConnectionError);
    press_at(&mut app, KeyCode::Esc, Instant::now());
    assert_eq!(app.mode(), Mode::Normal);
}
