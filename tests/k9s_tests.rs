//! Tests for k9s context resolution: exact kubeconfig matches launch
//! directly, everything else goes through the context picker.

use argonaut::api::{AppItem, HealthSummary, ResourceNode, ResourceTree};
use argonaut::config::Config;
use argonaut::tui::app::state::Mode;
use argonaut::tui::app::{Command, ExternalRequest};
use argonaut::tui::{App, Theme};
use argonaut::watcher::AppMsg;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::io::Write;
use std::time::Instant;

const KUBECONFIG_YAML: &str = r#"
apiVersion: v1
kind: Config
current-context: staging
clusters: []
users: []
contexts:
- name: staging
  context:
    cluster: staging
    user: default
- name: prod-east
  context:
    cluster: prod-east
    user: default
- name: prod-west
  context:
    cluster: prod-west
    user: default
"#;

fn with_test_kubeconfig() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(KUBECONFIG_YAML.as_bytes()).unwrap();
    // SAFETY: tests in this file run in one process; the variable is set
    // before any kubeconfig read happens
    unsafe {
        std::env::set_var("KUBECONFIG", file.path());
    }
    file
}

fn app_with_cluster(cluster_id: &str) -> App {
    let mut app = App::new(Config::default(), Theme::default(), "default".to_string(), false);
    app.handle_msg(AppMsg::AppsLoaded {
        result: Ok(vec![AppItem {
            name: "x".to_string(),
            app_namespace: None,
            project: "default".to_string(),
            namespace: "prod".to_string(),
            cluster_label: cluster_id.to_string(),
            cluster_id: Some(cluster_id.to_string()),
            sync_status: "Synced".to_string(),
            health_status: "Healthy".to_string(),
            app_set: None,
            last_synced_at: None,
        }]),
    });
    app
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_key_at(KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
}

fn open_tree_with_one_resource(app: &mut App) {
    press(app, KeyCode::Enter);
    app.take_commands();
    app.set_tree_session(1);
    app.handle_msg(AppMsg::TreeSnapshot {
        session: 1,
        app: "x".to_string(),
        tree: ResourceTree {
            nodes: vec![ResourceNode {
                group: "apps".to_string(),
                version: "v1".to_string(),
                kind: "Deployment".to_string(),
                name: "web".to_string(),
                namespace: Some("prod".to_string()),
                uid: "d1".to_string(),
                parent_refs: vec![],
                health: Some(HealthSummary {
                    status: Some("Healthy".to_string()),
                }),
            }],
        },
    });
    press(app, KeyCode::Char('j')); // move off the Application root
}

#[test]
fn test_exact_cluster_match_launches_directly() {
    let _kubeconfig = with_test_kubeconfig();
    let mut app = app_with_cluster("prod-east");
    open_tree_with_one_resource(&mut app);

    press(&mut app, KeyCode::Char('K'));
    assert_eq!(app.mode(), Mode::Normal, "no picker for an exact match");
    let cmds = app.take_commands();
    match cmds.iter().find(|c| matches!(c, Command::External(_))) {
        Some(Command::External(ExternalRequest::K9s {
            context,
            kind,
            namespace,
            ..
        })) => {
            assert_eq!(context.as_deref(), Some("prod-east"));
            assert_eq!(kind, "Deployment");
            assert_eq!(namespace, "prod");
        }
        _ => panic!("expected a k9s launch"),
    }
}

#[test]
fn test_in_cluster_never_auto_matches() {
    let _kubeconfig = with_test_kubeconfig();
    let mut app = app_with_cluster("in-cluster");
    open_tree_with_one_resource(&mut app);

    press(&mut app, KeyCode::Char('K'));
    assert_eq!(
        app.mode(),
        Mode::K9sContextSelect,
        "in-cluster always goes through the picker"
    );
    let k9s = app.modals().k9s_pending.as_ref().unwrap();
    assert_eq!(k9s.contexts.len(), 3);
    // Current context pre-selected for convenience
    assert_eq!(k9s.contexts[k9s.selected], "staging");
    assert!(app.take_commands().is_empty());
}

#[test]
fn test_unknown_cluster_opens_picker() {
    let _kubeconfig = with_test_kubeconfig();
    let mut app = app_with_cluster("some-other-cluster");
    open_tree_with_one_resource(&mut app);

    press(&mut app, KeyCode::Char('K'));
    assert_eq!(app.mode(), Mode::K9sContextSelect);
}

#[test]
fn test_picker_enter_launches_selected_context() {
    let _kubeconfig = with_test_kubeconfig();
    let mut app = app_with_cluster("in-cluster");
    open_tree_with_one_resource(&mut app);
    press(&mut app, KeyCode::Char('K'));
    assert_eq!(app.mode(), Mode::K9sContextSelect);

    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.mode(), Mode::Normal);
    let cmds = app.take_commands();
    match cmds.iter().find(|c| matches!(c, Command::External(_))) {
        Some(Command::External(ExternalRequest::K9s { context, .. })) => {
            assert_eq!(context.as_deref(), Some("prod-east"));
        }
        _ => panic!("expected a k9s launch from the picker"),
    }
}

#[test]
fn test_app_cr_from_apps_view_always_uses_picker() {
    let _kubeconfig = with_test_kubeconfig();
    let mut app = app_with_cluster("prod-east");
    press(&mut app, KeyCode::Char('K'));
    assert_eq!(
        app.mode(),
        Mode::K9sContextSelect,
        "the management cluster is never guessed"
    );
    let k9s = app.modals().k9s_pending.as_ref().unwrap();
    assert_eq!(k9s.kind, "Application");
    assert_eq!(k9s.namespace, "argocd");
}
