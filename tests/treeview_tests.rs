//! Tests for the resource tree engine: multi-app overlay, DFS ordering,
//! Missing-resource selection rules, and filter traversal.

use argonaut::api::{HealthSummary, ParentRef, ResourceNode, ResourceStatus, ResourceTree};
use argonaut::tui::treeview::TreeView;

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

fn simple_tree() -> ResourceTree {
    ResourceTree {
        nodes: vec![
            node("d1", "Deployment", "web", "Healthy", None),
            node("r1", "ReplicaSet", "web-1", "Healthy", Some("d1")),
            node("p1", "Pod", "web-1-a", "Healthy", Some("r1")),
        ],
    }
}

#[test]
fn test_single_app_dfs_order() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    tv.upsert_app_tree("x", &simple_tree());
    // synthetic root + 3 resources, all expanded by default
    assert_eq!(tv.visible_count(), 4);
    assert_eq!(tv.visible_line_count(), 4, "single root has no separators");
}

#[test]
fn test_multi_app_overlay_sorted_with_separator() {
    let mut tv = TreeView::new();
    tv.set_app_meta("y", "Healthy", "Synced");
    tv.set_app_meta("x", "Healthy", "Synced");
    // Insert out of order; roots must come back sorted by app name
    tv.upsert_app_tree("y", &simple_tree());
    tv.upsert_app_tree("x", &simple_tree());

    assert_eq!(tv.visible_count(), 8);
    // One blank separator between the two app roots
    assert_eq!(tv.visible_line_count(), tv.visible_count() + 1);

    tv.set_selected_index(0);
    assert_eq!(tv.selected_app_name().as_deref(), Some("x"));
    assert_eq!(tv.first_app_name().as_deref(), Some("x"));
}

#[test]
fn test_upsert_replaces_previous_generation() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    tv.upsert_app_tree("x", &simple_tree());
    assert_eq!(tv.visible_count(), 4);

    let smaller = ResourceTree {
        nodes: vec![node("d1", "Deployment", "web", "Healthy", None)],
    };
    tv.upsert_app_tree("x", &smaller);
    assert_eq!(tv.visible_count(), 2);
}

#[test]
fn test_application_node_in_snapshot_is_deduplicated() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    let tree = ResourceTree {
        nodes: vec![
            node("app-cr", "Application", "x", "Healthy", None),
            node("d1", "Deployment", "web", "Healthy", Some("app-cr")),
        ],
    };
    tv.upsert_app_tree("x", &tree);
    // The Application CR collapses into the synthetic root
    assert_eq!(tv.visible_count(), 2);
}

#[test]
fn test_collapse_and_expand() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    tv.upsert_app_tree("x", &simple_tree());

    // Collapse the Deployment (index 1)
    tv.set_selected_index(1);
    tv.collapse_or_parent();
    assert_eq!(tv.visible_count(), 2);

    tv.expand_current();
    assert_eq!(tv.visible_count(), 4);

    tv.collapse_all();
    assert_eq!(tv.visible_count(), 2, "only roots and their direct children stay");

    tv.expand_all();
    assert_eq!(tv.visible_count(), 4);
}

#[test]
fn test_collapse_on_leaf_moves_to_parent() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    tv.upsert_app_tree("x", &simple_tree());
    tv.set_selected_index(3); // the Pod
    tv.collapse_or_parent();
    assert_eq!(tv.selected_index(), 2, "leaf collapse jumps to the ReplicaSet");
}

#[test]
fn test_missing_resources_are_not_selectable() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    let tree = ResourceTree {
        nodes: vec![
            node("r1", "ConfigMap", "one", "Healthy", None),
            node("r2", "ConfigMap", "two", "Missing", None),
            node("r3", "ConfigMap", "three", "Healthy", None),
        ],
    };
    tv.upsert_app_tree("x", &tree);

    // Order under the root: one, three, two (sorted by name)
    tv.set_selected_index(1);
    assert!(tv.toggle_selection());
    tv.set_selected_index(3);
    assert!(!tv.toggle_selection(), "Missing resource is rejected");
    assert!(tv.current_resource_is_missing());
    tv.set_selected_index(2);
    assert!(tv.toggle_selection());

    let selected = tv.get_selected_resources();
    assert_eq!(selected.len(), 2);
    assert!(selected.iter().all(|s| !s.is_missing()));
    let names: Vec<&str> = selected.iter().map(|s| s.name.as_str()).collect();
    assert!(names.contains(&"one"));
    assert!(names.contains(&"three"));
}

#[test]
fn test_application_root_is_not_selectable() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    tv.upsert_app_tree("x", &simple_tree());
    tv.set_selected_index(0);
    assert!(!tv.toggle_selection());
    assert!(
        tv.get_selected_resources().is_empty(),
        "cursor on the Application root yields no targets"
    );
}

#[test]
fn test_cursor_fallback_when_nothing_selected() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    tv.upsert_app_tree("x", &simple_tree());
    tv.set_selected_index(1);
    let selected = tv.get_selected_resources();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].kind, "Deployment");
    assert_eq!(selected[0].app_name, "x");
}

#[test]
fn test_double_toggle_leaves_selection_unchanged() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    tv.upsert_app_tree("x", &simple_tree());
    tv.set_selected_index(1);
    tv.toggle_selection();
    assert_eq!(tv.selection_count(), 1);
    tv.toggle_selection();
    assert_eq!(tv.selection_count(), 0);
}

#[test]
fn test_selection_survives_rebuild_with_same_uid() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    tv.upsert_app_tree("x", &simple_tree());
    tv.set_selected_index(1);
    tv.toggle_selection();

    tv.upsert_app_tree("x", &simple_tree());
    assert_eq!(tv.selection_count(), 1, "same UID keeps its selection");

    let without_deployment = ResourceTree {
        nodes: vec![node("other", "Service", "svc", "Healthy", None)],
    };
    tv.upsert_app_tree("x", &without_deployment);
    assert_eq!(tv.selection_count(), 0, "stale selections are pruned");
}

#[test]
fn test_filter_matches_and_traversal() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    let tree = ResourceTree {
        nodes: vec![
            node("r1", "ConfigMap", "alpha", "Healthy", None),
            node("r2", "ConfigMap", "beta", "Missing", None),
            node("r3", "Service", "alpha-svc", "Healthy", None),
        ],
    };
    tv.upsert_app_tree("x", &tree);

    tv.set_filter("alpha");
    assert_eq!(tv.match_count(), 2);
    assert!(tv.jump_to_first_match());
    let first = tv.selected_index();
    assert!(tv.next_match());
    assert_ne!(tv.selected_index(), first);
    assert!(tv.next_match());
    assert_eq!(tv.selected_index(), first, "match traversal wraps around");
    assert!(tv.prev_match());
    assert_eq!(tv.current_match_number(), 2);

    // Status text matches too
    tv.set_filter("missing");
    assert_eq!(tv.match_count(), 1);

    tv.clear_filter();
    assert_eq!(tv.match_count(), 0);
}

#[test]
fn test_statuses_merge_by_identity() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    tv.upsert_app_tree("x", &simple_tree());

    let statuses = vec![ResourceStatus {
        group: String::new(),
        kind: "Deployment".to_string(),
        namespace: "prod".to_string(),
        name: "web".to_string(),
        status: "OutOfSync".to_string(),
    }];
    tv.set_resource_statuses("x", &statuses);

    tv.set_selected_index(1);
    let sel = tv.get_selected_resources();
    assert_eq!(sel[0].status, "OutOfSync");
}

#[test]
fn test_cursor_follows_uid_across_rebuilds() {
    let mut tv = TreeView::new();
    tv.set_app_meta("x", "Healthy", "Synced");
    tv.upsert_app_tree("x", &simple_tree());
    tv.set_selected_index(2); // ReplicaSet

    // A new sibling sorts ahead of the previous cursor position
    let bigger = ResourceTree {
        nodes: vec![
            node("d0", "DaemonSet", "agent", "Healthy", None),
            node("d1", "Deployment", "web", "Healthy", None),
            node("r1", "ReplicaSet", "web-1", "Healthy", Some("d1")),
            node("p1", "Pod", "web-1-a", "Healthy", Some("r1")),
        ],
    };
    tv.upsert_app_tree("x", &bigger);
    let sel = tv.get_selected_resources();
    assert_eq!(sel[0].kind, "ReplicaSet", "cursor stays on the same UID");
}
