//! Interactive resource tree
//!
//! Renders the live resource graph of one or more applications as a single
//! expandable tree. Each application gets a synthetic root node carrying the
//! app's sync and health summary; node keys are scoped with the application
//! name so multiple apps can share the view without UID collisions.

use crate::api::{ResourceRef, ResourceStatus, ResourceTree};
use crate::tui::theme::Theme;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use std::collections::{HashMap, HashSet};

const APP_ROOT_UID: &str = "__app_root__";

/// A resource picked out of the tree for a batch operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSelection {
    pub app_name: String,
    pub group: String,
    pub version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub status: String,
    pub health: String,
}

impl ResourceSelection {
    /// True when sync or health reports Missing (case-insensitive, trimmed).
    pub fn is_missing(&self) -> bool {
        is_missing_str(&self.status) || is_missing_str(&self.health)
    }

    pub fn to_resource_ref(&self) -> ResourceRef {
        ResourceRef {
            app_name: self.app_name.clone(),
            group: self.group.clone(),
            version: self.version.clone(),
            kind: self.kind.clone(),
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }
}

fn is_missing_str(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("missing")
}

#[derive(Debug, Clone)]
struct TreeNode {
    key: String,
    group: String,
    version: String,
    kind: String,
    name: String,
    namespace: String,
    status: String,
    health: String,
    parent: Option<String>,
    children: Vec<String>,
}

/// Interactive tree over one or more application resource graphs.
#[derive(Debug, Default)]
pub struct TreeView {
    nodes: HashMap<String, TreeNode>,
    nodes_by_app: HashMap<String, Vec<String>>,
    root_by_app: HashMap<String, String>,
    roots: Vec<String>,
    expanded: HashSet<String>,
    /// Visible node keys in DFS order over expanded nodes
    order: Vec<String>,
    sel_idx: usize,
    selected_key: Option<String>,

    app_meta: HashMap<String, (String, String)>, // app -> (health, sync)

    filter_query: String,
    match_indices: Vec<usize>,
    current_match: usize,

    /// Keys explicitly selected with Space
    selected_keys: HashSet<String>,

    /// Highlight only selections, scoped to the label text
    desaturate: bool,
    /// Highlight every row with the success color (refresh feedback)
    flash_all: bool,
}

impl TreeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the app-level sync+health shown on the synthetic root.
    pub fn set_app_meta(&mut self, app_name: &str, health: &str, sync: &str) {
        self.app_meta
            .insert(app_name.to_string(), (health.to_string(), sync.to_string()));
        if let Some(root_key) = self.root_by_app.get(app_name) {
            if let Some(node) = self.nodes.get_mut(root_key) {
                node.health = health.to_string();
                node.status = sync.to_string();
            }
        }
    }

    /// Replace (or add) one application's subtree.
    pub fn upsert_app_tree(&mut self, app_name: &str, tree: &ResourceTree) {
        // Drop the previous generation of this app's nodes
        if let Some(keys) = self.nodes_by_app.remove(app_name) {
            for k in keys {
                self.nodes.remove(&k);
                self.expanded.remove(&k);
            }
        }
        if let Some(old_root) = self.root_by_app.remove(app_name) {
            self.roots.retain(|r| *r != old_root);
        }

        let make_key = |uid: &str| format!("{}::{}", app_name, uid);

        let mut app_keys: Vec<String> = Vec::with_capacity(tree.nodes.len() + 1);
        for n in &tree.nodes {
            let key = make_key(&n.uid);
            let node = TreeNode {
                key: key.clone(),
                group: n.group.clone(),
                version: n.version.clone(),
                kind: n.kind.clone(),
                name: n.name.clone(),
                namespace: n.namespace.clone().unwrap_or_default(),
                status: String::new(),
                health: n
                    .health
                    .as_ref()
                    .and_then(|h| h.status.clone())
                    .unwrap_or_default(),
                parent: None,
                children: Vec::new(),
            };
            self.nodes.insert(key.clone(), node);
            app_keys.push(key);
        }

        // Link parent/child within this app
        for n in &tree.nodes {
            let child_key = make_key(&n.uid);
            for parent_ref in &n.parent_refs {
                let parent_key = make_key(&parent_ref.uid);
                if parent_key == child_key || !self.nodes.contains_key(&parent_key) {
                    continue;
                }
                if let Some(child) = self.nodes.get_mut(&child_key) {
                    child.parent = Some(parent_key.clone());
                }
                if let Some(parent) = self.nodes.get_mut(&parent_key) {
                    parent.children.push(child_key.clone());
                }
            }
        }

        self.break_parent_cycles(&app_keys);

        // Collect roots for this app
        let mut temp_roots: Vec<String> = app_keys
            .iter()
            .filter(|k| self.nodes.get(*k).is_some_and(|n| n.parent.is_none()))
            .cloned()
            .collect();

        // ArgoCD sometimes includes the Application CR itself in the snapshot;
        // drop it and promote its children so the synthetic root isn't doubled.
        let mut promoted: Vec<String> = Vec::new();
        temp_roots.retain(|k| {
            let is_dup = self
                .nodes
                .get(k)
                .is_some_and(|n| n.kind == "Application" && n.name == app_name);
            if is_dup {
                if let Some(node) = self.nodes.remove(k) {
                    for child_key in node.children {
                        if let Some(child) = self.nodes.get_mut(&child_key) {
                            child.parent = None;
                        }
                        promoted.push(child_key);
                    }
                }
                self.expanded.remove(k);
            }
            !is_dup
        });
        temp_roots.extend(promoted);
        app_keys.retain(|k| self.nodes.contains_key(k));

        self.sort_sibling_keys(&mut temp_roots);
        let child_lists: Vec<String> = app_keys.clone();
        for key in &child_lists {
            let mut children = match self.nodes.get(key) {
                Some(n) if !n.children.is_empty() => n.children.clone(),
                _ => continue,
            };
            self.sort_sibling_keys(&mut children);
            if let Some(n) = self.nodes.get_mut(key) {
                n.children = children;
            }
        }

        // Synthetic application root
        let (health, sync) = self
            .app_meta
            .get(app_name)
            .cloned()
            .unwrap_or_default();
        let root_key = make_key(APP_ROOT_UID);
        let mut root = TreeNode {
            key: root_key.clone(),
            group: String::new(),
            version: String::new(),
            kind: "Application".to_string(),
            name: app_name.to_string(),
            namespace: String::new(),
            status: sync,
            health,
            parent: None,
            children: Vec::new(),
        };
        for r in &temp_roots {
            if let Some(n) = self.nodes.get_mut(r) {
                n.parent = Some(root_key.clone());
            }
            root.children.push(r.clone());
        }
        self.nodes.insert(root_key.clone(), root);
        self.root_by_app
            .insert(app_name.to_string(), root_key.clone());
        self.roots.push(root_key.clone());
        app_keys.push(root_key);
        self.nodes_by_app.insert(app_name.to_string(), app_keys.clone());

        // New nodes start expanded
        for k in &app_keys {
            self.expanded.insert(k.clone());
        }

        // Stable root ordering by app name
        let nodes = &self.nodes;
        self.roots
            .sort_by(|a, b| {
                let an = nodes.get(a).map(|n| n.name.as_str()).unwrap_or_default();
                let bn = nodes.get(b).map(|n| n.name.as_str()).unwrap_or_default();
                an.cmp(bn)
            });

        self.rebuild_order();
    }

    /// Remove one application's subtree entirely.
    pub fn remove_app(&mut self, app_name: &str) {
        if let Some(keys) = self.nodes_by_app.remove(app_name) {
            for k in keys {
                self.nodes.remove(&k);
                self.expanded.remove(&k);
                self.selected_keys.remove(&k);
            }
        }
        if let Some(root) = self.root_by_app.remove(app_name) {
            self.roots.retain(|r| *r != root);
        }
        self.roots.retain(|r| self.nodes.contains_key(r));
        self.rebuild_order();
    }

    /// Clear everything (used when opening a fresh tree view).
    pub fn clear(&mut self) {
        *self = TreeView {
            app_meta: std::mem::take(&mut self.app_meta),
            ..TreeView::default()
        };
    }

    /// Merge per-resource sync statuses, matched by (group, kind, ns, name).
    pub fn set_resource_statuses(&mut self, app_name: &str, resources: &[ResourceStatus]) {
        let status_by_key: HashMap<(&str, &str, &str, &str), &str> = resources
            .iter()
            .map(|r| {
                (
                    (
                        r.group.as_str(),
                        r.kind.as_str(),
                        r.namespace.as_str(),
                        r.name.as_str(),
                    ),
                    r.status.as_str(),
                )
            })
            .collect();

        if let Some(keys) = self.nodes_by_app.get(app_name) {
            for key in keys {
                if let Some(node) = self.nodes.get_mut(key) {
                    let lookup = (
                        node.group.as_str(),
                        node.kind.as_str(),
                        node.namespace.as_str(),
                        node.name.as_str(),
                    );
                    if let Some(status) = status_by_key.get(&lookup) {
                        node.status = status.to_string();
                    }
                }
            }
        }
    }

    fn sort_sibling_keys(&self, keys: &mut [String]) {
        keys.sort_by(|a, b| {
            let an = self.nodes.get(a);
            let bn = self.nodes.get(b);
            match (an, bn) {
                (Some(a), Some(b)) => a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)),
                _ => std::cmp::Ordering::Equal,
            }
        });
    }

    // A node whose parent chain revisits itself is flattened to a root.
    // Malformed snapshots shouldn't be able to hang the DFS.
    fn break_parent_cycles(&mut self, app_keys: &[String]) {
        for key in app_keys {
            let mut seen: HashSet<&str> = HashSet::new();
            let mut cursor = key.as_str();
            let mut cyclic = false;
            while let Some(parent) = self.nodes.get(cursor).and_then(|n| n.parent.as_deref()) {
                if !seen.insert(cursor) {
                    cyclic = true;
                    break;
                }
                cursor = parent;
            }
            if cyclic {
                tracing::warn!("resource tree has a parent cycle at {}; flattening", key);
                if let Some(parent_key) =
                    self.nodes.get(key).and_then(|n| n.parent.clone())
                {
                    if let Some(parent) = self.nodes.get_mut(&parent_key) {
                        parent.children.retain(|c| c != key);
                    }
                }
                if let Some(node) = self.nodes.get_mut(key) {
                    node.parent = None;
                }
            }
        }
    }

    fn rebuild_order(&mut self) {
        let previous_selection = self.selected_key.clone();
        self.order.clear();
        let mut stack_order: Vec<String> = Vec::new();

        fn walk(
            nodes: &HashMap<String, TreeNode>,
            expanded: &HashSet<String>,
            key: &str,
            out: &mut Vec<String>,
        ) {
            out.push(key.to_string());
            if expanded.contains(key) {
                if let Some(node) = nodes.get(key) {
                    for child in &node.children {
                        walk(nodes, expanded, child, out);
                    }
                }
            }
        }

        for root in &self.roots {
            walk(&self.nodes, &self.expanded, root, &mut stack_order);
        }
        self.order = stack_order;

        // Prune stale explicit selections
        self.selected_keys.retain(|k| self.nodes.contains_key(k));

        // Restore the cursor to the same UID when it survived the rebuild
        if let Some(prev) = previous_selection {
            if let Some(idx) = self.order.iter().position(|k| *k == prev) {
                self.sel_idx = idx;
            }
        }
        if self.sel_idx >= self.order.len() {
            self.sel_idx = self.order.len().saturating_sub(1);
        }
        self.selected_key = self.order.get(self.sel_idx).cloned();

        self.rebuild_matches();
    }

    // Cursor movement

    pub fn selected_index(&self) -> usize {
        self.sel_idx
    }

    pub fn set_selected_index(&mut self, idx: usize) {
        if self.order.is_empty() {
            self.sel_idx = 0;
            self.selected_key = None;
            return;
        }
        self.sel_idx = idx.min(self.order.len() - 1);
        self.selected_key = self.order.get(self.sel_idx).cloned();
    }

    /// Collapse the current node, or move to its parent when already
    /// collapsed or childless.
    pub fn collapse_or_parent(&mut self) {
        let Some(key) = self.order.get(self.sel_idx).cloned() else {
            return;
        };
        let has_children = self
            .nodes
            .get(&key)
            .is_some_and(|n| !n.children.is_empty());
        if has_children && self.expanded.contains(&key) {
            self.expanded.remove(&key);
            self.rebuild_order();
        } else if let Some(parent) = self.nodes.get(&key).and_then(|n| n.parent.clone()) {
            if let Some(idx) = self.order.iter().position(|k| *k == parent) {
                self.set_selected_index(idx);
            }
        }
    }

    /// Expand the current node if it has children.
    pub fn expand_current(&mut self) {
        let Some(key) = self.order.get(self.sel_idx).cloned() else {
            return;
        };
        if self
            .nodes
            .get(&key)
            .is_some_and(|n| !n.children.is_empty())
        {
            self.expanded.insert(key);
            self.rebuild_order();
        }
    }

    pub fn expand_all(&mut self) {
        let keys: Vec<String> = self.nodes.keys().cloned().collect();
        for k in keys {
            self.expanded.insert(k);
        }
        self.rebuild_order();
    }

    pub fn collapse_all(&mut self) {
        // Keep the roots themselves expanded-collapsed state: collapse
        // everything below the synthetic roots
        let keys: Vec<String> = self
            .nodes
            .values()
            .filter(|n| n.parent.is_some())
            .map(|n| n.key.clone())
            .collect();
        for k in keys {
            self.expanded.remove(&k);
        }
        self.rebuild_order();
    }

    // Counts

    /// Number of visible nodes in DFS order.
    pub fn visible_count(&self) -> usize {
        self.order.len()
    }

    /// Number of rendered lines: nodes plus one blank separator between
    /// consecutive app roots.
    pub fn visible_line_count(&self) -> usize {
        let roots = self.order_root_count();
        self.order.len() + roots.saturating_sub(1)
    }

    /// Rendered line index of the cursor, accounting for separators.
    pub fn selected_line_index(&self) -> usize {
        if self.sel_idx == 0 || self.order.is_empty() {
            return 0;
        }
        let sel = self.sel_idx.min(self.order.len() - 1);
        let mut gaps = 0;
        for key in self.order.iter().take(sel + 1).skip(1) {
            if self.nodes.get(key).is_some_and(|n| n.parent.is_none()) {
                gaps += 1;
            }
        }
        sel + gaps
    }

    fn order_root_count(&self) -> usize {
        self.order
            .iter()
            .filter(|k| self.nodes.get(*k).is_some_and(|n| n.parent.is_none()))
            .count()
    }

    // Filter / search

    pub fn set_filter(&mut self, query: &str) {
        self.filter_query = query.trim().to_string();
        self.rebuild_matches();
    }

    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.match_indices.clear();
        self.current_match = 0;
    }

    pub fn filter(&self) -> &str {
        &self.filter_query
    }

    pub fn match_count(&self) -> usize {
        self.match_indices.len()
    }

    /// 1-based position of the current match, for the status line.
    pub fn current_match_number(&self) -> usize {
        if self.match_indices.is_empty() {
            0
        } else {
            self.current_match + 1
        }
    }

    pub fn next_match(&mut self) -> bool {
        if self.match_indices.is_empty() {
            return false;
        }
        self.current_match = (self.current_match + 1) % self.match_indices.len();
        self.set_selected_index(self.match_indices[self.current_match]);
        true
    }

    pub fn prev_match(&mut self) -> bool {
        if self.match_indices.is_empty() {
            return false;
        }
        self.current_match = self
            .current_match
            .checked_sub(1)
            .unwrap_or(self.match_indices.len() - 1);
        self.set_selected_index(self.match_indices[self.current_match]);
        true
    }

    pub fn jump_to_first_match(&mut self) -> bool {
        if self.match_indices.is_empty() {
            return false;
        }
        self.current_match = 0;
        self.set_selected_index(self.match_indices[0]);
        true
    }

    fn rebuild_matches(&mut self) {
        self.match_indices.clear();
        self.current_match = 0;
        if self.filter_query.is_empty() {
            return;
        }
        let query = self.filter_query.to_lowercase();
        for (i, key) in self.order.iter().enumerate() {
            if let Some(node) = self.nodes.get(key) {
                if node_matches(node, &query) {
                    self.match_indices.push(i);
                }
            }
        }
    }

    // Multi-selection

    /// Toggle selection on the cursor node. Returns false when the node is
    /// not selectable (Application roots, Missing resources).
    pub fn toggle_selection(&mut self) -> bool {
        let Some(key) = self.order.get(self.sel_idx).cloned() else {
            return false;
        };
        let Some(node) = self.nodes.get(&key) else {
            return false;
        };
        if node.kind == "Application" || node_is_missing(node) {
            return false;
        }
        if !self.selected_keys.remove(&key) {
            self.selected_keys.insert(key);
        }
        true
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_keys.is_empty()
    }

    pub fn selection_count(&self) -> usize {
        self.selected_keys.len()
    }

    pub fn clear_selection(&mut self) {
        self.selected_keys.clear();
    }

    pub fn is_selected_index(&self, idx: usize) -> bool {
        self.order
            .get(idx)
            .is_some_and(|k| self.selected_keys.contains(k))
    }

    /// True when the cursor node reports Missing.
    pub fn current_resource_is_missing(&self) -> bool {
        self.order
            .get(self.sel_idx)
            .and_then(|k| self.nodes.get(k))
            .is_some_and(node_is_missing)
    }

    /// The cursor node as (group, kind, namespace, name), if any.
    pub fn selected_resource(&self) -> Option<(String, String, String, String)> {
        let node = self.order.get(self.sel_idx).and_then(|k| self.nodes.get(k))?;
        Some((
            node.group.clone(),
            node.kind.clone(),
            node.namespace.clone(),
            node.name.clone(),
        ))
    }

    /// App name owning the cursor node (from the scoped key).
    pub fn selected_app_name(&self) -> Option<String> {
        self.order
            .get(self.sel_idx)
            .map(|k| app_name_of_key(k))
    }

    /// First app shown in the view, by root order.
    pub fn first_app_name(&self) -> Option<String> {
        self.roots.first().map(|k| app_name_of_key(k))
    }

    /// Explicit selections when present; otherwise the cursor node unless it
    /// is an Application root.
    pub fn get_selected_resources(&self) -> Vec<ResourceSelection> {
        if !self.selected_keys.is_empty() {
            let mut result: Vec<ResourceSelection> = self
                .selected_keys
                .iter()
                .filter_map(|k| self.nodes.get(k))
                .map(|n| self.to_selection(n))
                .collect();
            result.sort_by(|a, b| {
                a.app_name
                    .cmp(&b.app_name)
                    .then_with(|| a.kind.cmp(&b.kind))
                    .then_with(|| a.name.cmp(&b.name))
            });
            return result;
        }

        self.order
            .get(self.sel_idx)
            .and_then(|k| self.nodes.get(k))
            .filter(|n| n.kind != "Application")
            .map(|n| vec![self.to_selection(n)])
            .unwrap_or_default()
    }

    fn to_selection(&self, node: &TreeNode) -> ResourceSelection {
        ResourceSelection {
            app_name: app_name_of_key(&node.key),
            group: node.group.clone(),
            version: node.version.clone(),
            kind: node.kind.clone(),
            namespace: node.namespace.clone(),
            name: node.name.clone(),
            status: node.status.clone(),
            health: node.health.clone(),
        }
    }

    // Presentation toggles

    pub fn set_desaturate(&mut self, enabled: bool) {
        self.desaturate = enabled;
    }

    pub fn set_flash_all(&mut self, enabled: bool) {
        self.flash_all = enabled;
    }

    pub fn flash_all(&self) -> bool {
        self.flash_all
    }

    // Rendering

    /// Render the visible tree as styled lines, blank separators included.
    pub fn render_lines(&self, theme: &Theme, width: usize) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::with_capacity(self.visible_line_count());
        if self.order.is_empty() {
            lines.push(Line::from(Span::styled(
                "(no resources)",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        }

        let current_match_idx = self
            .match_indices
            .get(self.current_match)
            .copied()
            .unwrap_or(usize::MAX);

        for (i, key) in self.order.iter().enumerate() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            if node.parent.is_none() && i > 0 {
                lines.push(Line::default());
            }

            let prefix = self.prefix_for(node);
            let collapsed_hint = if !node.children.is_empty() && !self.expanded.contains(key) {
                let hidden = self.count_descendants(key);
                format!(" (+{})", hidden)
            } else {
                String::new()
            };
            let disclosure = if !node.children.is_empty() && !self.expanded.contains(key) {
                "▸ "
            } else {
                ""
            };

            let is_cursor = i == self.sel_idx;
            let is_selected = self.selected_keys.contains(key);
            let is_match = !self.filter_query.is_empty() && self.match_indices.contains(&i);
            let is_current_match = is_match && i == current_match_idx;

            let row_bg: Option<Color> = if self.flash_all {
                Some(theme.tree_flash_bg)
            } else if self.desaturate {
                // Only explicit selections keep a highlight in desaturate mode
                if is_selected {
                    Some(theme.tree_selected_bg)
                } else {
                    None
                }
            } else if is_cursor && is_selected {
                Some(theme.tree_cursor_selected_bg)
            } else if is_cursor {
                Some(theme.table_selected_bg)
            } else if is_selected {
                Some(theme.tree_selected_bg)
            } else if is_current_match {
                Some(theme.tree_match_current_bg)
            } else if is_match {
                Some(theme.tree_match_bg)
            } else {
                None
            };

            let name = if node.namespace.is_empty() {
                node.name.clone()
            } else {
                format!("{}/{}", node.namespace, node.name)
            };

            let mut spans: Vec<Span<'static>> = Vec::new();
            spans.push(Span::styled(
                format!("{}{}", prefix, disclosure),
                Style::default().fg(theme.text_primary),
            ));
            spans.push(Span::styled(
                node.kind.clone(),
                Style::default().fg(theme.text_primary),
            ));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("[{}]", name),
                Style::default().fg(theme.text_dim),
            ));
            if let Some(status_spans) = self.status_spans(node, theme) {
                spans.push(Span::raw(" "));
                spans.extend(status_spans);
            }
            if !collapsed_hint.is_empty() {
                spans.push(Span::styled(
                    collapsed_hint,
                    Style::default().fg(theme.text_dim),
                ));
            }

            if let Some(bg) = row_bg {
                for span in &mut spans {
                    span.style = span.style.bg(bg);
                }
                // In desaturate mode the highlight stays scoped to the text
                if !self.desaturate {
                    let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
                    if used < width {
                        spans.push(Span::styled(
                            " ".repeat(width - used),
                            Style::default().bg(bg),
                        ));
                    }
                }
            }

            lines.push(Line::from(spans));
        }
        lines
    }

    fn status_spans(&self, node: &TreeNode, theme: &Theme) -> Option<Vec<Span<'static>>> {
        let health = node.health.as_str();
        let sync = node.status.as_str();
        let dim = Style::default().fg(theme.text_dim);
        if !health.is_empty() && !sync.is_empty() && !health.eq_ignore_ascii_case(sync) {
            Some(vec![
                Span::styled("(", dim),
                Span::styled(health.to_string(), theme.status_style(health)),
                Span::styled(", ", dim),
                Span::styled(sync.to_string(), theme.status_style(sync)),
                Span::styled(")", dim),
            ])
        } else if !health.is_empty() {
            Some(vec![
                Span::styled("(", dim),
                Span::styled(health.to_string(), theme.status_style(health)),
                Span::styled(")", dim),
            ])
        } else if !sync.is_empty() {
            Some(vec![
                Span::styled("(", dim),
                Span::styled(sync.to_string(), theme.status_style(sync)),
                Span::styled(")", dim),
            ])
        } else {
            None
        }
    }

    fn prefix_for(&self, node: &TreeNode) -> String {
        // Ancestry from the node up, excluding the synthetic root level
        let mut stack: Vec<&TreeNode> = Vec::new();
        let mut cursor = node.parent.as_deref();
        while let Some(key) = cursor {
            let Some(parent) = self.nodes.get(key) else {
                break;
            };
            stack.push(parent);
            cursor = parent.parent.as_deref();
        }
        stack.reverse();

        let mut prefix = String::new();
        for ancestor in &stack {
            if ancestor.parent.is_none() {
                continue;
            }
            if self.is_last_sibling(ancestor) {
                prefix.push_str("    ");
            } else {
                prefix.push_str("│   ");
            }
        }
        if node.parent.is_some() {
            if self.is_last_sibling(node) {
                prefix.push_str("└── ");
            } else {
                prefix.push_str("├── ");
            }
        }
        prefix
    }

    fn is_last_sibling(&self, node: &TreeNode) -> bool {
        let Some(parent_key) = node.parent.as_deref() else {
            return true;
        };
        self.nodes
            .get(parent_key)
            .and_then(|p| p.children.last())
            .is_some_and(|last| *last == node.key)
    }

    fn count_descendants(&self, key: &str) -> usize {
        let Some(node) = self.nodes.get(key) else {
            return 0;
        };
        node.children
            .iter()
            .map(|c| 1 + self.count_descendants(c))
            .sum()
    }
}

fn node_matches(node: &TreeNode, query: &str) -> bool {
    node.kind.to_lowercase().contains(query)
        || node.name.to_lowercase().contains(query)
        || node.namespace.to_lowercase().contains(query)
        || node.status.to_lowercase().contains(query)
        || node.health.to_lowercase().contains(query)
}

fn node_is_missing(node: &TreeNode) -> bool {
    is_missing_str(&node.status) || is_missing_str(&node.health)
}

fn app_name_of_key(key: &str) -> String {
    key.split_once("::")
        .map(|(app, _)| app.to_string())
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HealthSummary, ParentRef, ResourceNode};

    fn node(uid: &str, kind: &str, name: &str, parent: Option<&str>) -> ResourceNode {
        ResourceNode {
            group: String::new(),
            version: "v1".to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: Some("default".to_string()),
            uid: uid.to_string(),
            parent_refs: parent
                .map(|p| vec![ParentRef { uid: p.to_string() }])
                .unwrap_or_default(),
            health: Some(HealthSummary {
                status: Some("Healthy".to_string()),
            }),
        }
    }

    #[test]
    fn test_self_parent_flattened_to_root() {
        let mut tv = TreeView::new();
        let tree = ResourceTree {
            nodes: vec![node("a", "Deployment", "web", Some("a"))],
        };
        tv.upsert_app_tree("app", &tree);
        // synthetic root + the deployment
        assert_eq!(tv.visible_count(), 2);
    }

    #[test]
    fn test_parent_cycle_flattened() {
        let mut tv = TreeView::new();
        let tree = ResourceTree {
            nodes: vec![
                node("a", "Deployment", "web", Some("b")),
                node("b", "ReplicaSet", "web-1", Some("a")),
            ],
        };
        tv.upsert_app_tree("app", &tree);
        // Both nodes end up visible under the synthetic root
        assert_eq!(tv.visible_count(), 3);
    }

    #[test]
    fn test_collapsed_hint_counts_descendants() {
        let mut tv = TreeView::new();
        let tree = ResourceTree {
            nodes: vec![
                node("a", "Deployment", "web", None),
                node("b", "ReplicaSet", "web-1", Some("a")),
                node("c", "Pod", "web-1-x", Some("b")),
            ],
        };
        tv.upsert_app_tree("app", &tree);
        assert_eq!(tv.count_descendants("app::a"), 2);
    }
}
