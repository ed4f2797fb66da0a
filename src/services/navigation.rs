//! Drill-down navigation rules
//!
//! Encodes how Enter moves down the hierarchy (adding to the scope sets) and
//! the bookkeeping that keeps cursor and lower-level selections consistent.
//! The escape-up rules live with the key handlers; bounds validation and
//! cascade-clearing live here so both directions share them.

use crate::tui::app::state::{Selections, View};
use std::collections::HashSet;

/// Outcome of a drill-down: the new view plus scope-set overrides.
#[derive(Debug, Default)]
pub struct NavigationResult {
    pub new_view: Option<View>,
    pub scope_clusters: Option<HashSet<String>>,
    pub scope_namespaces: Option<HashSet<String>>,
    pub scope_projects: Option<HashSet<String>>,
    pub scope_app_sets: Option<HashSet<String>>,
    /// Reset cursor and transient filters after the move
    pub reset_navigation: bool,
    /// Cascade-clear scopes below the view we drilled from
    pub clear_lower_level_selections: bool,
}

pub struct NavigationService;

impl NavigationService {
    /// Drill down from `view` on the named item. Apps→Tree is handled by the
    /// resource-opening path, not here.
    pub fn drill_down(view: View, item: &str, selections: &Selections) -> Option<NavigationResult> {
        let mut result = NavigationResult {
            reset_navigation: true,
            clear_lower_level_selections: true,
            ..Default::default()
        };
        match view {
            View::Clusters => {
                let mut set = selections.scope_clusters.clone();
                set.insert(item.to_string());
                result.scope_clusters = Some(set);
                result.new_view = Some(View::Namespaces);
            }
            View::Namespaces => {
                let mut set = selections.scope_namespaces.clone();
                set.insert(item.to_string());
                result.scope_namespaces = Some(set);
                result.new_view = Some(View::Projects);
            }
            View::Projects => {
                let mut set = selections.scope_projects.clone();
                set.insert(item.to_string());
                result.scope_projects = Some(set);
                result.new_view = Some(View::Apps);
            }
            View::ApplicationSets => {
                let mut set = selections.scope_app_sets.clone();
                set.insert(item.to_string());
                result.scope_app_sets = Some(set);
                result.new_view = Some(View::Apps);
            }
            View::Apps | View::Tree => return None,
        }
        Some(result)
    }

    /// Clamp a cursor index to `[0, count)`, 0 when the list is empty.
    pub fn validate_bounds(idx: usize, count: usize) -> usize {
        if count == 0 {
            0
        } else {
            idx.min(count - 1)
        }
    }

    /// Cascade-clear every scope below `from_view`, plus the checked apps.
    pub fn clear_lower_level_selections(from_view: View, selections: &mut Selections) {
        match from_view {
            View::Clusters => {
                selections.scope_namespaces.clear();
                selections.scope_projects.clear();
                selections.selected_apps.clear();
            }
            View::Namespaces => {
                selections.scope_projects.clear();
                selections.selected_apps.clear();
            }
            View::Projects | View::ApplicationSets => {
                selections.selected_apps.clear();
            }
            View::Apps | View::Tree => {}
        }
    }
}
