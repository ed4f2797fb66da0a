//! Client-side diff of managed resources
//!
//! ArgoCD's managed-resources endpoint returns the rendered target state and
//! the normalized live state as JSON strings. The diff view compares them
//! line by line after converting both to YAML.

use crate::api::ManagedResource;

/// One line of rendered diff output.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineKind {
    Header,
    Context,
    Added,
    Removed,
}

/// Build the diff lines for a set of managed resources. Resources whose
/// target and live states are identical contribute nothing. Returns an empty
/// vec when everything is in sync.
pub fn build_diff(resources: &[ManagedResource]) -> Vec<DiffLine> {
    let mut out: Vec<DiffLine> = Vec::new();
    for res in resources {
        let target = render_state(res.target_state.as_deref());
        let live = render_state(res.normalized_live_state.as_deref());
        if target == live {
            continue;
        }
        let header = if res.group.is_empty() {
            format!("{} {}/{}", res.kind, res.namespace, res.name)
        } else {
            format!("{}.{} {}/{}", res.kind, res.group, res.namespace, res.name)
        };
        out.push(DiffLine {
            kind: DiffLineKind::Header,
            text: format!("=== {}", header),
        });
        out.extend(diff_lines(&live, &target));
        out.push(DiffLine {
            kind: DiffLineKind::Context,
            text: String::new(),
        });
    }
    out
}

fn render_state(state: Option<&str>) -> String {
    let Some(raw) = state else {
        return String::new();
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) if !value.is_null() => serde_yaml::to_string(&value).unwrap_or_default(),
        _ => String::new(),
    }
}

/// Line-based LCS diff between two texts.
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffLine> {
    let old_lines: Vec<&str> = if old.is_empty() {
        Vec::new()
    } else {
        old.lines().collect()
    };
    let new_lines: Vec<&str> = if new.is_empty() {
        Vec::new()
    } else {
        new.lines().collect()
    };

    let n = old_lines.len();
    let m = new_lines.len();
    // LCS length table
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if old_lines[i] == new_lines[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old_lines[i] == new_lines[j] {
            out.push(DiffLine {
                kind: DiffLineKind::Context,
                text: format!("  {}", old_lines[i]),
            });
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            out.push(DiffLine {
                kind: DiffLineKind::Removed,
                text: format!("- {}", old_lines[i]),
            });
            i += 1;
        } else {
            out.push(DiffLine {
                kind: DiffLineKind::Added,
                text: format!("+ {}", new_lines[j]),
            });
            j += 1;
        }
    }
    for line in &old_lines[i..] {
        out.push(DiffLine {
            kind: DiffLineKind::Removed,
            text: format!("- {}", line),
        });
    }
    for line in &new_lines[j..] {
        out.push(DiffLine {
            kind: DiffLineKind::Added,
            text: format!("+ {}", line),
        });
    }
    out
}
