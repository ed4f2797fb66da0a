//! ArgoCD API module
//!
//! Domain types for the ArgoCD REST API plus a thin HTTP client.
//! Only the fields the TUI consumes are deserialized; everything else
//! in the server payloads is ignored.

mod client;
mod error;

pub use client::*;
pub use error::*;

use serde::Deserialize;

/// A single ArgoCD Application as the TUI sees it.
///
/// Flattened from the Application CR: identity, destination, project and the
/// top-level sync/health summary.
#[derive(Debug, Clone, PartialEq)]
pub struct AppItem {
    pub name: String,
    /// Namespace the Application CR itself lives in (None = default argocd ns)
    pub app_namespace: Option<String>,
    pub project: String,
    /// Destination namespace resources are deployed into
    pub namespace: String,
    /// Human label for the destination cluster (destination.name or server URL)
    pub cluster_label: String,
    /// Identifier used for kubeconfig context matching (destination.name)
    pub cluster_id: Option<String>,
    pub sync_status: String,
    pub health_status: String,
    /// Owning ApplicationSet, when generated by one
    pub app_set: Option<String>,
    pub last_synced_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl AppItem {
    /// Parse an Application object from the API JSON representation.
    pub fn from_json(obj: &serde_json::Value) -> Option<Self> {
        let metadata = obj.get("metadata")?;
        let name = metadata.get("name")?.as_str()?.to_string();
        let app_namespace = metadata
            .get("namespace")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let app_set = metadata
            .get("ownerReferences")
            .and_then(|v| v.as_array())
            .and_then(|refs| {
                refs.iter().find(|r| {
                    r.get("kind").and_then(|k| k.as_str()) == Some("ApplicationSet")
                })
            })
            .and_then(|r| r.get("name"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let spec = obj.get("spec")?;
        let project = spec
            .get("project")
            .and_then(|v| v.as_str())
            .unwrap_or("default")
            .to_string();
        let dest = spec.get("destination");
        let dest_name = dest
            .and_then(|d| d.get("name"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let dest_server = dest
            .and_then(|d| d.get("server"))
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let cluster_label = dest_name.clone().unwrap_or_else(|| dest_server.to_string());
        let namespace = dest
            .and_then(|d| d.get("namespace"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let status = obj.get("status");
        let sync_status = status
            .and_then(|s| s.get("sync"))
            .and_then(|s| s.get("status"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string();
        let health_status = status
            .and_then(|s| s.get("health"))
            .and_then(|s| s.get("status"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string();
        let last_synced_at = status
            .and_then(|s| s.get("operationState"))
            .and_then(|o| o.get("finishedAt"))
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok());

        Some(Self {
            name,
            app_namespace,
            project,
            namespace,
            cluster_label,
            cluster_id: dest_name,
            sync_status,
            health_status,
            app_set,
            last_synced_at,
        })
    }
}

/// One node of an application's live resource tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    pub uid: String,
    #[serde(default)]
    pub parent_refs: Vec<ParentRef>,
    #[serde(default)]
    pub health: Option<HealthSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParentRef {
    pub uid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthSummary {
    #[serde(default)]
    pub status: Option<String>,
}

/// The resource tree snapshot returned by the resource-tree endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceTree {
    #[serde(default)]
    pub nodes: Vec<ResourceNode>,
}

/// Per-resource sync status (merged into tree nodes by group/kind/ns/name).
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceStatus {
    #[serde(default)]
    pub group: String,
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
}

impl ResourceStatus {
    /// Extract the per-resource statuses from an Application JSON object.
    pub fn from_app_json(obj: &serde_json::Value) -> Vec<ResourceStatus> {
        obj.get("status")
            .and_then(|s| s.get("resources"))
            .and_then(|r| r.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| serde_json::from_value(i.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One row of an application's deployment history, used by rollback.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionRow {
    pub id: i64,
    pub revision: String,
    pub deployed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub source: String,
}

/// Identifies a single resource for sync or delete operations.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRef {
    pub app_name: String,
    pub group: String,
    pub version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

/// A managed resource with its rendered target and live states (for diff).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedResource {
    #[serde(default)]
    pub group: String,
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    /// JSON-encoded desired state
    #[serde(default)]
    pub target_state: Option<String>,
    /// JSON-encoded live state after normalization
    #[serde(default)]
    pub normalized_live_state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_app_item_from_json() {
        let obj = json!({
            "metadata": {
                "name": "guestbook",
                "namespace": "argocd",
                "ownerReferences": [
                    {"kind": "ApplicationSet", "name": "apps-of-apps"}
                ]
            },
            "spec": {
                "project": "default",
                "destination": {"server": "https://kubernetes.default.svc", "namespace": "prod"}
            },
            "status": {
                "sync": {"status": "Synced"},
                "health": {"status": "Healthy"}
            }
        });
        let app = AppItem::from_json(&obj).expect("should parse");
        assert_eq!(app.name, "guestbook");
        assert_eq!(app.project, "default");
        assert_eq!(app.namespace, "prod");
        assert_eq!(app.cluster_label, "https://kubernetes.default.svc");
        assert_eq!(app.cluster_id, None);
        assert_eq!(app.sync_status, "Synced");
        assert_eq!(app.app_set.as_deref(), Some("apps-of-apps"));
    }

    #[test]
    fn test_app_item_prefers_destination_name() {
        let obj = json!({
            "metadata": {"name": "x"},
            "spec": {"destination": {"name": "prod-east", "server": "https://1.2.3.4", "namespace": "ns"}},
            "status": {}
        });
        let app = AppItem::from_json(&obj).unwrap();
        assert_eq!(app.cluster_label, "prod-east");
        assert_eq!(app.cluster_id.as_deref(), Some("prod-east"));
        assert_eq!(app.sync_status, "Unknown");
    }

    #[test]
    fn test_resource_statuses_from_app_json() {
        let obj = json!({
            "status": {
                "resources": [
                    {"group": "apps", "kind": "Deployment", "namespace": "prod", "name": "web", "status": "OutOfSync"},
                    {"kind": "Service", "namespace": "prod", "name": "web"}
                ]
            }
        });
        let statuses = ResourceStatus::from_app_json(&obj);
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].status, "OutOfSync");
        assert_eq!(statuses[1].status, "");
    }
}
