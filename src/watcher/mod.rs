//! Watch coordinator
//!
//! Multiplexes the ArgoCD watch streams into the single event loop. One
//! applications watcher runs for the whole session (restarted when the
//! project scope changes); per-app resource-tree watchers run only while the
//! tree view is open. Every tree message carries the session counter active
//! when its watcher started, so events that race a cancellation are dropped
//! on receipt.

use crate::api::{classify, ApiError, AppItem, ArgoClient, ResourceStatus, ResourceTree, RevisionRow};
use crate::services::diff::DiffLine;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Error payload carried inside messages, pre-classified for mode routing.
#[derive(Debug, Clone)]
pub struct MsgError {
    pub kind: MsgErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgErrorKind {
    Auth,
    Connection,
    Other,
}

impl MsgError {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let kind = match classify(err) {
            Some(ApiError::Auth(_)) => MsgErrorKind::Auth,
            Some(ApiError::Connection(_)) => MsgErrorKind::Connection,
            _ => MsgErrorKind::Other,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Every message the event loop consumes besides key and resize events.
#[derive(Debug)]
pub enum AppMsg {
    /// Initial application list (or its failure)
    AppsLoaded {
        result: Result<Vec<AppItem>, MsgError>,
    },
    AppUpserted {
        app: AppItem,
    },
    AppRemoved {
        name: String,
    },
    AppsWatchError {
        error: MsgError,
    },

    TreeSnapshot {
        session: u64,
        app: String,
        tree: ResourceTree,
    },
    TreeStatuses {
        session: u64,
        app: String,
        statuses: Vec<ResourceStatus>,
    },
    TreeWatchError {
        session: u64,
        app: String,
        message: String,
    },

    SyncDone {
        session: u64,
        synced: Vec<String>,
        result: Result<(), MsgError>,
    },
    ResourceSyncDone {
        session: u64,
        result: Result<(), MsgError>,
    },
    HistoryLoaded {
        session: u64,
        result: Result<Vec<RevisionRow>, MsgError>,
    },
    RollbackDone {
        session: u64,
        result: Result<(), MsgError>,
    },
    AppsDeleted {
        session: u64,
        result: Result<(), MsgError>,
    },
    ResourcesDeleted {
        session: u64,
        result: Result<(), MsgError>,
    },
    RefreshDone {
        result: Result<usize, MsgError>,
    },
    DiffReady {
        session: u64,
        title: String,
        result: Result<Vec<DiffLine>, MsgError>,
    },
    UpgradeChecked {
        result: Result<Option<String>, String>,
    },

    Status {
        message: String,
    },
}

/// Watches the application list plus its change stream.
#[derive(Default)]
pub struct AppsWatcher {
    handle: Option<JoinHandle<()>>,
    project: Option<String>,
}

impl AppsWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The project filter the stream was last started with.
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// (Re)start the applications watch with a project filter.
    pub fn start(
        &mut self,
        client: ArgoClient,
        project: Option<String>,
        tx: mpsc::UnboundedSender<AppMsg>,
    ) {
        self.stop();
        self.project = project.clone();

        let handle = tokio::spawn(async move {
            match client.list_applications(project.as_deref()).await {
                Ok(apps) => {
                    let _ = tx.send(AppMsg::AppsLoaded { result: Ok(apps) });
                }
                Err(e) => {
                    let _ = tx.send(AppMsg::AppsLoaded {
                        result: Err(MsgError::from_anyhow(&e)),
                    });
                    return;
                }
            }

            loop {
                let mut stream = match client.watch_applications(project.as_deref()).await {
                    Ok(s) => s,
                    Err(e) => {
                        let _ = tx.send(AppMsg::AppsWatchError {
                            error: MsgError::from_anyhow(&e),
                        });
                        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
                        continue;
                    }
                };
                while let Some(value) = stream.next_value().await {
                    match value {
                        Ok(event) => {
                            let Some(result) = event.get("result") else {
                                continue;
                            };
                            let event_type = result
                                .get("type")
                                .and_then(|t| t.as_str())
                                .unwrap_or("MODIFIED");
                            let Some(app_obj) = result.get("application") else {
                                continue;
                            };
                            let Some(app) = AppItem::from_json(app_obj) else {
                                continue;
                            };
                            if event_type == "DELETED" {
                                let _ = tx.send(AppMsg::AppRemoved { name: app.name });
                            } else {
                                let _ = tx.send(AppMsg::AppUpserted { app });
                            }
                        }
                        Err(e) => {
                            tracing::warn!("applications watch error: {}", e);
                            break;
                        }
                    }
                }
                // Stream ended; back off briefly and reconnect
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
        });
        self.handle = Some(handle);
    }

    /// Restart the watch when the effective project scope changed.
    /// Returns true when a restart happened.
    pub fn restart_for_scope(
        &mut self,
        client: ArgoClient,
        project: Option<String>,
        tx: mpsc::UnboundedSender<AppMsg>,
    ) -> bool {
        if self.project == project && self.handle.is_some() {
            return false;
        }
        tracing::debug!("restarting applications watch, project={:?}", project);
        self.start(client, project, tx);
        true
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for AppsWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Per-application resource-tree watchers, active only in the tree view.
#[derive(Default)]
pub struct TreeWatchers {
    session: u64,
    handles: Vec<JoinHandle<()>>,
}

impl TreeWatchers {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session stamped onto every message emitted by active watchers.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Cancel all watchers and invalidate their session. Must run before a
    /// new tree view opens; late messages from aborted tasks carry the old
    /// session and are dropped by the receiver.
    pub fn cancel_all(&mut self) {
        self.session += 1;
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    /// Start the tree + status watchers for one application.
    pub fn start_for(
        &mut self,
        client: ArgoClient,
        app: AppItem,
        tx: mpsc::UnboundedSender<AppMsg>,
    ) {
        let session = self.session;
        let app_name = app.name.clone();
        let app_ns = app.app_namespace.clone();

        // Initial snapshot + long-lived tree stream
        let tree_client = client.clone();
        let tree_tx = tx.clone();
        let tree_app = app_name.clone();
        let tree_ns = app_ns.clone();
        self.handles.push(tokio::spawn(async move {
            match tree_client
                .get_resource_tree(&tree_app, tree_ns.as_deref())
                .await
            {
                Ok(tree) => {
                    let _ = tree_tx.send(AppMsg::TreeSnapshot {
                        session,
                        app: tree_app.clone(),
                        tree,
                    });
                }
                Err(e) => {
                    let _ = tree_tx.send(AppMsg::TreeWatchError {
                        session,
                        app: tree_app.clone(),
                        message: e.to_string(),
                    });
                }
            }

            loop {
                let mut stream = match tree_client
                    .watch_resource_tree(&tree_app, tree_ns.as_deref())
                    .await
                {
                    Ok(s) => s,
                    Err(e) => {
                        let _ = tree_tx.send(AppMsg::TreeWatchError {
                            session,
                            app: tree_app.clone(),
                            message: e.to_string(),
                        });
                        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
                        continue;
                    }
                };
                while let Some(value) = stream.next_value().await {
                    match value {
                        Ok(event) => {
                            let Some(result) = event.get("result") else {
                                continue;
                            };
                            if let Ok(tree) =
                                serde_json::from_value::<ResourceTree>(result.clone())
                            {
                                let _ = tree_tx.send(AppMsg::TreeSnapshot {
                                    session,
                                    app: tree_app.clone(),
                                    tree,
                                });
                            }
                        }
                        Err(e) => {
                            tracing::warn!("resource tree watch error for {}: {}", tree_app, e);
                            break;
                        }
                    }
                }
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
        }));

        // Managed-resource sync statuses: initial fetch, then follow the
        // application stream and project out this app's status list.
        let status_client = client;
        let status_tx = tx;
        self.handles.push(tokio::spawn(async move {
            if let Ok(statuses) = status_client
                .get_resource_statuses(&app_name, app_ns.as_deref())
                .await
            {
                let _ = status_tx.send(AppMsg::TreeStatuses {
                    session,
                    app: app_name.clone(),
                    statuses,
                });
            }

            loop {
                let mut stream = match status_client.watch_applications(None).await {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::debug!("status watch connect failed for {}: {}", app_name, e);
                        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
                        continue;
                    }
                };
                while let Some(value) = stream.next_value().await {
                    let Ok(event) = value else { break };
                    let Some(app_obj) = event
                        .get("result")
                        .and_then(|r| r.get("application"))
                    else {
                        continue;
                    };
                    let name = app_obj
                        .get("metadata")
                        .and_then(|m| m.get("name"))
                        .and_then(|n| n.as_str());
                    if name != Some(app_name.as_str()) {
                        continue;
                    }
                    let statuses = ResourceStatus::from_app_json(app_obj);
                    let _ = status_tx.send(AppMsg::TreeStatuses {
                        session,
                        app: app_name.clone(),
                        statuses,
                    });
                }
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
        }));
    }
}

impl Drop for TreeWatchers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
