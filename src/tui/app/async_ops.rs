//! Command dispatch for asynchronous operations
//!
//! Handlers never block: they emit [`Command`]s which the event loop hands
//! to [`dispatch_command`]. Each command runs on a spawned task and posts a
//! typed result message (tagged with its session) back into the loop.

use crate::api::{ArgoClient, ResourceRef};
use crate::services::diff;
use crate::watcher::{AppMsg, MsgError};
use tokio::sync::mpsc;

/// Target for a diff computation.
#[derive(Debug, Clone)]
pub enum DiffScope {
    App {
        name: String,
        app_ns: Option<String>,
    },
    Resource {
        app: String,
        app_ns: Option<String>,
        target: ResourceRef,
    },
}

/// External process that takes over the terminal.
#[derive(Debug, Clone)]
pub enum ExternalRequest {
    K9s {
        context: Option<String>,
        kind: String,
        namespace: String,
        name: String,
    },
    Pager {
        title: String,
        content: String,
    },
}

/// Follow-up work produced by the key handlers, executed by the loop.
#[derive(Debug)]
pub enum Command {
    /// Restart the applications watch with a new project filter
    RestartAppsWatch { project: Option<String> },
    /// Open tree watchers for the given apps (loop-intercepted)
    OpenTree { apps: Vec<crate::api::AppItem> },
    /// Cancel all tree watchers (loop-intercepted)
    CloseTree,
    Sync {
        session: u64,
        targets: Vec<(String, Option<String>)>,
        prune: bool,
    },
    SyncResources {
        session: u64,
        targets: Vec<ResourceRef>,
        app_ns: Option<String>,
        prune: bool,
        force: bool,
    },
    FetchHistory {
        session: u64,
        app: String,
        app_ns: Option<String>,
    },
    ExecuteRollback {
        session: u64,
        app: String,
        app_ns: Option<String>,
        id: i64,
        prune: bool,
        dry_run: bool,
    },
    DeleteApps {
        session: u64,
        targets: Vec<(String, Option<String>)>,
        cascade: bool,
        policy: String,
    },
    DeleteResources {
        session: u64,
        targets: Vec<ResourceRef>,
        policy: String,
        force: bool,
    },
    Refresh {
        targets: Vec<(String, Option<String>)>,
        hard: bool,
    },
    Diff {
        session: u64,
        title: String,
        scope: DiffScope,
    },
    CheckUpgrade,
    /// Suspend the terminal and run a foreground process (loop-intercepted)
    External(ExternalRequest),
}

/// Spawn the worker task for one command. Loop-intercepted variants
/// (OpenTree, CloseTree, External, RestartAppsWatch) must not reach here.
pub fn dispatch_command(client: ArgoClient, cmd: Command, tx: mpsc::UnboundedSender<AppMsg>) {
    match cmd {
        Command::Sync {
            session,
            targets,
            prune,
        } => {
            tokio::spawn(async move {
                let mut synced: Vec<String> = Vec::new();
                for (name, app_ns) in &targets {
                    match client.sync_app(name, app_ns.as_deref(), prune, false, None).await {
                        Ok(()) => synced.push(name.clone()),
                        Err(e) => {
                            let _ = tx.send(AppMsg::SyncDone {
                                session,
                                synced,
                                result: Err(MsgError::from_anyhow(&e)),
                            });
                            return;
                        }
                    }
                }
                let _ = tx.send(AppMsg::SyncDone {
                    session,
                    synced,
                    result: Ok(()),
                });
            });
        }
        Command::SyncResources {
            session,
            targets,
            app_ns,
            prune,
            force,
        } => {
            tokio::spawn(async move {
                // Targets may span apps in a multi-app tree; one sync per app
                let mut by_app: Vec<(String, Vec<ResourceRef>)> = Vec::new();
                for t in targets {
                    match by_app.iter_mut().find(|(app, _)| *app == t.app_name) {
                        Some((_, list)) => list.push(t),
                        None => by_app.push((t.app_name.clone(), vec![t])),
                    }
                }
                for (app, resources) in by_app {
                    if let Err(e) = client
                        .sync_app(&app, app_ns.as_deref(), prune, force, Some(&resources))
                        .await
                    {
                        let _ = tx.send(AppMsg::ResourceSyncDone {
                            session,
                            result: Err(MsgError::from_anyhow(&e)),
                        });
                        return;
                    }
                }
                let _ = tx.send(AppMsg::ResourceSyncDone {
                    session,
                    result: Ok(()),
                });
            });
        }
        Command::FetchHistory {
            session,
            app,
            app_ns,
        } => {
            tokio::spawn(async move {
                let result = client
                    .get_history(&app, app_ns.as_deref())
                    .await
                    .map_err(|e| MsgError::from_anyhow(&e));
                let _ = tx.send(AppMsg::HistoryLoaded { session, result });
            });
        }
        Command::ExecuteRollback {
            session,
            app,
            app_ns,
            id,
            prune,
            dry_run,
        } => {
            tokio::spawn(async move {
                let result = client
                    .rollback_app(&app, app_ns.as_deref(), id, prune, dry_run)
                    .await
                    .map_err(|e| MsgError::from_anyhow(&e));
                let _ = tx.send(AppMsg::RollbackDone { session, result });
            });
        }
        Command::DeleteApps {
            session,
            targets,
            cascade,
            policy,
        } => {
            tokio::spawn(async move {
                for (name, app_ns) in &targets {
                    if let Err(e) = client
                        .delete_app(name, app_ns.as_deref(), cascade, &policy)
                        .await
                    {
                        let _ = tx.send(AppMsg::AppsDeleted {
                            session,
                            result: Err(MsgError::from_anyhow(&e)),
                        });
                        return;
                    }
                }
                let _ = tx.send(AppMsg::AppsDeleted {
                    session,
                    result: Ok(()),
                });
            });
        }
        Command::DeleteResources {
            session,
            targets,
            policy,
            force,
        } => {
            tokio::spawn(async move {
                for target in &targets {
                    if let Err(e) = client.delete_resource(target, &policy, force).await {
                        let _ = tx.send(AppMsg::ResourcesDeleted {
                            session,
                            result: Err(MsgError::from_anyhow(&e)),
                        });
                        return;
                    }
                }
                let _ = tx.send(AppMsg::ResourcesDeleted {
                    session,
                    result: Ok(()),
                });
            });
        }
        Command::Refresh { targets, hard } => {
            tokio::spawn(async move {
                let mut count = 0usize;
                for (name, app_ns) in &targets {
                    match client.refresh_app(name, app_ns.as_deref(), hard).await {
                        Ok(()) => count += 1,
                        Err(e) => {
                            let _ = tx.send(AppMsg::RefreshDone {
                                result: Err(MsgError::from_anyhow(&e)),
                            });
                            return;
                        }
                    }
                }
                let _ = tx.send(AppMsg::RefreshDone { result: Ok(count) });
            });
        }
        Command::Diff {
            session,
            title,
            scope,
        } => {
            tokio::spawn(async move {
                let result = match &scope {
                    DiffScope::App { name, app_ns } => client
                        .get_managed_resources(name, app_ns.as_deref())
                        .await
                        .map(|resources| diff::build_diff(&resources)),
                    DiffScope::Resource {
                        app,
                        app_ns,
                        target,
                    } => client
                        .get_managed_resources(app, app_ns.as_deref())
                        .await
                        .map(|resources| {
                            let filtered: Vec<_> = resources
                                .into_iter()
                                .filter(|r| {
                                    r.group == target.group
                                        && r.kind == target.kind
                                        && r.namespace == target.namespace
                                        && r.name == target.name
                                })
                                .collect();
                            diff::build_diff(&filtered)
                        }),
                };
                let _ = tx.send(AppMsg::DiffReady {
                    session,
                    title,
                    result: result.map_err(|e| MsgError::from_anyhow(&e)),
                });
            });
        }
        Command::CheckUpgrade => {
            tokio::spawn(async move {
                let result = tokio::task::spawn_blocking(crate::cli::check_latest_version)
                    .await
                    .unwrap_or_else(|e| Err(anyhow::anyhow!("upgrade check panicked: {}", e)))
                    .map_err(|e| e.to_string());
                let _ = tx.send(AppMsg::UpgradeChecked { result });
            });
        }
        Command::RestartAppsWatch { .. }
        | Command::OpenTree { .. }
        | Command::CloseTree
        | Command::External(_) => {
            tracing::error!("loop-intercepted command reached dispatch_command");
        }
    }
}
