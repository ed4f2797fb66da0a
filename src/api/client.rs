//! ArgoCD HTTP client
//!
//! Talks to the ArgoCD API server over its REST gateway. Watch endpoints are
//! newline-delimited JSON streams; [`NdjsonLines`] frames them into values.

use super::error::ApiError;
use super::{AppItem, ManagedResource, ResourceRef, ResourceStatus, ResourceTree, RevisionRow};
use anyhow::{Context, Result};
use futures::StreamExt;
use serde::Deserialize;
use std::pin::Pin;
use std::time::Duration;

/// Where and how to reach the ArgoCD server.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    pub server: Option<String>,
    pub token: Option<String>,
    pub insecure: bool,
}

/// ArgoCD CLI configuration file (~/.config/argocd/config), read as a
/// fallback so argonaut picks up `argocd login` sessions automatically.
#[derive(Debug, Deserialize, Default)]
struct ArgoCliConfig {
    #[serde(default)]
    contexts: Vec<ArgoCliContext>,
    #[serde(default, rename = "current-context")]
    current_context: Option<String>,
    #[serde(default)]
    servers: Vec<ArgoCliServer>,
    #[serde(default)]
    users: Vec<ArgoCliUser>,
}

#[derive(Debug, Deserialize)]
struct ArgoCliContext {
    name: String,
    server: String,
    user: String,
}

#[derive(Debug, Deserialize)]
struct ArgoCliServer {
    server: String,
    #[serde(default)]
    insecure: bool,
}

#[derive(Debug, Deserialize)]
struct ArgoCliUser {
    name: String,
    #[serde(default, rename = "auth-token")]
    auth_token: Option<String>,
}

impl ServerOptions {
    /// Resolve the session: CLI flags win, then environment variables, then
    /// the ArgoCD CLI config from a previous `argocd login`.
    pub fn resolve(server_flag: Option<String>, token_flag: Option<String>, insecure: bool) -> Self {
        let mut opts = ServerOptions {
            server: server_flag.or_else(|| std::env::var("ARGOCD_SERVER").ok()),
            token: token_flag.or_else(|| std::env::var("ARGOCD_AUTH_TOKEN").ok()),
            insecure,
        };

        if opts.server.is_some() && opts.token.is_some() {
            return opts;
        }

        if let Some(cli) = read_cli_config() {
            let ctx = cli
                .current_context
                .as_ref()
                .and_then(|name| cli.contexts.iter().find(|c| &c.name == name))
                .or_else(|| cli.contexts.first());
            if let Some(ctx) = ctx {
                if opts.server.is_none() {
                    opts.server = Some(ctx.server.clone());
                }
                if opts.token.is_none() {
                    opts.token = cli
                        .users
                        .iter()
                        .find(|u| u.name == ctx.user)
                        .and_then(|u| u.auth_token.clone());
                }
                if !opts.insecure {
                    opts.insecure = cli
                        .servers
                        .iter()
                        .any(|s| s.server == ctx.server && s.insecure);
                }
            }
        }

        opts
    }
}

fn read_cli_config() -> Option<ArgoCliConfig> {
    let home = std::env::var_os("HOME")?;
    let path = std::path::Path::new(&home).join(".config/argocd/config");
    let data = std::fs::read_to_string(path).ok()?;
    match serde_yaml::from_str(&data) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!("Failed to parse ArgoCD CLI config: {}", e);
            None
        }
    }
}

/// Thin client over the ArgoCD REST API.
#[derive(Clone)]
pub struct ArgoClient {
    http: reqwest::Client,
    base: url::Url,
    token: String,
}

impl ArgoClient {
    pub fn new(opts: &ServerOptions) -> Result<Self> {
        let server = opts
            .server
            .clone()
            .context("no ArgoCD server configured")?;
        let raw = if server.contains("://") {
            server
        } else {
            format!("https://{}", server)
        };
        let mut base = url::Url::parse(&raw)
            .with_context(|| format!("invalid ArgoCD server address: {}", raw))?;
        // Relative joins need the trailing slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(opts.insecure)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base,
            token: opts.token.clone().unwrap_or_default(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = self
            .base
            .join(path)
            .unwrap_or_else(|_| self.base.clone());
        self.http.request(method, url).bearer_auth(&self.token)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, body).into())
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        let resp = self
            .request(reqwest::Method::GET, path)
            .query(query)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        Ok(Self::check(resp).await?.json().await.map_err(ApiError::from_transport)?)
    }

    /// List applications, optionally restricted to a single project.
    pub async fn list_applications(&self, project: Option<&str>) -> Result<Vec<AppItem>> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(p) = project {
            query.push(("projects", p));
        }
        let body = self.get_json("api/v1/applications", &query).await?;
        let apps = body
            .get("items")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(AppItem::from_json).collect())
            .unwrap_or_default();
        Ok(apps)
    }

    /// Open the applications watch stream. Each line carries
    /// `{"result": {"type": ..., "application": {...}}}`.
    pub async fn watch_applications(&self, project: Option<&str>) -> Result<NdjsonLines> {
        let mut req = self.request(reqwest::Method::GET, "api/v1/stream/applications");
        if let Some(p) = project {
            req = req.query(&[("projects", p)]);
        }
        let resp = req.send().await.map_err(ApiError::from_transport)?;
        Ok(NdjsonLines::new(Self::check(resp).await?))
    }

    pub async fn get_application(
        &self,
        name: &str,
        app_ns: Option<&str>,
    ) -> Result<serde_json::Value> {
        let path = format!("api/v1/applications/{}", name);
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(ns) = app_ns {
            query.push(("appNamespace", ns));
        }
        self.get_json(&path, &query).await
    }

    pub async fn get_resource_tree(
        &self,
        name: &str,
        app_ns: Option<&str>,
    ) -> Result<ResourceTree> {
        let path = format!("api/v1/applications/{}/resource-tree", name);
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(ns) = app_ns {
            query.push(("appNamespace", ns));
        }
        let body = self.get_json(&path, &query).await?;
        Ok(serde_json::from_value(body).context("invalid resource tree payload")?)
    }

    /// Open the resource-tree watch stream for one application.
    pub async fn watch_resource_tree(
        &self,
        name: &str,
        app_ns: Option<&str>,
    ) -> Result<NdjsonLines> {
        let path = format!("api/v1/stream/applications/{}/resource-tree", name);
        let mut req = self.request(reqwest::Method::GET, &path);
        if let Some(ns) = app_ns {
            req = req.query(&[("appNamespace", ns)]);
        }
        let resp = req.send().await.map_err(ApiError::from_transport)?;
        Ok(NdjsonLines::new(Self::check(resp).await?))
    }

    /// Sync a whole application, or only `resources` when given.
    /// `force` applies with replace semantics, ignoring conflicts.
    pub async fn sync_app(
        &self,
        name: &str,
        app_ns: Option<&str>,
        prune: bool,
        force: bool,
        resources: Option<&[ResourceRef]>,
    ) -> Result<()> {
        let path = format!("api/v1/applications/{}/sync", name);
        let mut body = serde_json::json!({ "prune": prune });
        if let Some(ns) = app_ns {
            body["appNamespace"] = serde_json::json!(ns);
        }
        if force {
            body["strategy"] = serde_json::json!({ "apply": { "force": true } });
        }
        if let Some(targets) = resources {
            let list: Vec<serde_json::Value> = targets
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "group": r.group,
                        "kind": r.kind,
                        "namespace": r.namespace,
                        "name": r.name,
                    })
                })
                .collect();
            body["resources"] = serde_json::json!(list);
        }
        let resp = self
            .request(reqwest::Method::POST, &path)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn rollback_app(
        &self,
        name: &str,
        app_ns: Option<&str>,
        id: i64,
        prune: bool,
        dry_run: bool,
    ) -> Result<()> {
        let path = format!("api/v1/applications/{}/rollback", name);
        let mut body = serde_json::json!({ "id": id, "prune": prune, "dryRun": dry_run });
        if let Some(ns) = app_ns {
            body["appNamespace"] = serde_json::json!(ns);
        }
        let resp = self
            .request(reqwest::Method::POST, &path)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn delete_app(
        &self,
        name: &str,
        app_ns: Option<&str>,
        cascade: bool,
        policy: &str,
    ) -> Result<()> {
        let path = format!("api/v1/applications/{}", name);
        let cascade_str = cascade.to_string();
        let mut query: Vec<(&str, &str)> =
            vec![("cascade", &cascade_str), ("propagationPolicy", policy)];
        if let Some(ns) = app_ns {
            query.push(("appNamespace", ns));
        }
        let resp = self
            .request(reqwest::Method::DELETE, &path)
            .query(&query)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Delete a single resource managed by `target.app_name`.
    /// `policy == "orphan"` maps to the orphan flag; `force` skips finalizers.
    pub async fn delete_resource(
        &self,
        target: &ResourceRef,
        policy: &str,
        force: bool,
    ) -> Result<()> {
        let path = format!("api/v1/applications/{}/resource", target.app_name);
        let force_str = force.to_string();
        let orphan_str = (policy == "orphan").to_string();
        let query: Vec<(&str, &str)> = vec![
            ("name", &target.name),
            ("namespace", &target.namespace),
            ("group", &target.group),
            ("version", &target.version),
            ("kind", &target.kind),
            ("force", &force_str),
            ("orphan", &orphan_str),
        ];
        let resp = self
            .request(reqwest::Method::DELETE, &path)
            .query(&query)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Ask the server to refresh an application (hard = ignore cache).
    pub async fn refresh_app(&self, name: &str, app_ns: Option<&str>, hard: bool) -> Result<()> {
        let path = format!("api/v1/applications/{}", name);
        let refresh = if hard { "hard" } else { "normal" };
        let mut query: Vec<(&str, &str)> = vec![("refresh", refresh)];
        if let Some(ns) = app_ns {
            query.push(("appNamespace", ns));
        }
        self.get_json(&path, &query).await?;
        Ok(())
    }

    /// Deployment history rows for the rollback picker, newest first.
    pub async fn get_history(&self, name: &str, app_ns: Option<&str>) -> Result<Vec<RevisionRow>> {
        let app = self.get_application(name, app_ns).await?;
        let mut rows: Vec<RevisionRow> = app
            .get("status")
            .and_then(|s| s.get("history"))
            .and_then(|h| h.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| {
                        let id = i.get("id")?.as_i64()?;
                        let revision = i
                            .get("revision")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string();
                        let deployed_at = i
                            .get("deployedAt")
                            .and_then(|v| v.as_str())
                            .and_then(|s| s.parse().ok());
                        let source = i
                            .get("source")
                            .and_then(|s| s.get("repoURL"))
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string();
                        Some(RevisionRow {
                            id,
                            revision,
                            deployed_at,
                            source,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    /// Managed resources with target/live states, used for the diff view.
    pub async fn get_managed_resources(
        &self,
        name: &str,
        app_ns: Option<&str>,
    ) -> Result<Vec<ManagedResource>> {
        let path = format!("api/v1/applications/{}/managed-resources", name);
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(ns) = app_ns {
            query.push(("appNamespace", ns));
        }
        let body = self.get_json(&path, &query).await?;
        let items = body
            .get("items")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| serde_json::from_value(i.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        Ok(items)
    }

    /// Per-resource sync statuses for one application (merged into the tree).
    pub async fn get_resource_statuses(
        &self,
        name: &str,
        app_ns: Option<&str>,
    ) -> Result<Vec<ResourceStatus>> {
        let app = self.get_application(name, app_ns).await?;
        Ok(ResourceStatus::from_app_json(&app))
    }
}

/// Frames a streaming HTTP response into newline-delimited JSON values.
pub struct NdjsonLines {
    stream: Pin<Box<dyn futures::Stream<Item = reqwest::Result<bytes::Bytes>> + Send>>,
    buf: Vec<u8>,
}

impl NdjsonLines {
    pub fn new(resp: reqwest::Response) -> Self {
        Self {
            stream: Box::pin(resp.bytes_stream()),
            buf: Vec::new(),
        }
    }

    /// Next JSON value from the stream; None when the stream ends.
    pub async fn next_value(&mut self) -> Option<Result<serde_json::Value>> {
        loop {
            if let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = self.buf.drain(..=pos).collect();
                let line = &line[..line.len().saturating_sub(1)];
                if line.is_empty() {
                    continue;
                }
                return Some(serde_json::from_slice(line).map_err(Into::into));
            }
            match self.stream.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Some(Err(ApiError::from_transport(e).into())),
                None => return None,
            }
        }
    }
}
