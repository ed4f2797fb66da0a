//! Kubeconfig module
//!
//! Reads the user's kubeconfig so the k9s launcher can map ArgoCD cluster
//! identifiers to kubeconfig context names. Uses the kube crate's
//! Kubeconfig::read() which respects KUBECONFIG and the platform defaults.

use anyhow::Result;
use kube::config::Kubeconfig;

/// A loaded kubeconfig, narrowed to the context lookups the TUI needs.
pub struct KubeContexts {
    inner: Kubeconfig,
}

impl KubeContexts {
    pub fn load() -> Result<Self> {
        let inner =
            Kubeconfig::read().map_err(|e| anyhow::anyhow!("Failed to load kubeconfig: {}", e))?;
        Ok(Self { inner })
    }

    /// The current-context name, if one is set.
    pub fn current_context(&self) -> Option<&str> {
        self.inner
            .current_context
            .as_deref()
            .filter(|c| !c.is_empty())
    }

    /// Exact-name context lookup. No fuzzy matching: opening k9s against the
    /// wrong cluster is worse than asking the user to pick.
    pub fn find_context_by_name(&self, name: &str) -> Option<String> {
        self.inner
            .contexts
            .iter()
            .find(|ctx| ctx.name == name)
            .map(|ctx| ctx.name.clone())
    }

    pub fn context_names(&self) -> Vec<String> {
        self.inner.contexts.iter().map(|c| c.name.clone()).collect()
    }
}

/// List all context names from the default kubeconfig.
pub fn list_context_names() -> Result<Vec<String>> {
    let kc = KubeContexts::load()?;
    let names = kc.context_names();
    if names.is_empty() {
        anyhow::bail!("No contexts found in kubeconfig");
    }
    Ok(names)
}
