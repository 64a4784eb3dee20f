use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{Provider, Source, WeChatProvider};

struct RegisteredSource {
    source: Source,
    goth: Arc<dyn idp::Provider>,
}

/// Provider kinds by name, and login sources configured on top of them.
///
/// Built once at startup and shared read-only afterwards.
pub struct Registry {
    providers: HashMap<String, Arc<dyn Provider>>,
    sources: BTreeMap<String, RegisteredSource>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            sources: BTreeMap::new(),
        }
    }

    /// Registry knowing every provider kind this build supports.
    pub fn with_builtin_providers() -> Self {
        let mut registry = Self::new();
        registry.register_provider(Arc::new(WeChatProvider::new("wechat", "WeChat", vec![])));
        registry
    }

    pub fn register_provider(&mut self, provider: Arc<dyn Provider>) {
        tracing::debug!("Registering OAuth2 provider: {}", provider.name());
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn provider(&self, kind: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(kind).cloned()
    }

    /// Configures `source`, failing on unknown provider kinds.
    pub fn add_source(&mut self, source: Source, callback_url: &str) -> anyhow::Result<()> {
        let provider = self
            .provider(&source.provider)
            .ok_or_else(|| anyhow::anyhow!("Unknown OAuth2 provider: {}", source.provider))?;
        let goth = provider
            .create_goth_provider(&source.name, callback_url, &source)
            .map_err(|e| anyhow::anyhow!("Failed to create provider for {}: {}", source.name, e))?;
        self.insert_source(source, Arc::from(goth));
        Ok(())
    }

    /// Adds `source` with an already built flow provider.
    pub fn insert_source(&mut self, source: Source, goth: Arc<dyn idp::Provider>) {
        tracing::info!(
            "Login source {} ({}) enabled",
            source.name,
            source.provider
        );
        self.sources
            .insert(source.name.clone(), RegisteredSource { source, goth });
    }

    pub fn goth_provider(&self, source_name: &str) -> Option<Arc<dyn idp::Provider>> {
        self.sources.get(source_name).map(|s| s.goth.clone())
    }

    /// Configured sources in name order, each with its provider kind.
    pub fn sources(&self) -> Vec<(&Source, Arc<dyn Provider>)> {
        self.sources
            .values()
            .filter_map(|s| Some((&s.source, self.provider(&s.source.provider)?)))
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
