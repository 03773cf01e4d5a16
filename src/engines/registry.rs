//! Engine registry
//!
//! In-memory registry mapping engine slugs to adapter instances. Built once
//! from configuration and injected into the orchestrator; there is no global
//! instance.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::config::AppConfig;
use crate::engines::{
    GenerativeEngine, LexiconEngine, PhraseEngine, TranslationEngine,
};

/// Error type for registry operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("engine '{name}' not found")]
    EngineNotFound { name: String },
}

/// Registry of translation engine adapters keyed by slug
#[derive(Clone, Default)]
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn TranslationEngine>>,
}

impl EngineRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
        }
    }

    /// Build a registry with all three engines wired from configuration.
    ///
    /// Every engine is registered even when unprovisioned; an unprovisioned
    /// adapter reports a configuration error per call, which the
    /// orchestrator counts as a failed cell rather than a failed job.
    pub fn from_config(config: &AppConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.engine_http_timeout_seconds))
            .build()
            .unwrap_or_default();

        let mut registry = Self::new();

        if config.lexicon_api_key.is_none() {
            warn!("lexicon engine has no API key; calls will fail until provisioned");
        }
        registry.register(Arc::new(LexiconEngine::new(
            http.clone(),
            config.lexicon_api_base.clone(),
            config.lexicon_api_key.clone(),
        )));

        if config.phrase_api_base.is_none() {
            warn!("phrase engine has no endpoint; calls will fail until provisioned");
        }
        registry.register(Arc::new(PhraseEngine::new(
            http.clone(),
            config.phrase_api_base.clone(),
            config.phrase_api_key.clone(),
        )));

        if config.generative_api_key.is_none() {
            warn!("generative engine has no API key; calls will fail until provisioned");
        }
        registry.register(Arc::new(GenerativeEngine::new(
            http,
            config.generative_api_base.clone(),
            config.generative_api_key.clone(),
            config.generative_model.clone(),
        )));

        registry
    }

    /// Register an engine under its slug
    pub fn register(&mut self, engine: Arc<dyn TranslationEngine>) {
        self.engines.insert(engine.slug().to_string(), engine);
    }

    /// Get an engine by slug
    pub fn get(&self, name: &str) -> Result<Arc<dyn TranslationEngine>, RegistryError> {
        self.engines
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::EngineNotFound {
                name: name.to_string(),
            })
    }

    /// Registered slugs, sorted for stable ordering
    pub fn slugs(&self) -> Vec<String> {
        let mut slugs: Vec<_> = self.engines.keys().cloned().collect();
        slugs.sort();
        slugs
    }
}
