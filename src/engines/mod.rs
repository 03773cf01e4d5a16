//! Translation engine adapters
//!
//! Defines the uniform interface implemented by every translation backend,
//! plus the request/outcome types and structured errors shared by the
//! adapters.

pub mod generative;
pub mod lexicon;
pub mod phrase;
pub mod registry;

pub use generative::GenerativeEngine;
pub use lexicon::LexiconEngine;
pub use phrase::PhraseEngine;
pub use registry::{EngineRegistry, RegistryError};

use async_trait::async_trait;

/// Engine slug for the rule-based lexicon backend
pub const LEXICON_SLUG: &str = "lexicon";
/// Engine slug for the statistical phrase backend
pub const PHRASE_SLUG: &str = "phrase";
/// Engine slug for the generative backend
pub const GENERATIVE_SLUG: &str = "generative";

/// All engine slugs accepted in job descriptors
pub const ENGINE_SLUGS: &[&str] = &[LEXICON_SLUG, PHRASE_SLUG, GENERATIVE_SLUG];

/// Engine-specific error types for structured error handling
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// Engine is not provisioned (missing credentials or endpoint)
    #[error("engine '{engine}' is not provisioned: {details}")]
    Configuration { engine: String, details: String },

    /// HTTP error from the upstream provider
    #[error("engine HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// Network or connectivity failure reaching the provider
    #[error("engine network error: {details}")]
    Network { details: String },

    /// Response from the provider could not be interpreted
    #[error("malformed engine response: {details}")]
    Malformed { details: String },
}

impl EngineError {
    pub fn configuration<S: Into<String>>(engine: &str, details: S) -> Self {
        Self::Configuration {
            engine: engine.to_string(),
            details: details.into(),
        }
    }

    /// Whether the failure is a provisioning problem rather than a
    /// transport one.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            details: err.to_string(),
        }
    }
}

/// Parameters for one translate call
#[derive(Debug, Clone)]
pub struct TranslateRequest {
    /// Source text; inline markup must survive translation untouched
    pub text: String,
    /// Target language code
    pub target_language: String,
    /// Source language code; engines auto-detect when absent
    pub source_language: Option<String>,
}

/// Result of one translate call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOutcome {
    /// Translated payload only, no explanations or metadata
    pub translated_text: String,
    /// Metered cost in tokens; zero for unmetered engines
    pub cost_units: i64,
}

/// Uniform contract implemented by every translation backend.
///
/// Implementations must return only the translated payload in
/// `translated_text` and preserve any inline structural markup present in
/// the input.
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Stable identifier used in job descriptors and translation rows
    fn slug(&self) -> &'static str;

    /// Translate `text` into the target language
    async fn translate(&self, request: TranslateRequest) -> Result<TranslateOutcome, EngineError>;
}
