//! # Data Models
//!
//! This module contains all the SeaORM entity models used throughout the
//! Polyglot translation service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod glossary_rule;
pub mod language;
pub mod resource;
pub mod resource_field;
pub mod shop;
pub mod token_transaction;
pub mod token_wallet;
pub mod translation;
pub mod translation_job;

pub use glossary_rule::Entity as GlossaryRule;
pub use language::Entity as Language;
pub use resource::Entity as Resource;
pub use resource_field::Entity as ResourceField;
pub use shop::Entity as Shop;
pub use token_transaction::Entity as TokenTransaction;
pub use token_wallet::Entity as TokenWallet;
pub use translation::Entity as Translation;
pub use translation_job::Entity as TranslationJob;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "polyglot".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
