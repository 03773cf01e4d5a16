//! Phrase engine adapter
//!
//! Statistical phrase-based machine translation against a self-hosted or
//! hosted endpoint. Unmetered, like the lexicon engine.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::engines::{
    EngineError, PHRASE_SLUG, TranslateOutcome, TranslateRequest, TranslationEngine,
};

/// Statistical phrase-based translation engine
pub struct PhraseEngine {
    http: reqwest::Client,
    api_base: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhraseResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl PhraseEngine {
    pub fn new(http: reqwest::Client, api_base: Option<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            api_base,
            api_key,
        }
    }
}

#[async_trait]
impl TranslationEngine for PhraseEngine {
    fn slug(&self) -> &'static str {
        PHRASE_SLUG
    }

    async fn translate(&self, request: TranslateRequest) -> Result<TranslateOutcome, EngineError> {
        let api_base = self
            .api_base
            .as_ref()
            .ok_or_else(|| EngineError::configuration(PHRASE_SLUG, "endpoint is not set"))?;

        let mut body = json!({
            "q": request.text,
            "source": request.source_language.as_deref().unwrap_or("auto"),
            "target": request.target_language,
            "format": "html",
        });
        if let Some(api_key) = &self.api_key {
            body["api_key"] = json!(api_key);
        }

        let response = self
            .http
            .post(format!("{}/translate", api_base))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PhraseResponse =
            response.json().await.map_err(|e| EngineError::Malformed {
                details: e.to_string(),
            })?;

        Ok(TranslateOutcome {
            translated_text: parsed.translated_text,
            cost_units: 0,
        })
    }
}
