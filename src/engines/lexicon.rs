//! Lexicon engine adapter
//!
//! Rule-based machine translation behind a hosted dictionary API. Calls are
//! unmetered; the wallet is never touched for this engine.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::engines::{
    EngineError, LEXICON_SLUG, TranslateOutcome, TranslateRequest, TranslationEngine,
};

/// Rule-based lexicon translation engine
pub struct LexiconEngine {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LexiconResponse {
    data: LexiconData,
}

#[derive(Debug, Deserialize)]
struct LexiconData {
    translations: Vec<LexiconTranslation>,
}

#[derive(Debug, Deserialize)]
struct LexiconTranslation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl LexiconEngine {
    pub fn new(http: reqwest::Client, api_base: String, api_key: Option<String>) -> Self {
        Self {
            http,
            api_base,
            api_key,
        }
    }
}

#[async_trait]
impl TranslationEngine for LexiconEngine {
    fn slug(&self) -> &'static str {
        LEXICON_SLUG
    }

    async fn translate(&self, request: TranslateRequest) -> Result<TranslateOutcome, EngineError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| EngineError::configuration(LEXICON_SLUG, "API key is not set"))?;

        let mut body = json!({
            "q": request.text,
            "target": request.target_language,
            "format": "html",
        });
        if let Some(source) = &request.source_language {
            body["source"] = json!(source);
        }

        let response = self
            .http
            .post(format!("{}/language/translate/v2", self.api_base))
            .query(&[("key", api_key.as_str())])
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

        let parsed: LexiconResponse =
            response.json().await.map_err(|e| EngineError::Malformed {
                details: e.to_string(),
            })?;

        let translated_text = parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| EngineError::Malformed {
                details: "response contained no translations".to_string(),
            })?;

        Ok(TranslateOutcome {
            translated_text,
            cost_units: 0,
        })
    }
}
