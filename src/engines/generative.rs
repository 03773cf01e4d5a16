//! Generative engine adapter
//!
//! Translation through a chat-completions style LLM API. This is the only
//! metered engine: the reported cost is taken from the provider's usage
//! accounting when present, and estimated from text length when the
//! provider omits it.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::engines::{
    EngineError, GENERATIVE_SLUG, TranslateOutcome, TranslateRequest, TranslationEngine,
};

/// Generative LLM translation engine
pub struct GenerativeEngine {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    total_tokens: Option<i64>,
}

impl GenerativeEngine {
    pub fn new(
        http: reqwest::Client,
        api_base: String,
        api_key: Option<String>,
        model: String,
    ) -> Self {
        Self {
            http,
            api_base,
            api_key,
            model,
        }
    }

    /// Fallback cost estimate when the provider does not report usage:
    /// ceil((input + output length) / 4).
    pub fn estimate_cost(input: &str, output: &str) -> i64 {
        let len = (input.len() + output.len()) as i64;
        (len + 3) / 4
    }
}

#[async_trait]
impl TranslationEngine for GenerativeEngine {
    fn slug(&self) -> &'static str {
        GENERATIVE_SLUG
    }

    async fn translate(&self, request: TranslateRequest) -> Result<TranslateOutcome, EngineError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| EngineError::configuration(GENERATIVE_SLUG, "API key is not set"))?;

        let system_prompt = format!(
            "You are a professional translator. Translate the following text to {}. \
             Preserve HTML tags, formatting, and maintain the original tone and style. \
             Only output the translated text without any explanations.",
            request.target_language
        );

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": request.text },
            ],
            "temperature": 0.3,
        });

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.api_base))
            .bearer_auth(api_key)
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

        let parsed: CompletionResponse =
            response.json().await.map_err(|e| EngineError::Malformed {
                details: e.to_string(),
            })?;

        let translated_text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| EngineError::Malformed {
                details: "completion contained no message content".to_string(),
            })?;

        let cost_units = parsed
            .usage
            .and_then(|u| u.total_tokens)
            .unwrap_or_else(|| Self::estimate_cost(&request.text, &translated_text));

        Ok(TranslateOutcome {
            translated_text,
            cost_units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_cost_rounds_up() {
        assert_eq!(GenerativeEngine::estimate_cost("", ""), 0);
        assert_eq!(GenerativeEngine::estimate_cost("a", ""), 1);
        assert_eq!(GenerativeEngine::estimate_cost("abcd", ""), 1);
        assert_eq!(GenerativeEngine::estimate_cost("abcd", "e"), 2);
        assert_eq!(GenerativeEngine::estimate_cost("abcdefgh", "ijkl"), 3);
    }
}
