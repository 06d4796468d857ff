use super::{ProviderFailure, ProviderReply, TextProvider};
use crate::config::{FilterStrictness, ModelConfig, ProviderConfig};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Finish reasons that mean the candidate was withheld by filtering.
const BLOCKING_FINISH_REASONS: [&str; 4] = ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

/// Google Gemini `generateContent` backend.
pub struct GeminiProvider {
    config: ModelConfig,
    http: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url().trim_end_matches('/'),
            self.config.model_id
        )
    }
}

pub fn safety_settings(filter: FilterStrictness) -> Vec<SafetySetting> {
    let threshold = match filter {
        FilterStrictness::Strict => "BLOCK_MEDIUM_AND_ABOVE",
        FilterStrictness::Permissive => "BLOCK_NONE",
    };
    HARM_CATEGORIES
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold,
        })
        .collect()
}

pub fn build_request_body(prompt: &str, config: &ProviderConfig) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }],
        }],
        "safetySettings": safety_settings(config.filter),
        "generationConfig": { "temperature": config.temperature },
    })
}

#[async_trait]
impl TextProvider for GeminiProvider {
    async fn invoke(
        &self,
        prompt: &str,
        config: &ProviderConfig,
    ) -> Result<ProviderReply, ProviderFailure> {
        let body = build_request_body(prompt, config);

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderFailure::new(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ProviderFailure::new(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderFailure::new(
                Some(status.as_u16()),
                error_detail(&text).unwrap_or_else(|| format!("Gemini API error {status}")),
            ));
        }

        let mut reply = match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => parse_gemini_response(&value),
            Err(e) => {
                debug!(error = %e, "Gemini response was not JSON");
                ProviderReply::default()
            }
        };
        reply.status_code = Some(status.as_u16());
        Ok(reply)
    }
}

// -- Gemini wire types --

#[derive(Debug, Serialize)]
pub struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["error"]["message"].as_str().map(str::to_string)
}

pub fn parse_gemini_response(body: &serde_json::Value) -> ProviderReply {
    let candidate = &body["candidates"][0];

    let text = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<String>()
        })
        .filter(|t| !t.is_empty());

    let block_reason = body["promptFeedback"]["blockReason"]
        .as_str()
        .or_else(|| {
            candidate["finishReason"]
                .as_str()
                .filter(|r| BLOCKING_FINISH_REASONS.contains(r))
        })
        .map(str::to_string);

    ProviderReply {
        text,
        block_reason,
        status_code: None,
    }
}
