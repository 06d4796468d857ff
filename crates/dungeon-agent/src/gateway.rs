use crate::backends::gemini::GeminiProvider;
use crate::backends::{ProviderFailure, ProviderReply, TextProvider};
use crate::config::{FilterStrictness, ModelConfig, ProviderConfig};
use crate::context::PromptBuilder;
use dungeon_core::{ConversationLog, GenerationError, ProviderCategory, SessionSettings};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns a conversation plus settings into the next piece of story.
///
/// Every outcome, including a missing provider, comes back as a value; the
/// gateway never panics on provider behavior and never retries.
pub struct GenerationGateway {
    provider: Option<Arc<dyn TextProvider>>,
    prompts: PromptBuilder,
}

impl GenerationGateway {
    /// `None` models absent credentials: every call then fails fast.
    pub fn new(provider: Option<Arc<dyn TextProvider>>, history_window: usize) -> Self {
        Self {
            provider,
            prompts: PromptBuilder::new(history_window),
        }
    }

    /// Builds a Gemini-backed gateway, or an unconfigured one without an API key.
    pub fn from_config(config: ModelConfig) -> Self {
        let window = config.history_window;
        let provider: Option<Arc<dyn TextProvider>> = if config.has_credentials() {
            Some(Arc::new(GeminiProvider::new(config)))
        } else {
            warn!("No API key configured; story generation is disabled");
            None
        };
        Self::new(provider, window)
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn history_window(&self) -> usize {
        self.prompts.window()
    }

    pub fn build_prompt(&self, history: &ConversationLog, settings: &SessionSettings) -> String {
        self.prompts.build(history, settings.tone())
    }

    pub async fn generate(
        &self,
        history: &ConversationLog,
        settings: &SessionSettings,
    ) -> Result<String, GenerationError> {
        let mode = settings.mode();
        let Some(provider) = &self.provider else {
            warn!(mode = %mode, "Generation requested but no provider is configured");
            return Err(GenerationError::not_configured());
        };

        let prompt = self.build_prompt(history, settings);
        let config = ProviderConfig {
            temperature: settings.temperature(),
            filter: FilterStrictness::for_mode(mode),
        };

        info!(
            mode = %mode,
            temperature = config.temperature,
            est_tokens = PromptBuilder::estimated_tokens(&prompt),
            "Calling text provider"
        );
        debug!(prompt = %truncate(&prompt, 200), "Prompt sent");

        let outcome = classify(provider.invoke(&prompt, &config).await);
        match &outcome {
            Ok(text) => info!(mode = %mode, chars = text.len(), "Generation succeeded"),
            Err(e) => warn!(mode = %mode, error = %e, "Generation failed"),
        }
        outcome
    }
}

/// Maps a raw provider outcome onto exactly one generation result.
pub fn classify(
    outcome: Result<ProviderReply, ProviderFailure>,
) -> Result<String, GenerationError> {
    let reply = match outcome {
        Ok(reply) => reply,
        Err(failure) => {
            return Err(GenerationError::provider(
                ProviderCategory::from_status(failure.status_code),
                failure.detail,
            ));
        }
    };

    if let Some(code) = reply.status_code.filter(|c| !(200..300).contains(c)) {
        let detail = reply
            .block_reason
            .unwrap_or_else(|| format!("provider returned status {code}"));
        return Err(GenerationError::provider(
            ProviderCategory::from_status(Some(code)),
            detail,
        ));
    }

    match reply.text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => match reply.block_reason {
            Some(reason) => Err(GenerationError::Blocked {
                reason: Some(reason),
            }),
            None => Err(GenerationError::Empty),
        },
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success() {
        assert_eq!(
            classify(Ok(ProviderReply::text("A door opens."))),
            Ok("A door opens.".to_string())
        );
    }

    #[test]
    fn test_classify_blank_text_is_empty() {
        assert_eq!(
            classify(Ok(ProviderReply::text("   \n"))),
            Err(GenerationError::Empty)
        );
        assert_eq!(
            classify(Ok(ProviderReply::default())),
            Err(GenerationError::Empty)
        );
    }

    #[test]
    fn test_classify_blocked_carries_reason() {
        assert_eq!(
            classify(Ok(ProviderReply::blocked("SAFETY"))),
            Err(GenerationError::Blocked {
                reason: Some("SAFETY".into())
            })
        );
    }

    #[test]
    fn test_classify_status_only_reply() {
        let err = classify(Ok(ProviderReply::status(403))).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Provider {
                category: ProviderCategory::Forbidden,
                ..
            }
        ));

        let err = classify(Ok(ProviderReply::status(502))).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Provider {
                category: ProviderCategory::ServerError,
                ..
            }
        ));
    }

    #[test]
    fn test_classify_ok_status_with_text_succeeds() {
        let reply = ProviderReply {
            text: Some("ok".into()),
            block_reason: None,
            status_code: Some(200),
        };
        assert_eq!(classify(Ok(reply)), Ok("ok".to_string()));
    }

    #[test]
    fn test_classify_failures() {
        let cases = [
            (Some(401), ProviderCategory::Unauthorized),
            (Some(403), ProviderCategory::Forbidden),
            (Some(500), ProviderCategory::ServerError),
            (Some(429), ProviderCategory::Unknown),
            (None, ProviderCategory::Unknown),
        ];
        for (status, expected) in cases {
            let err = classify(Err(ProviderFailure::new(status, "boom"))).unwrap_err();
            assert_eq!(err, GenerationError::provider(expected, "boom"));
        }
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
