pub mod gemini;

use crate::config::ProviderConfig;
use async_trait::async_trait;

/// What a provider call returned. Any combination of fields may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderReply {
    pub text: Option<String>,
    /// Why the provider withheld text, when it says so.
    pub block_reason: Option<String>,
    /// Status reported alongside the reply.
    pub status_code: Option<u16>,
}

impl ProviderReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            block_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            status_code: Some(code),
            ..Self::default()
        }
    }
}

/// A provider call that did not complete (transport, auth, server side).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub status_code: Option<u16>,
    pub detail: String,
}

impl ProviderFailure {
    pub fn new(status_code: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            status_code,
            detail: detail.into(),
        }
    }
}

/// Trait for text generation providers.
///
/// Implementations only move text; classification of the outcome happens in
/// [`GenerationGateway`](crate::gateway::GenerationGateway).
#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn invoke(
        &self,
        prompt: &str,
        config: &ProviderConfig,
    ) -> Result<ProviderReply, ProviderFailure>;
}
