use std::fmt;
use thiserror::Error;

/// A convenience `Result` alias for persistence operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A settings mutation that was rejected. The previous value is left intact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid value for {field}: {value}")]
pub struct InvalidSettingValue {
    /// Name of the setting that was being changed.
    pub field: &'static str,
    /// The rejected input, rendered as text.
    pub value: String,
}

impl InvalidSettingValue {
    /// Creates a rejection for `field` carrying the offending input.
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Coarse classification of a failed provider call, inferred from its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderCategory {
    /// Missing or rejected credentials (401), or no provider configured at all.
    Unauthorized,
    /// Credentials accepted but lacking permission (403).
    Forbidden,
    /// The provider failed on its side (5xx).
    ServerError,
    /// Anything else: transport failures, rate limits, unexpected statuses.
    Unknown,
}

impl ProviderCategory {
    /// Maps an HTTP-style status code onto a category.
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            Some(401) => ProviderCategory::Unauthorized,
            Some(403) => ProviderCategory::Forbidden,
            Some(500..=599) => ProviderCategory::ServerError,
            _ => ProviderCategory::Unknown,
        }
    }
}

impl fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderCategory::Unauthorized => "unauthorized",
            ProviderCategory::Forbidden => "permission denied",
            ProviderCategory::ServerError => "server error",
            ProviderCategory::Unknown => "unknown error",
        };
        f.write_str(label)
    }
}

/// Every way a generation request can fail to produce story text.
///
/// The `Display` output is safe to show to the player as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The provider filtered the prompt or the answer.
    #[error("AI response was blocked by safety settings. Reason: {}", .reason.as_deref().unwrap_or("unspecified"))]
    Blocked {
        /// Reason reported by the provider, when it gives one.
        reason: Option<String>,
    },

    /// The call succeeded but carried no usable text.
    #[error("AI returned an empty or unreadable response.")]
    Empty,

    /// The call itself failed.
    #[error("AI provider error ({category}): {detail}")]
    Provider {
        /// Classification of the failure.
        category: ProviderCategory,
        /// Provider-supplied detail.
        detail: String,
    },
}

impl GenerationError {
    /// Shorthand for a [`GenerationError::Provider`] failure.
    pub fn provider(category: ProviderCategory, detail: impl Into<String>) -> Self {
        GenerationError::Provider {
            category,
            detail: detail.into(),
        }
    }

    /// The failure reported when no provider was configured for the session.
    pub fn not_configured() -> Self {
        Self::provider(ProviderCategory::Unauthorized, "not configured")
    }
}

/// Failures of the session persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No document backend was configured; nothing was attempted.
    #[error("Persistence is not configured")]
    NotConfigured,

    /// The backend could not be reached or rejected the request.
    #[error("Storage transport error: {0}")]
    Transport(String),

    /// A stored document exists but does not have the expected shape.
    #[error("Stored session is corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

/// Failures while importing a transcript document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The input parsed as JSON but is not a transcript.
    #[error("Invalid transcript: {0}")]
    MalformedDocument(String),

    /// The input is not valid JSON text.
    #[error("Could not decode transcript: {0}")]
    DecodeFailure(String),
}
