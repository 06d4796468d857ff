use crate::context::DEFAULT_HISTORY_WINDOW;
use dungeon_core::Mode;
use serde::{Deserialize, Serialize};

/// How aggressively the provider filters content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterStrictness {
    /// Block medium-and-above harm probabilities.
    Strict,
    /// Block nothing.
    Permissive,
}

impl FilterStrictness {
    /// The strictness a session mode asks for.
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Censored => FilterStrictness::Strict,
            Mode::Uncensored => FilterStrictness::Permissive,
        }
    }
}

/// Per-call knobs handed to a provider alongside the prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderConfig {
    pub temperature: f64,
    pub filter: FilterStrictness,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Empty means "take it from the environment"; still empty means unconfigured.
    #[serde(default)]
    pub api_key: String,
    pub api_base_url: Option<String>,
    /// How many recent turns are written into each prompt.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_model_id() -> String {
    "gemini-1.5-flash-latest".to_string()
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

impl ModelConfig {
    pub fn base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or("https://generativelanguage.googleapis.com")
    }

    /// Whether credentials are present.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            api_key: String::new(),
            api_base_url: None,
            history_window: default_history_window(),
        }
    }
}
