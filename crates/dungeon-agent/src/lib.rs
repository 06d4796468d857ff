pub mod backends;
pub mod config;
pub mod context;
pub mod gateway;
pub mod runner;

pub use backends::gemini::GeminiProvider;
pub use backends::{ProviderFailure, ProviderReply, TextProvider};
pub use config::{FilterStrictness, ModelConfig, ProviderConfig};
pub use context::{PromptBuilder, DEFAULT_HISTORY_WINDOW};
pub use gateway::GenerationGateway;
pub use runner::{StoryRunner, TurnOutcome};
