//! Core types and error definitions for the Dungeon story engine.
//!
//! This crate provides the foundational types shared across all Dungeon crates:
//! the conversation log, the generation settings a player can change, the
//! session identifier used as the persistence key, and the error taxonomy.
//!
//! # Main types
//!
//! - [`Turn`]: One message in the story, authored by the player or the AI.
//! - [`ConversationLog`]: Ordered, append-only list of turns.
//! - [`SessionSettings`]: Mode, temperature and tone used for generation.
//! - [`SessionId`]: Opaque per-session token.
//! - [`GenerationError`], [`StoreError`], [`ImportError`], [`InvalidSettingValue`]:
//!   Typed failures surfaced by the generation, persistence and transcript layers.

/// Error taxonomy shared by every Dungeon subsystem.
pub mod error;
/// Opaque session identifiers.
pub mod id;
/// Generation settings: mode, temperature and tone.
pub mod settings;
/// Turns and the conversation log.
pub mod turn;

pub use error::{
    GenerationError, ImportError, InvalidSettingValue, ProviderCategory, StoreError, StoreResult,
};
pub use id::SessionId;
pub use settings::{Mode, SessionSettings, Tone, DEFAULT_TEMPERATURE};
pub use turn::{ConversationLog, Sender, Turn, WELCOME_TEXT};
