use crate::gateway::GenerationGateway;
use dungeon_core::{GenerationError, Turn};
use dungeon_session::{Refresh, SessionState};
use tracing::info;

/// What happened to one submitted player turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing was appended.
    Ignored,
    /// The generator continued the story with this text.
    Narrated(String),
    /// Generation failed. The failure message was appended as the AI's turn.
    Failed(GenerationError),
}

impl TurnOutcome {
    pub fn refresh(&self) -> Refresh {
        match self {
            TurnOutcome::Ignored => Refresh::NotNeeded,
            TurnOutcome::Narrated(_) | TurnOutcome::Failed(_) => Refresh::Needed,
        }
    }
}

/// The turn loop: player input → log → gateway → log.
pub struct StoryRunner {
    gateway: GenerationGateway,
}

impl StoryRunner {
    pub fn new(gateway: GenerationGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &GenerationGateway {
        &self.gateway
    }

    /// Appends the player's turn as typed, asks for a continuation and appends the reply.
    ///
    /// When generation fails the display text of the failure becomes the AI
    /// turn, so the story shows what went wrong; the typed error is returned
    /// too so callers can react to it.
    pub async fn submit(&self, session: &mut SessionState, input: &str) -> TurnOutcome {
        if input.trim().is_empty() {
            return TurnOutcome::Ignored;
        }

        session.log.append(Turn::user(input));
        info!(session_id = %session.id(), turns = session.log.len(), "Player turn received");

        match self.gateway.generate(&session.log, &session.settings).await {
            Ok(text) => {
                session.log.append(Turn::ai(text.clone()));
                TurnOutcome::Narrated(text)
            }
            Err(e) => {
                session.log.append(Turn::ai(e.to_string()));
                TurnOutcome::Failed(e)
            }
        }
    }
}
