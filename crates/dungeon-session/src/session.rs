use crate::store::PersistenceStore;
use crate::transcript::TranscriptDocument;
use dungeon_core::{ConversationLog, ImportError, SessionId, SessionSettings, StoreResult};
use tracing::info;

/// Whether an operation changed what the front-end should be showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Refresh {
    /// Log or settings changed; redraw.
    Needed,
    /// Nothing visible changed.
    NotNeeded,
}

impl Refresh {
    /// Whether a redraw is needed.
    pub fn is_needed(self) -> bool {
        matches!(self, Refresh::Needed)
    }
}

/// Result of trying to resume a saved session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The saved log and settings replaced the current ones.
    Restored,
    /// The store holds nothing for this session; current state is untouched.
    NothingSaved,
}

/// The state of one active session: identifier, conversation and settings.
///
/// The front-end keeps this value between actions and hands it to each
/// operation by `&mut`, so no two actions can interleave on one session.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: SessionId,
    /// The conversation so far.
    pub log: ConversationLog,
    /// Current generation settings.
    pub settings: SessionSettings,
}

impl SessionState {
    /// Starts a session under a freshly minted id.
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Starts an empty session under a known id.
    pub fn with_id(id: SessionId) -> Self {
        info!(session_id = %id, "Session started");
        Self {
            id,
            log: ConversationLog::new(),
            settings: SessionSettings::default(),
        }
    }

    /// The persistence key of this session.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Seeds the welcome turn if the log is empty, then returns the log.
    ///
    /// Call before presenting the conversation.
    pub fn display_log(&mut self) -> &ConversationLog {
        if self.log.ensure_welcome() {
            info!(session_id = %self.id, "Seeded welcome turn");
        }
        &self.log
    }

    /// Discards the story and restores default settings. The id is kept.
    pub fn new_story(&mut self) -> Refresh {
        self.log.clear();
        self.settings.reset();
        info!(session_id = %self.id, "Started a new story");
        Refresh::Needed
    }

    /// Saves log and settings under this session's id.
    pub async fn save(&self, store: &PersistenceStore) -> StoreResult<()> {
        store.save(&self.id, &self.log, &self.settings).await
    }

    /// Replaces log and settings with the saved copy, if there is one.
    pub async fn load(&mut self, store: &PersistenceStore) -> StoreResult<LoadOutcome> {
        match store.load(&self.id).await? {
            Some(record) => {
                self.log = record.history;
                self.settings = record.settings;
                Ok(LoadOutcome::Restored)
            }
            None => Ok(LoadOutcome::NothingSaved),
        }
    }

    /// Captures the session as a portable transcript.
    pub fn export(&self) -> TranscriptDocument {
        info!(session_id = %self.id, turns = self.log.len(), "Exporting transcript");
        TranscriptDocument::serialize(&self.log, &self.settings, &self.id)
    }

    /// Replaces log and settings from transcript text or raw file bytes.
    ///
    /// Settings missing from the transcript keep their current values. On
    /// error the session is left exactly as it was.
    pub fn import(&mut self, data: impl AsRef<[u8]>) -> Result<Refresh, ImportError> {
        let (log, settings) = TranscriptDocument::decode_bytes(data.as_ref(), &self.settings)?;
        info!(session_id = %self.id, turns = log.len(), "Imported transcript");
        self.log = log;
        self.settings = settings;
        Ok(Refresh::Needed)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use dungeon_core::{Mode, Tone, Turn, WELCOME_TEXT};

    #[test]
    fn display_log_seeds_welcome_once() {
        let mut state = SessionState::new();
        assert!(state.log.is_empty());

        assert_eq!(state.display_log().len(), 1);
        assert_eq!(state.display_log().len(), 1);
        assert_eq!(state.log.turns()[0].text, WELCOME_TEXT);
    }

    #[test]
    fn new_story_clears_log_and_resets_settings() {
        let mut state = SessionState::new();
        let id = state.id().clone();
        state.log.append(Turn::user("hello"));
        state.settings.set_tone(Tone::Horror);
        state.settings.set_mode(Mode::Uncensored);

        assert!(state.new_story().is_needed());
        assert!(state.log.is_empty());
        assert_eq!(state.settings, SessionSettings::default());
        assert_eq!(state.id(), &id);

        state.display_log();
        assert_eq!(state.log.len(), 1);
    }

    #[test]
    fn failed_import_leaves_state_untouched() {
        let mut state = SessionState::new();
        state.log.append(Turn::user("keep me"));
        state.settings.set_tone(Tone::Comedy);

        assert!(state.import("{\"foo\": 1}").is_err());
        assert!(state.import("not json").is_err());
        assert!(matches!(
            state.import([0xff, 0xfe, b'{', b'}']),
            Err(ImportError::DecodeFailure(_))
        ));

        assert_eq!(state.log.len(), 1);
        assert_eq!(state.settings.tone(), Tone::Comedy);
    }

    #[test]
    fn import_replaces_history_wholesale() {
        let mut state = SessionState::new();
        state.log.append(Turn::user("old"));

        let refresh = state
            .import(r#"{"history": [{"sender": "ai", "text": "new"}], "settings": {"tone": "Sci-Fi"}}"#)
            .unwrap();
        assert_eq!(refresh, Refresh::Needed);
        assert_eq!(state.log.turns(), &[Turn::ai("new")]);
        assert_eq!(state.settings.tone(), Tone::SciFi);
    }

    #[test]
    fn export_carries_session_id() {
        let state = SessionState::with_id(SessionId::parse("me").unwrap());
        let doc = state.export();
        assert_eq!(doc.exported_from.as_str(), "me");
    }
}
