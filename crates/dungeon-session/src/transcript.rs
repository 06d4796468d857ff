use dungeon_core::{ConversationLog, ImportError, SessionId, SessionSettings};
use serde::Serialize;
use serde_json::Value;

/// Portable export of one session, independent of any store.
///
/// Serializes to:
///
/// ```json
/// {
///   "history": [{"sender": "user", "text": "..."}],
///   "settings": {"current_mode": "censored", "temperature": 0.7, "tone": "Fantasy"},
///   "exported_from_user_id": "..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptDocument {
    /// The full conversation.
    pub history: ConversationLog,
    /// Settings at export time.
    pub settings: SessionSettings,
    /// Session the transcript came from. Informational only.
    #[serde(rename = "exported_from_user_id")]
    pub exported_from: SessionId,
}

impl TranscriptDocument {
    /// Captures a session. Never fails.
    pub fn serialize(
        history: &ConversationLog,
        settings: &SessionSettings,
        id: &SessionId,
    ) -> Self {
        Self {
            history: history.clone(),
            settings: *settings,
            exported_from: id.clone(),
        }
    }

    /// Pretty-printed JSON, two-space indented.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Decodes transcript text and extracts its history and settings.
    ///
    /// Settings fields missing from the document keep their value from `current`.
    pub fn decode(
        text: &str,
        current: &SessionSettings,
    ) -> Result<(ConversationLog, SessionSettings), ImportError> {
        Self::decode_bytes(text.as_bytes(), current)
    }

    /// Like [`decode`](Self::decode), for raw file contents.
    ///
    /// Bytes that are not UTF-8 JSON fail with [`ImportError::DecodeFailure`].
    pub fn decode_bytes(
        bytes: &[u8],
        current: &SessionSettings,
    ) -> Result<(ConversationLog, SessionSettings), ImportError> {
        let doc: Value =
            serde_json::from_slice(bytes).map_err(|e| ImportError::DecodeFailure(e.to_string()))?;
        Self::deserialize(&doc, current)
    }

    /// Extracts history and settings from an already-parsed document.
    ///
    /// Both `history` and `settings` must be present at the top level. Each
    /// settings field is optional and falls back to `current`.
    pub fn deserialize(
        doc: &Value,
        current: &SessionSettings,
    ) -> Result<(ConversationLog, SessionSettings), ImportError> {
        let obj = doc
            .as_object()
            .ok_or_else(|| malformed("expected a JSON object"))?;

        let history_value = obj
            .get("history")
            .ok_or_else(|| malformed("missing 'history'"))?;
        let settings_value = obj
            .get("settings")
            .ok_or_else(|| malformed("missing 'settings'"))?;

        let history: ConversationLog = serde_json::from_value(history_value.clone())
            .map_err(|e| malformed(format!("history: {e}")))?;

        let fields = settings_value
            .as_object()
            .ok_or_else(|| malformed("'settings' must be an object"))?;

        let mut settings = *current;
        if let Some(mode) = fields.get("current_mode") {
            let name = mode
                .as_str()
                .ok_or_else(|| malformed(format!("current_mode: {mode}")))?;
            settings
                .set_mode_str(name)
                .map_err(|e| malformed(e.to_string()))?;
        }
        if let Some(temperature) = fields.get("temperature") {
            let value = temperature
                .as_f64()
                .ok_or_else(|| malformed(format!("temperature: {temperature}")))?;
            settings
                .set_temperature(value)
                .map_err(|e| malformed(e.to_string()))?;
        }
        if let Some(tone) = fields.get("tone") {
            let name = tone
                .as_str()
                .ok_or_else(|| malformed(format!("tone: {tone}")))?;
            settings
                .set_tone_str(name)
                .map_err(|e| malformed(e.to_string()))?;
        }

        Ok((history, settings))
    }
}

fn malformed(detail: impl Into<String>) -> ImportError {
    ImportError::MalformedDocument(detail.into())
}

/// Suggested file name for an export of session `id`.
pub fn export_file_name(id: &SessionId) -> String {
    format!("dungeon_gpt_story_{}.json", id.short())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
