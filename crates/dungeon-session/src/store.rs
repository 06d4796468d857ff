use crate::backend::{Document, DocumentBackend, FieldWrite};
use chrono::{DateTime, Utc};
use dungeon_core::{
    ConversationLog, Mode, SessionId, SessionSettings, StoreError, StoreResult, Tone,
    DEFAULT_TEMPERATURE,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Namespace used in document paths when none is configured.
pub const DEFAULT_APP_ID: &str = "dungeon-gpt-lite-app";

const FIELD_HISTORY: &str = "history";
const FIELD_MODE: &str = "current_mode";
const FIELD_TEMPERATURE: &str = "temperature";
const FIELD_TONE: &str = "tone";
const FIELD_TIMESTAMP: &str = "timestamp";

/// A session as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSessionRecord {
    /// The saved conversation.
    pub history: ConversationLog,
    /// Mode, temperature and tone at save time.
    pub settings: SessionSettings,
    /// When the backend accepted the last save, if it recorded one.
    pub saved_at: Option<DateTime<Utc>>,
}

/// Saves and loads sessions through a [`DocumentBackend`].
///
/// A store built without a backend refuses every operation with
/// [`StoreError::NotConfigured`] before touching anything.
#[derive(Clone)]
pub struct PersistenceStore {
    backend: Option<Arc<dyn DocumentBackend>>,
    app_id: String,
}

impl PersistenceStore {
    /// Creates a store over `backend`; `None` models a missing connection.
    pub fn new(backend: Option<Arc<dyn DocumentBackend>>, app_id: impl Into<String>) -> Self {
        Self {
            backend,
            app_id: app_id.into(),
        }
    }

    /// A store with no backend.
    pub fn unconfigured() -> Self {
        Self::new(None, DEFAULT_APP_ID)
    }

    /// Whether a backend is attached.
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Document path holding the current story of `id`.
    pub fn document_path(&self, id: &SessionId) -> String {
        format!(
            "artifacts/{}/users/{}/stories/current_session_data",
            self.app_id, id
        )
    }

    fn connect(&self, id: &SessionId) -> StoreResult<(&dyn DocumentBackend, String)> {
        let backend = self.backend.as_deref().ok_or(StoreError::NotConfigured)?;
        if id.as_str().contains('/') {
            return Err(StoreError::Transport(format!("invalid session id: {id}")));
        }
        Ok((backend, self.document_path(id)))
    }

    /// Merge-writes the history and settings of `id`, stamped by the backend.
    ///
    /// Fields this store does not own are left untouched.
    pub async fn save(
        &self,
        id: &SessionId,
        history: &ConversationLog,
        settings: &SessionSettings,
    ) -> StoreResult<()> {
        let (backend, path) = self.connect(id)?;

        let mut fields = BTreeMap::new();
        fields.insert(
            FIELD_HISTORY.to_string(),
            FieldWrite::Value(serde_json::to_value(history)?),
        );
        fields.insert(FIELD_MODE.to_string(), json!(settings.mode().as_str()).into());
        fields.insert(
            FIELD_TEMPERATURE.to_string(),
            json!(settings.temperature()).into(),
        );
        fields.insert(FIELD_TONE.to_string(), json!(settings.tone().as_str()).into());
        fields.insert(FIELD_TIMESTAMP.to_string(), FieldWrite::ServerTimestamp);

        backend.set_merge(&path, fields).await?;
        info!(session_id = %id, turns = history.len(), "Session saved");
        Ok(())
    }

    /// Reads the saved session of `id`. `Ok(None)` means nothing was saved.
    pub async fn load(&self, id: &SessionId) -> StoreResult<Option<PersistedSessionRecord>> {
        let (backend, path) = self.connect(id)?;

        let Some(doc) = backend.get(&path).await? else {
            info!(session_id = %id, "No saved session found");
            return Ok(None);
        };

        let record = parse_record(&doc)?;
        info!(session_id = %id, turns = record.history.len(), "Session loaded");
        Ok(Some(record))
    }
}

fn parse_record(doc: &Document) -> StoreResult<PersistedSessionRecord> {
    let history = match doc.get(FIELD_HISTORY) {
        Some(value) => serde_json::from_value::<ConversationLog>(value.clone())
            .map_err(|e| StoreError::Corrupt(format!("history: {e}")))?,
        None => ConversationLog::new(),
    };

    let mode = match doc.get(FIELD_MODE) {
        Some(value) => value
            .as_str()
            .and_then(|s| s.parse::<Mode>().ok())
            .ok_or_else(|| StoreError::Corrupt(format!("{FIELD_MODE}: {value}")))?,
        None => Mode::default(),
    };

    let temperature = match doc.get(FIELD_TEMPERATURE) {
        Some(value) => value
            .as_f64()
            .ok_or_else(|| StoreError::Corrupt(format!("{FIELD_TEMPERATURE}: {value}")))?,
        None => DEFAULT_TEMPERATURE,
    };

    let tone = match doc.get(FIELD_TONE) {
        Some(value) => value
            .as_str()
            .and_then(|s| s.parse::<Tone>().ok())
            .ok_or_else(|| StoreError::Corrupt(format!("{FIELD_TONE}: {value}")))?,
        None => Tone::default(),
    };

    let settings = SessionSettings::new(mode, temperature, tone)
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;

    let saved_at = doc.get(FIELD_TIMESTAMP).and_then(Value::as_str).and_then(|s| {
        match DateTime::parse_from_rfc3339(s) {
            Ok(t) => Some(t.with_timezone(&Utc)),
            Err(e) => {
                warn!(timestamp = s, error = %e, "Ignoring unreadable save timestamp");
                None
            }
        }
    });

    Ok(PersistedSessionRecord {
        history,
        settings,
        saved_at,
    })
}
