//! Session state, persistence and portable transcripts.
//!
//! # Main types
//!
//! - [`SessionState`]: The conversation and settings of one active session.
//! - [`PersistenceStore`]: Merge-on-save persistence keyed by [`SessionId`](dungeon_core::SessionId).
//! - [`DocumentBackend`]: Keyed document API the store writes through.
//! - [`TranscriptDocument`]: Self-contained export/import unit.

/// Document backends: in-memory and JSON files on disk.
pub mod backend;
/// The active session and the operations a front-end triggers on it.
pub mod session;
/// Save/load of sessions against a document backend.
pub mod store;
/// Portable JSON transcripts.
pub mod transcript;

pub use backend::{
    Document, DocumentBackend, FieldWrite, FileDocumentBackend, InMemoryDocumentBackend,
};
pub use session::{LoadOutcome, Refresh, SessionState};
pub use store::{PersistedSessionRecord, PersistenceStore, DEFAULT_APP_ID};
pub use transcript::{export_file_name, TranscriptDocument};
