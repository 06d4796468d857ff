#![allow(clippy::unwrap_used, clippy::expect_used)]

use dungeon_core::{Mode, SessionId, SessionSettings, StoreError, Tone, Turn};
use dungeon_session::{
    DocumentBackend, FileDocumentBackend, LoadOutcome, PersistenceStore, SessionState,
    TranscriptDocument,
};
use std::sync::Arc;

/// Helper: create a file-backed PersistenceStore in a temp directory.
async fn temp_store() -> (PersistenceStore, Arc<FileDocumentBackend>, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let backend = Arc::new(
        FileDocumentBackend::new(tmp.path().join("store"))
            .await
            .unwrap(),
    );
    let store = PersistenceStore::new(Some(backend.clone()), "integration");
    (store, backend, tmp)
}

#[tokio::test]
async fn test_save_and_resume_in_new_process() {
    let (store, _backend, _tmp) = temp_store().await;

    let mut state = SessionState::new();
    state.display_log();
    state.log.append(Turn::user("I enter the tavern"));
    state.log.append(Turn::ai("The bard stops playing."));
    state.settings.set_tone(Tone::Mystery);
    state.settings.set_temperature(0.55).unwrap();
    state.save(&store).await.unwrap();

    // A later run resumes under the same id.
    let mut resumed = SessionState::with_id(state.id().clone());
    let outcome = resumed.load(&store).await.unwrap();

    assert_eq!(outcome, LoadOutcome::Restored);
    assert_eq!(resumed.log, state.log);
    assert_eq!(resumed.settings, state.settings);
}

#[tokio::test]
async fn test_load_without_save_reports_nothing_saved() {
    let (store, _backend, _tmp) = temp_store().await;

    let mut state = SessionState::with_id(SessionId::parse("unknown-id").unwrap());
    state.log.append(Turn::user("unsaved"));

    let outcome = state.load(&store).await.unwrap();
    assert_eq!(outcome, LoadOutcome::NothingSaved);
    assert_eq!(state.log.len(), 1);
}

#[tokio::test]
async fn test_load_replaces_rather_than_merges() {
    let (store, _backend, _tmp) = temp_store().await;

    let mut state = SessionState::new();
    state.log.append(Turn::user("saved turn"));
    state.save(&store).await.unwrap();

    state.log.append(Turn::ai("unsaved reply"));
    state.settings.set_mode(Mode::Uncensored);

    state.load(&store).await.unwrap();
    assert_eq!(state.log.turns(), &[Turn::user("saved turn")]);
    assert_eq!(state.settings.mode(), Mode::Censored);
}

#[tokio::test]
async fn test_second_save_overwrites_history_and_stamp() {
    let (store, backend, _tmp) = temp_store().await;
    let id = SessionId::new();

    let mut state = SessionState::with_id(id.clone());
    state.log.append(Turn::user("one"));
    state.save(&store).await.unwrap();
    let first = store.load(&id).await.unwrap().unwrap();

    state.log.append(Turn::user("two"));
    state.save(&store).await.unwrap();
    let second = store.load(&id).await.unwrap().unwrap();

    assert_eq!(second.history.len(), 2);
    assert!(second.saved_at >= first.saved_at);

    let doc = backend.get(&store.document_path(&id)).await.unwrap().unwrap();
    assert_eq!(doc["history"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unconfigured_store_via_session() {
    let store = PersistenceStore::unconfigured();
    let mut state = SessionState::new();

    assert!(matches!(
        state.save(&store).await.unwrap_err(),
        StoreError::NotConfigured
    ));
    assert!(matches!(
        state.load(&store).await.unwrap_err(),
        StoreError::NotConfigured
    ));
}

#[tokio::test]
async fn test_export_then_import_into_other_session() {
    let mut source = SessionState::new();
    source.display_log();
    source.log.append(Turn::user("cast fireball"));
    source.settings = SessionSettings::new(Mode::Uncensored, 1.0, Tone::Historical).unwrap();

    let json = source.export().to_json().unwrap();

    let mut target = SessionState::new();
    assert!(target.import(&json).unwrap().is_needed());

    assert_eq!(target.log, source.log);
    assert_eq!(target.settings, source.settings);
    assert_ne!(target.id(), source.id());

    // Exporting the imported session reproduces history and settings.
    let again = target.export();
    let original = TranscriptDocument::serialize(&source.log, &source.settings, source.id());
    assert_eq!(again.history, original.history);
    assert_eq!(again.settings, original.settings);
}
