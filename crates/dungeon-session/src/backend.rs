use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use dungeon_core::{StoreError, StoreResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// A stored document: a JSON object.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// The value written to one field of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWrite {
    /// Store this value as-is.
    Value(serde_json::Value),
    /// Let the backend store its own current time (RFC 3339, UTC).
    ServerTimestamp,
}

impl From<serde_json::Value> for FieldWrite {
    fn from(value: serde_json::Value) -> Self {
        FieldWrite::Value(value)
    }
}

/// Keyed document storage with merge writes.
///
/// Paths are `/`-separated segments. A merge write replaces the named fields
/// and keeps every other field of the stored document.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Reads a whole document. `None` when nothing is stored at `path`.
    async fn get(&self, path: &str) -> StoreResult<Option<Document>>;

    /// Creates the document or merges `fields` into it.
    async fn set_merge(&self, path: &str, fields: BTreeMap<String, FieldWrite>) -> StoreResult<()>;
}

fn server_now() -> serde_json::Value {
    serde_json::Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn merge_into(doc: &mut Document, fields: BTreeMap<String, FieldWrite>) {
    for (name, write) in fields {
        let value = match write {
            FieldWrite::Value(v) => v,
            FieldWrite::ServerTimestamp => server_now(),
        };
        doc.insert(name, value);
    }
}

// ---------------------------------------------------------------------------
// InMemoryDocumentBackend
// ---------------------------------------------------------------------------

/// Process-local backend. Data is lost when it is dropped.
pub struct InMemoryDocumentBackend {
    docs: RwLock<HashMap<String, Document>>,
}

impl InMemoryDocumentBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Whether nothing has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

impl Default for InMemoryDocumentBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentBackend for InMemoryDocumentBackend {
    async fn get(&self, path: &str) -> StoreResult<Option<Document>> {
        Ok(self.docs.read().await.get(path).cloned())
    }

    async fn set_merge(&self, path: &str, fields: BTreeMap<String, FieldWrite>) -> StoreResult<()> {
        let mut docs = self.docs.write().await;
        let doc = docs.entry(path.to_string()).or_default();
        merge_into(doc, fields);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileDocumentBackend
// ---------------------------------------------------------------------------

/// File-based backend: one pretty-printed JSON file per document path.
///
/// `artifacts/app/users/abc/stories/current` lands at
/// `<root>/artifacts/app/users/abc/stories/current.json`.
pub struct FileDocumentBackend {
    root: PathBuf,
}

impl FileDocumentBackend {
    /// Opens (and creates if needed) the root directory.
    pub async fn new(root: PathBuf) -> StoreResult<Self> {
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, path: &str) -> StoreResult<PathBuf> {
        let mut full = self.root.clone();
        for segment in path.split('/') {
            let valid = !segment.is_empty()
                && segment != "."
                && segment != ".."
                && !segment.contains('\\')
                && !segment.contains(':');
            if !valid {
                return Err(StoreError::Transport(format!(
                    "invalid document path: {path}"
                )));
            }
            full.push(segment);
        }
        full.set_extension("json");
        Ok(full)
    }

    async fn read_document(file: &Path) -> StoreResult<Option<Document>> {
        if !tokio::fs::try_exists(file).await? {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(file).await?;
        let value: serde_json::Value = serde_json::from_str(&data)?;
        match value {
            serde_json::Value::Object(doc) => Ok(Some(doc)),
            _ => Err(StoreError::Corrupt(format!(
                "{} does not hold a JSON object",
                file.display()
            ))),
        }
    }
}

#[async_trait]
impl DocumentBackend for FileDocumentBackend {
    async fn get(&self, path: &str) -> StoreResult<Option<Document>> {
        let file = self.document_path(path)?;
        Self::read_document(&file).await
    }

    async fn set_merge(&self, path: &str, fields: BTreeMap<String, FieldWrite>) -> StoreResult<()> {
        let file = self.document_path(path)?;
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut doc = Self::read_document(&file).await?.unwrap_or_default();
        merge_into(&mut doc, fields);

        let json = serde_json::to_string_pretty(&doc)?;
        let tmp = file.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &file).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn fields(pairs: Vec<(&str, FieldWrite)>) -> BTreeMap<String, FieldWrite> {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[tokio::test]
    async fn memory_get_missing_is_none() {
        let backend = InMemoryDocumentBackend::new();
        assert!(backend.get("a/b").await.unwrap().is_none());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn memory_merge_keeps_unrelated_fields() {
        let backend = InMemoryDocumentBackend::new();
        backend
            .set_merge("a/b", fields(vec![("owner", json!("dm").into())]))
            .await
            .unwrap();
        backend
            .set_merge(
                "a/b",
                fields(vec![("tone", json!("Horror").into()), ("owner", json!("me").into())]),
            )
            .await
            .unwrap();

        let doc = backend.get("a/b").await.unwrap().unwrap();
        assert_eq!(doc["owner"], "me");
        assert_eq!(doc["tone"], "Horror");
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn server_timestamp_is_resolved_by_backend() {
        let backend = InMemoryDocumentBackend::new();
        backend
            .set_merge("doc", fields(vec![("timestamp", FieldWrite::ServerTimestamp)]))
            .await
            .unwrap();

        let doc = backend.get("doc").await.unwrap().unwrap();
        let stamp = doc["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[tokio::test]
    async fn file_round_trip_and_merge() {
        let tmp = TempDir::new().unwrap();
        let backend = FileDocumentBackend::new(tmp.path().to_path_buf())
            .await
            .unwrap();

        backend
            .set_merge("users/u1/story", fields(vec![("extra", json!(42).into())]))
            .await
            .unwrap();
        backend
            .set_merge("users/u1/story", fields(vec![("tone", json!("Comedy").into())]))
            .await
            .unwrap();

        assert!(tmp.path().join("users/u1/story.json").exists());
        let doc = backend.get("users/u1/story").await.unwrap().unwrap();
        assert_eq!(doc["extra"], 42);
        assert_eq!(doc["tone"], "Comedy");
    }

    #[tokio::test]
    async fn file_persists_across_instances() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_path_buf();

        {
            let backend = FileDocumentBackend::new(dir.clone()).await.unwrap();
            backend
                .set_merge("k", fields(vec![("v", json!("persist me").into())]))
                .await
                .unwrap();
        }

        let backend = FileDocumentBackend::new(dir).await.unwrap();
        let doc = backend.get("k").await.unwrap().unwrap();
        assert_eq!(doc["v"], "persist me");
    }

    #[tokio::test]
    async fn file_rejects_escaping_paths() {
        let tmp = TempDir::new().unwrap();
        let backend = FileDocumentBackend::new(tmp.path().to_path_buf())
            .await
            .unwrap();

        for path in ["../outside", "a//b", "a/./b", ""] {
            let err = backend.get(path).await.unwrap_err();
            assert!(matches!(err, StoreError::Transport(_)), "{path}");
        }
    }

    #[tokio::test]
    async fn file_non_object_document_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("bad.json"), "[1, 2]").unwrap();
        let backend = FileDocumentBackend::new(tmp.path().to_path_buf())
            .await
            .unwrap();

        let err = backend.get("bad").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
