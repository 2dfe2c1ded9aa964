//! JSON file persistence for the list.
//!
//! Saves are atomic: the encoded list is written to a sibling temporary file,
//! synced, and renamed over the target. A failed save leaves the previous file
//! in place.

use crate::metrics::PersistenceMetrics;
use async_trait::async_trait;
use listkeeper_core::{Persistence, TodoError, TodoList, codec};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::AsyncWriteExt;

/// Persists the list as a JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileCodec {
    path: PathBuf,
}

impl JsonFileCodec {
    /// Creates a codec for `path`; the file need not exist yet
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the data file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("list"), OsString::from);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> TodoError {
        TodoError::io(self.location(), source)
    }

    async fn write_atomically(&self, bytes: &[u8]) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        let written = async {
            let mut file = tokio::fs::File::create(&temp_path).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            tokio::fs::rename(&temp_path, &self.path).await
        }
        .await;

        if written.is_err() {
            // Best effort; the original file was never touched.
            let _ = tokio::fs::remove_file(&temp_path).await;
        }
        written
    }
}

#[async_trait]
impl Persistence for JsonFileCodec {
    async fn load(&self) -> Result<TodoList, TodoError> {
        let started = Instant::now();

        let list = match tokio::fs::read(&self.path).await {
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(file = %self.path.display(), "Data file not found, starting with an empty list");
                TodoList::new()
            }
            Err(err) => {
                tracing::error!(file = %self.path.display(), error = %err, "Failed to read data file");
                return Err(self.io_error(err));
            }
            Ok(bytes) if bytes.is_empty() => {
                tracing::info!(file = %self.path.display(), "Data file is empty, starting with an empty list");
                TodoList::new()
            }
            Ok(bytes) => {
                let list = codec::decode(&bytes).map_err(|err| {
                    tracing::error!(file = %self.path.display(), error = %err, "Failed to decode data file contents");
                    TodoError::decode(self.location(), err)
                })?;
                tracing::info!(file = %self.path.display(), items = list.len(), "Loaded list from disk");
                list
            }
        };

        PersistenceMetrics::record_load(list.len(), started.elapsed());
        Ok(list)
    }

    async fn save(&self, list: &TodoList) -> Result<(), TodoError> {
        let started = Instant::now();
        let bytes = codec::encode(list).map_err(TodoError::Encode)?;

        if let Err(err) = self.write_atomically(&bytes).await {
            PersistenceMetrics::record_save_error();
            tracing::error!(file = %self.path.display(), error = %err, "Failed to save list");
            return Err(self.io_error(err));
        }

        PersistenceMetrics::record_save(list.len(), started.elapsed());
        tracing::info!(file = %self.path.display(), items = list.len(), "Saved list to disk");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use listkeeper_core::{ItemId, ItemPatch, NewItem};
    use tempfile::TempDir;

    fn sample_list() -> TodoList {
        let mut list = TodoList::new();
        list.add(ItemId::new(1), NewItem::new("Buy milk", "01-01-2025").unwrap());
        list.add(ItemId::new(2), NewItem::new("Walk dog", "02-01-2025").unwrap());
        list.update(ItemId::new(2), &ItemPatch::new().completed(true))
            .unwrap();
        list
    }

    #[tokio::test]
    async fn load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let codec = JsonFileCodec::new(dir.path().join("missing.json"));

        let list = codec.load().await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn load_empty_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, b"").unwrap();

        let list = JsonFileCodec::new(&path).load().await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn load_malformed_file_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, br#"{"Name":"Test ToDo","Completed":false"#).unwrap();

        let err = JsonFileCodec::new(&path).load().await.unwrap_err();
        assert!(matches!(err, TodoError::Decode { .. }));
    }

    #[tokio::test]
    async fn load_directory_is_io_error() {
        let dir = TempDir::new().unwrap();

        let err = JsonFileCodec::new(dir.path()).load().await.unwrap_err();
        assert!(matches!(err, TodoError::Io { .. }));
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let codec = JsonFileCodec::new(dir.path().join("todos.json"));
        let list = sample_list();

        codec.save(&list).await.unwrap();
        assert_eq!(codec.load().await.unwrap(), list);
    }

    #[tokio::test]
    async fn save_empty_list_writes_empty_array() {
        let dir = TempDir::new().unwrap();
        let codec = JsonFileCodec::new(dir.path().join("todos.json"));

        codec.save(&TodoList::new()).await.unwrap();

        let contents = std::fs::read_to_string(codec.path()).unwrap();
        assert_eq!(contents.trim(), "[]");
        assert!(codec.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_replaces_previous_content_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let codec = JsonFileCodec::new(dir.path().join("todos.json"));

        codec.save(&sample_list()).await.unwrap();
        codec.save(&TodoList::new()).await.unwrap();

        assert!(codec.load().await.unwrap().is_empty());
        assert!(!codec.temp_path().exists());
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let codec = JsonFileCodec::new(dir.path().join("nested/deeper/todos.json"));

        codec.save(&sample_list()).await.unwrap();
        assert_eq!(codec.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todos.json");
        let codec = JsonFileCodec::new(&path);
        codec.save(&sample_list()).await.unwrap();

        // A directory where the temp file should go makes the write fail.
        std::fs::create_dir(codec.temp_path()).unwrap();
        let err = codec.save(&TodoList::new()).await.unwrap_err();

        assert!(matches!(err, TodoError::Io { .. }));
        assert_eq!(codec.load().await.unwrap(), sample_list());
    }

    #[test]
    fn first_run_load_is_counted() {
        let dir = TempDir::new().unwrap();
        let codec = JsonFileCodec::new(dir.path().join("missing.json"));
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let list = metrics::with_local_recorder(&recorder, || {
            runtime.block_on(codec.load()).unwrap()
        });

        assert!(list.is_empty());
        let rendered = recorder.handle().render();
        assert!(rendered.contains("persistence_loads_total 1"));
        assert!(rendered.contains("persistence_items 0"));
    }

    #[test]
    fn temp_path_is_a_sibling() {
        let codec = JsonFileCodec::new("/data/todos.json");
        assert_eq!(codec.temp_path(), PathBuf::from("/data/todos.json.tmp"));
        assert_eq!(codec.location(), "/data/todos.json");
    }
}
