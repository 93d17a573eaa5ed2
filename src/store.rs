//! File-backed task collection.
//!
//! The whole collection lives in one JSON document of the form
//! `{ "tasks": [ { "id": ..., ... } ] }` and is rewritten wholesale after
//! every mutation. Records are stored exactly as received apart from the
//! generated `id`. There is no concurrency token: two processes writing the
//! same file silently overwrite each other.

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::model::{Record, Task, TaskId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task '{0}' not found")]
    NotFound(TaskId),

    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode task collection: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// The narrow interface the board and the HTTP service talk to.
pub trait TaskStore {
    /// Current records in insertion order.
    fn list_tasks(&self) -> Vec<Record>;

    /// Store `fields` under a freshly generated id and return the stored record.
    fn create_task(&mut self, fields: Record) -> Result<Record>;

    /// Shallow-merge `partial` onto the record with `id`.
    fn update_task(&mut self, id: &TaskId, partial: Record) -> Result<Record>;

    /// Remove the record with `id`. Removing an unknown id succeeds.
    fn delete_task(&mut self, id: &TaskId) -> Result<()>;

    /// Records decoded as board tasks.
    fn board_tasks(&self) -> Vec<Task> {
        self.list_tasks().iter().map(Task::from_record).collect()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    tasks: Vec<Record>,
}

/// A [`TaskStore`] mirrored to a JSON file, or held purely in memory when
/// opened without a path.
#[derive(Debug, Default)]
pub struct JsonFileStore {
    path: Option<PathBuf>,
    doc: Document,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file starts an empty collection;
    /// the file itself is only created by the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = read_document(&path)?;
        log::info!(
            "opened task store {} ({} tasks)",
            path.display(),
            doc.tasks.len()
        );
        Ok(Self {
            path: Some(path),
            doc,
        })
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Re-read the file, picking up writes made by other processes.
    pub fn reload(&mut self) -> Result<()> {
        if let Some(path) = &self.path {
            self.doc = read_document(path)?;
            log::debug!("reloaded {} ({} tasks)", path.display(), self.doc.tasks.len());
        }
        Ok(())
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.doc
            .tasks
            .iter()
            .position(|record| record_id(record).as_deref() == Some(id.as_str()))
    }

    /// Write `tasks` out and only then adopt them, so a failed write leaves
    /// the in-memory collection matching the file.
    fn commit(&mut self, tasks: Vec<Record>) -> Result<()> {
        let doc = Document { tasks };
        if let Some(path) = &self.path {
            let bytes = serde_json::to_vec_pretty(&doc)?;
            write_atomic(path, &bytes).map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
            log::debug!("wrote {} tasks to {}", doc.tasks.len(), path.display());
        }
        self.doc = doc;
        Ok(())
    }
}

impl TaskStore for JsonFileStore {
    fn list_tasks(&self) -> Vec<Record> {
        self.doc.tasks.clone()
    }

    fn create_task(&mut self, fields: Record) -> Result<Record> {
        let id = TaskId::generate();
        let mut record = Record::new();
        record.insert("id".into(), Value::String(id.to_string()));
        record.extend(fields.into_iter().filter(|(key, _)| key != "id"));
        let mut tasks = self.doc.tasks.clone();
        tasks.push(record.clone());
        self.commit(tasks)?;
        log::info!("created task {id}");
        Ok(record)
    }

    fn update_task(&mut self, id: &TaskId, partial: Record) -> Result<Record> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let mut tasks = self.doc.tasks.clone();
        let record = &mut tasks[index];
        for (key, value) in partial {
            if key != "id" {
                record.insert(key, value);
            }
        }
        let merged = record.clone();
        self.commit(tasks)?;
        log::info!("updated task {id}");
        Ok(merged)
    }

    fn delete_task(&mut self, id: &TaskId) -> Result<()> {
        let tasks: Vec<Record> = self
            .doc
            .tasks
            .iter()
            .filter(|record| record_id(record).as_deref() != Some(id.as_str()))
            .cloned()
            .collect();
        if tasks.len() == self.doc.tasks.len() {
            log::debug!("delete of unknown task {id} ignored");
            return Ok(());
        }
        self.commit(tasks)?;
        log::info!("deleted task {id}");
        Ok(())
    }
}

/// The id of a record in string form. Hand-edited files may carry numbers.
fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_document(path: &Path) -> Result<Document> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Document::default()),
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Document::default()),
        Err(source) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Replace `path` with `bytes` via a temp file in the same directory.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn open_temp() -> (tempfile::TempDir, PathBuf, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonFileStore::open(&path).unwrap();
        (dir, path, store)
    }

    #[test]
    fn missing_file_is_empty_and_not_created() {
        let (_dir, path, store) = open_temp();
        assert!(store.list_tasks().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn create_assigns_distinct_ids_and_persists() {
        let (_dir, path, mut store) = open_temp();
        let first = store.create_task(fields(json!({"title": "A"}))).unwrap();
        let second = store.create_task(fields(json!({"title": "X"}))).unwrap();

        let listed = store.list_tasks();
        let titled_x: Vec<_> = listed.iter().filter(|r| r["title"] == "X").collect();
        assert_eq!(titled_x.len(), 1);
        let id = titled_x[0]["id"].as_str().unwrap();
        assert!(!id.is_empty());
        assert_ne!(first["id"], second["id"]);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.list_tasks(), listed);
    }

    #[test]
    fn create_puts_id_first_and_ignores_payload_id() {
        let (_dir, _path, mut store) = open_temp();
        let record = store
            .create_task(fields(json!({"id": "mine", "title": "T"})))
            .unwrap();
        assert_ne!(record["id"], "mine");
        assert_eq!(record.keys().next().map(String::as_str), Some("id"));
        assert_eq!(record["title"], "T");
    }

    #[test]
    fn create_stores_arbitrary_fields_verbatim() {
        let (_dir, _path, mut store) = open_temp();
        let record = store
            .create_task(fields(json!({"title": 7, "extra": {"nested": [1, 2]}})))
            .unwrap();
        assert_eq!(record["title"], 7);
        assert_eq!(record["extra"]["nested"][1], 2);
    }

    #[test]
    fn update_merges_fields() {
        let (_dir, path, mut store) = open_temp();
        let created = store
            .create_task(fields(json!({"title": "T", "status": "todo"})))
            .unwrap();
        let id = TaskId::new(created["id"].as_str().unwrap());
        let merged = store
            .update_task(&id, fields(json!({"status": "done", "assignee": "JD"})))
            .unwrap();
        assert_eq!(merged["title"], "T");
        assert_eq!(merged["status"], "done");
        assert_eq!(merged["assignee"], "JD");

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.list_tasks()[0], merged);
    }

    #[test]
    fn update_never_rewrites_id() {
        let (_dir, _path, mut store) = open_temp();
        let created = store.create_task(fields(json!({"title": "T"}))).unwrap();
        let id = TaskId::new(created["id"].as_str().unwrap());
        let merged = store
            .update_task(&id, fields(json!({"id": "other"})))
            .unwrap();
        assert_eq!(merged["id"], created["id"]);
    }

    #[test]
    fn update_unknown_is_not_found_and_changes_nothing() {
        let (_dir, path, mut store) = open_temp();
        store.create_task(fields(json!({"title": "T"}))).unwrap();
        let before = std::fs::read(&path).unwrap();

        let err = store
            .update_task(&TaskId::from("missing"), fields(json!({"title": "U"})))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref id) if id.as_str() == "missing"));
        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(store.list_tasks()[0]["title"], "T");
    }

    #[test]
    fn delete_removes_record() {
        let (_dir, _path, mut store) = open_temp();
        let keep = store.create_task(fields(json!({"title": "keep"}))).unwrap();
        let gone = store.create_task(fields(json!({"title": "gone"}))).unwrap();
        store
            .delete_task(&TaskId::new(gone["id"].as_str().unwrap()))
            .unwrap();
        assert_eq!(store.list_tasks(), vec![keep]);
    }

    #[test]
    fn delete_unknown_leaves_file_untouched() {
        let (_dir, path, mut store) = open_temp();
        store.create_task(fields(json!({"title": "T"}))).unwrap();
        let before = std::fs::read(&path).unwrap();
        store.delete_task(&TaskId::from("nope")).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn numeric_ids_in_hand_written_files_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, r#"{"tasks":[{"id":4,"title":"old"}]}"#).unwrap();
        let mut store = JsonFileStore::open(&path).unwrap();
        let merged = store
            .update_task(&TaskId::from("4"), fields(json!({"title": "new"})))
            .unwrap();
        assert_eq!(merged["title"], "new");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Parse { .. })
        ));
    }

    #[test]
    fn reload_sees_external_writes() {
        let (_dir, path, mut store) = open_temp();
        let mut other = JsonFileStore::open(&path).unwrap();
        other.create_task(fields(json!({"title": "from elsewhere"}))).unwrap();
        assert!(store.list_tasks().is_empty());
        store.reload().unwrap();
        assert_eq!(store.list_tasks().len(), 1);
    }

    #[test]
    fn in_memory_store_never_touches_disk() {
        let mut store = JsonFileStore::in_memory();
        let created = store.create_task(fields(json!({"title": "T"}))).unwrap();
        assert!(store.path().is_none());
        assert_eq!(store.board_tasks()[0].title, "T");
        assert_eq!(store.board_tasks()[0].id.as_str(), created["id"]);
    }

    #[test]
    fn failed_write_leaves_collection_unchanged() {
        let (_dir, path, mut store) = open_temp();
        let kept = store.create_task(fields(json!({"title": "Kept"}))).unwrap();
        let id = TaskId::new(kept["id"].as_str().unwrap());

        // A directory where the file goes makes every rename fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(matches!(
            store.create_task(fields(json!({"title": "X"}))),
            Err(StoreError::Write { .. })
        ));
        assert!(store.update_task(&id, fields(json!({"title": "Y"}))).is_err());
        assert!(store.delete_task(&id).is_err());
        assert_eq!(store.list_tasks(), vec![kept]);
    }
}
