use crate::error::{Error, Result};
use crate::models::{FeedbackRecord, NewFeedback};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_DATA_FILE: &str = "data/feedbacks.json";

/// Durable, insertion-ordered collection of feedback.
///
/// `append` assigns `id = len + 1` at the moment of the write. Ids are only
/// unique while nothing deletes records and a single process owns the file.
pub trait FeedbackStore: Send + Sync {
    fn read_all(&self) -> Result<Vec<FeedbackRecord>>;
    fn append(&self, feedback: NewFeedback) -> Result<FeedbackRecord>;
}

/// Whole-file JSON array on disk, rewritten on every append.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write within this process only.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Like `new`, but seeds an empty `[]` file (and its directory) if none exists.
    pub fn open_or_create(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        if !store.path.exists() {
            if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| Error::storage(&store.path, e))?;
            }
            store.write_all(&[])?;
            info!(path = %store.path.display(), "created empty feedback file");
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<FeedbackRecord>> {
        let s = fs::read_to_string(&self.path).map_err(|e| Error::storage(&self.path, e))?;
        let records: Vec<FeedbackRecord> =
            serde_json::from_str(&s).map_err(|e| Error::storage(&self.path, e))?;
        Ok(records)
    }

    fn write_all(&self, records: &[FeedbackRecord]) -> Result<()> {
        let mut s = serde_json::to_string_pretty(records).map_err(|e| Error::storage(&self.path, e))?;
        s.push('\n');
        atomic_write(&self.path, s.as_bytes()).map_err(|e| Error::storage(&self.path, e))
    }
}

impl FeedbackStore for JsonFileStore {
    fn read_all(&self) -> Result<Vec<FeedbackRecord>> {
        let records = self.load()?;
        debug!(count = records.len(), "read feedback collection");
        Ok(records)
    }

    fn append(&self, feedback: NewFeedback) -> Result<FeedbackRecord> {
        let _guard = self.write_lock.lock();
        let mut records = self.load()?;
        let record = feedback.into_record(records.len() as u64 + 1);
        records.push(record.clone());
        self.write_all(&records)?;
        info!(id = record.id, rating = record.rating, "appended feedback");
        Ok(record)
    }
}

/// Write to a `.tmp` sibling and rename it over `path`, so readers never see
/// a half-written file.
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, data)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rating;
    use tempfile::TempDir;

    fn new_feedback(name: &str, rating: i64) -> NewFeedback {
        NewFeedback {
            name: name.to_string(),
            email: format!("{}@x.com", name.to_lowercase()),
            message: "hello".to_string(),
            rating: Rating::new(rating).unwrap(),
            created_at: None,
        }
    }

    fn seeded() -> (TempDir, JsonFileStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open_or_create(dir.path().join("data").join("feedbacks.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_file_is_storage_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json"));
        let err = store.read_all().unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }

    #[test]
    fn corrupt_file_is_storage_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedbacks.json");
        fs::write(&path, "{ not an array").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.read_all(), Err(Error::StorageUnavailable { .. })));
        assert!(matches!(
            store.append(new_feedback("Ana", 5)),
            Err(Error::StorageUnavailable { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not an array");
    }

    #[test]
    fn open_or_create_seeds_empty_array() {
        let (_dir, store) = seeded();
        assert!(store.path().exists());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn open_or_create_leaves_existing_file_alone() {
        let (_dir, store) = seeded();
        store.append(new_feedback("Ana", 5)).unwrap();
        let reopened = JsonFileStore::open_or_create(store.path()).unwrap();
        assert_eq!(reopened.read_all().unwrap().len(), 1);
    }

    #[test]
    fn append_assigns_sequential_ids_in_order() {
        let (_dir, store) = seeded();
        for (i, name) in ["Ana", "Bo", "Cy"].iter().enumerate() {
            let rec = store.append(new_feedback(name, 4)).unwrap();
            assert_eq!(rec.id, i as u64 + 1);
        }
        let names: Vec<String> = store.read_all().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Ana", "Bo", "Cy"]);
    }

    #[test]
    fn id_follows_length_of_existing_file() {
        let (_dir, store) = seeded();
        fs::write(
            store.path(),
            r#"[{"id":10,"name":"x","email":"x@x.com","message":"m","rating":2,"createdAt":"2024-01-01T00:00:00.000Z"}]"#,
        )
        .unwrap();
        let rec = store.append(new_feedback("Ana", 5)).unwrap();
        assert_eq!(rec.id, 2);
    }

    #[test]
    fn append_keeps_supplied_timestamp() {
        let (_dir, store) = seeded();
        let mut fb = new_feedback("Ana", 5);
        fb.created_at = Some("2023-06-01T12:00:00.000Z".into());
        let rec = store.append(fb).unwrap();
        assert_eq!(rec.created_at, "2023-06-01T12:00:00.000Z");
        assert_eq!(store.read_all().unwrap()[0], rec);
    }

    #[test]
    fn file_is_pretty_printed_and_tmp_removed() {
        let (_dir, store) = seeded();
        store.append(new_feedback("Ana", 5)).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("[\n  {\n    \"id\": 1,"));
        assert!(raw.contains("\"createdAt\""));
        assert!(!tmp_path(store.path()).exists());
    }

    #[test]
    fn read_all_is_idempotent() {
        let (_dir, store) = seeded();
        store.append(new_feedback("Ana", 5)).unwrap();
        assert_eq!(store.read_all().unwrap(), store.read_all().unwrap());
    }

    #[test]
    fn concurrent_appends_get_distinct_ids() {
        const WRITERS: u64 = 16;
        let (_dir, store) = seeded();
        let mut ids: Vec<u64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..WRITERS)
                .map(|i| {
                    let store = &store;
                    s.spawn(move || store.append(new_feedback(&format!("user{i}"), 3)).unwrap().id)
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        ids.sort_unstable();
        assert_eq!(ids, (1..=WRITERS).collect::<Vec<_>>());
        assert_eq!(store.read_all().unwrap().len() as u64, WRITERS);
    }

    #[test]
    fn failed_rename_removes_tmp_file() {
        let dir = TempDir::new().unwrap();
        // a non-empty directory cannot be replaced by a file
        let target = dir.path().join("feedbacks.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        assert!(atomic_write(&target, b"[]").is_err());
        assert!(!tmp_path(&target).exists());
        assert!(target.join("keep").exists());
    }

    #[test]
    fn string_ratings_in_older_files_load() {
        let (_dir, store) = seeded();
        fs::write(
            store.path(),
            r#"[{"id":1,"name":"x","email":"x@x.com","message":"m","rating":"4","createdAt":"2024-01-01T00:00:00.000Z"}]"#,
        )
        .unwrap();
        assert_eq!(store.read_all().unwrap()[0].rating, 4);

        store.append(new_feedback("Ana", 5)).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"rating\": 4,"));
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("data/feedbacks.json")),
            PathBuf::from("data/feedbacks.json.tmp")
        );
    }
}
