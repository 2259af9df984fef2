use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::StoreError;

pub const PRODUCTS: &str = "products";
pub const CATEGORIES: &str = "categories";
pub const USERS: &str = "users";
pub const PURCHASES: &str = "purchases";

/// A directory of flat JSON collections, one file per collection name.
#[derive(Clone)]
pub struct Database {
    dir: PathBuf,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl Database {
    pub fn open(dir: impl Into<PathBuf>) -> Database {
        Database {
            dir: dir.into(),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Handles to the same name share one write lock.
    pub fn collection<T>(&self, name: &str) -> Collection<T> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.entry(name.to_string()).or_default().clone()
        };
        Collection {
            path: self.dir.join(format!("{}.json", name)),
            lock,
            _record: PhantomData,
        }
    }
}

/// One named collection, stored as a top-level JSON array and always rewritten whole.
pub struct Collection<T> {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Collection {
            path: self.path.clone(),
            lock: self.lock.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: a missing, unreadable or malformed file reads as an empty collection.
    pub fn load(&self) -> Vec<T> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                log::warn!("could not read {}: {}; treating as empty", self.path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&data) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("malformed collection {}: {}; treating as empty", self.path.display(), e);
                Vec::new()
            }
        }
    }

    pub fn save(&self, records: &[T]) -> Result<(), StoreError> {
        let _guard = self.guard();
        self.write(records)
    }

    /// Load, mutate and save while holding the collection lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut Vec<T>) -> Result<R, StoreError>) -> Result<R, StoreError> {
        let _guard = self.guard();
        let mut records = self.load();
        let out = f(&mut records)?;
        self.write(&records)?;
        Ok(out)
    }

    /// Like `update`, but the closure returns `None` when it changed nothing and the file is left alone.
    pub fn update_if_changed<R>(&self, f: impl FnOnce(&mut Vec<T>) -> Option<R>) -> Result<Option<R>, StoreError> {
        let _guard = self.guard();
        let mut records = self.load();
        let Some(out) = f(&mut records) else {
            return Ok(None);
        };
        self.write(&records)?;
        Ok(Some(out))
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Full overwrite through a sibling temp file so a crash never leaves half a file behind.
    fn write(&self, records: &[T]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        records.serialize(&mut ser)?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&buf)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: i64,
        label: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, label: "one".into() },
            Row { id: 2, label: "two".into() },
        ]
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path());
        assert!(db.collection::<Row>("rows").load().is_empty());
    }

    #[test]
    fn corrupted_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("rows.json"), "[{\"id\": 1, \"lab").unwrap();
        let db = Database::open(dir.path());
        assert!(db.collection::<Row>("rows").load().is_empty());
    }

    #[test]
    fn wrong_shape_loads_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("rows.json"), "{\"id\": 1}").unwrap();
        let db = Database::open(dir.path());
        assert!(db.collection::<Row>("rows").load().is_empty());
    }

    #[test]
    fn save_then_load_returns_same_records() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("nested"));
        let rows_collection = db.collection::<Row>("rows");

        rows_collection.save(&rows()).unwrap();

        assert_eq!(rows_collection.load(), rows());
        assert!(!rows_collection.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn save_overwrites_whole_file() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path());
        let collection = db.collection::<Row>("rows");

        collection.save(&rows()).unwrap();
        collection.save(&rows()[..1]).unwrap();

        assert_eq!(collection.load().len(), 1);
    }

    #[test]
    fn saved_json_is_indented() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path());
        let collection = db.collection::<Row>("rows");
        collection.save(&rows()).unwrap();

        let text = fs::read_to_string(collection.path()).unwrap();
        assert!(text.contains("\n        \"id\": 1"));
    }

    #[test]
    fn update_persists_mutation() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path());
        let collection = db.collection::<Row>("rows");

        let len = collection
            .update(|rows| {
                rows.push(Row { id: 7, label: "seven".into() });
                Ok(rows.len())
            })
            .unwrap();

        assert_eq!(len, 1);
        assert_eq!(db.collection::<Row>("rows").load()[0].id, 7);
    }

    #[test]
    fn failed_update_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path());
        let collection = db.collection::<Row>("rows");
        collection.save(&rows()).unwrap();

        let result: Result<(), StoreError> = collection.update(|rows| {
            rows.clear();
            Err(StoreError::NotFound("Row"))
        });

        assert!(result.is_err());
        assert_eq!(collection.load(), rows());
    }

    #[test]
    fn unchanged_update_skips_write() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path());
        let collection = db.collection::<Row>("rows");

        let out = collection.update_if_changed(|rows| rows.pop()).unwrap();

        assert_eq!(out, None);
        assert!(!collection.path().exists());
    }

    #[test]
    fn concurrent_updates_through_separate_handles_all_land() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path());

        let workers: Vec<_> = (0..16)
            .map(|_| {
                let collection = db.collection::<Row>("rows");
                std::thread::spawn(move || {
                    collection
                        .update(|rows| {
                            let id = rows.len() as i64 + 1;
                            rows.push(Row { id, label: format!("row-{}", id) });
                            Ok(id)
                        })
                        .unwrap()
                })
            })
            .collect();
        let mut ids: Vec<i64> = workers.into_iter().map(|w| w.join().unwrap()).collect();
        ids.sort_unstable();

        assert_eq!(ids, (1..=16).collect::<Vec<_>>());
        assert_eq!(db.collection::<Row>("rows").load().len(), 16);
    }
}
