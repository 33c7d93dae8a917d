//! File-backed store.
//!
//! One JSON document of string keys, rewritten after every mutation
//! (temp file + rename, so a crash never leaves half a file).

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashmap::DashMap;

use crate::store::{KeyValueStore, StoreResult};

/// Write a serializable value to `path` atomically.
pub(crate) fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// A store persisted to a JSON file.
///
/// The file is the source of truth. Several processes (the daemon and the
/// CLI) may hold a `FileStore` on the same path: reads go to disk, and every
/// mutation re-reads the file under the write lock, applies one key and
/// writes it back, so keys written by other processes survive.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Last contents seen on disk; served when the file cannot be read.
    cache: DashMap<String, String>,
    // Serializes read-modify-write + rename within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`, loading existing contents if the file exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let store = Self {
            cache: DashMap::new(),
            write_lock: Mutex::new(()),
            path,
        };
        let map = store.load()?;
        tracing::debug!(path = %store.path.display(), keys = map.len(), "Loaded client state");
        store.refresh(&map);
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn refresh(&self, map: &BTreeMap<String, String>) {
        self.cache.retain(|k, _| map.contains_key(k));
        for (k, v) in map {
            self.cache.insert(k.clone(), v.clone());
        }
    }

    /// Re-read the file, apply `mutate`, and write back if it reports a change.
    fn update<F>(&self, mutate: F) -> StoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.load()?;
        if mutate(&mut map) {
            write_json_atomic(&self.path, &map)?;
        }
        self.refresh(&map);
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(map) => {
                let value = map.get(key).cloned();
                self.refresh(&map);
                value
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read client state, using last known value");
                self.cache.get(key).map(|r| r.value().clone())
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.update(|map| map.remove(key).is_some())
    }
}
