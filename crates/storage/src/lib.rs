use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use shared::domain::{VisitorId, VisitorRecord};

/// Key under which the serialized visitor list lives.
pub const VISITORS_KEY: &str = "sdn3_guests";
const CORRUPT_SUFFIX: &str = ".corrupt";
const STORE_FILE_NAME: &str = "local_storage.json";

/// Durable string key/value storage scoped to one installation.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Key/value store backed by a single JSON object on disk.
///
/// Every `set`/`remove` rewrites the file through a sibling temp file so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create parent directory '{}' for store '{}'",
                    parent.display(),
                    path.display()
                )
            })?;
        }

        let values = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("store file '{}' is not a JSON object", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read store file '{}'", path.display()))
            }
        };

        Ok(Self { path, values })
    }

    /// Opens `local_storage.json` inside `data_dir`.
    pub fn open_in_dir(data_dir: &Path) -> Result<Self> {
        Self::open(data_dir.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let serialized =
            serde_json::to_string_pretty(&self.values).context("failed to serialize store")?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized)
            .with_context(|| format!("failed to write '{}'", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "failed to move '{}' over '{}'",
                tmp_path.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

pub fn encode_visitors(visitors: &[VisitorRecord]) -> Result<String> {
    serde_json::to_string(visitors).context("failed to encode visitor list")
}

pub fn decode_visitors(raw: &str) -> Result<Vec<VisitorRecord>> {
    serde_json::from_str(raw).context("failed to decode visitor list")
}

/// Newest-first visitor list that writes through to its store on every change.
pub struct VisitorBook<S: KeyValueStore> {
    store: S,
    visitors: Vec<VisitorRecord>,
}

impl<S: KeyValueStore> VisitorBook<S> {
    /// Reads the persisted list once. An undecodable value is set aside under
    /// `sdn3_guests.corrupt` and the book starts empty.
    pub fn open(mut store: S) -> Result<Self> {
        let visitors = match load_visitors(&store)? {
            Loaded::Decoded(visitors) => visitors,
            Loaded::Unreadable(raw) => {
                store
                    .set(&format!("{VISITORS_KEY}{CORRUPT_SUFFIX}"), &raw)
                    .context("failed to preserve unreadable visitor list")?;
                Vec::new()
            }
        };
        tracing::info!(count = visitors.len(), "loaded visitor list");
        Ok(Self { store, visitors })
    }

    /// Like [`VisitorBook::open`], but never writes to `store`. An undecodable
    /// value is left in place and the book starts empty.
    pub fn open_read_only(store: S) -> Result<Self> {
        let visitors = match load_visitors(&store)? {
            Loaded::Decoded(visitors) => visitors,
            Loaded::Unreadable(_) => Vec::new(),
        };
        tracing::debug!(count = visitors.len(), "loaded visitor list read-only");
        Ok(Self { store, visitors })
    }

    pub fn visitors(&self) -> &[VisitorRecord] {
        &self.visitors
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    pub fn find(&self, id: &VisitorId) -> Option<&VisitorRecord> {
        self.visitors.iter().find(|record| &record.id == id)
    }

    /// Puts `record` at the front and persists the list. On a write failure
    /// the record stays in memory and the error is returned.
    pub fn prepend(&mut self, record: VisitorRecord) -> Result<()> {
        tracing::debug!(visitor_id = %record.id, "recording visitor");
        self.visitors.insert(0, record);
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        let encoded = encode_visitors(&self.visitors)?;
        self.store
            .set(VISITORS_KEY, &encoded)
            .context("failed to persist visitor list")
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

enum Loaded {
    Decoded(Vec<VisitorRecord>),
    Unreadable(String),
}

fn load_visitors<S: KeyValueStore>(store: &S) -> Result<Loaded> {
    let Some(raw) = store.get(VISITORS_KEY)? else {
        return Ok(Loaded::Decoded(Vec::new()));
    };
    match decode_visitors(&raw) {
        Ok(visitors) => Ok(Loaded::Decoded(visitors)),
        Err(err) => {
            tracing::error!(
                key = VISITORS_KEY,
                "stored visitor list is unreadable, starting empty: {err:#}"
            );
            Ok(Loaded::Unreadable(raw))
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
