use crate::feeling_entry::{next_id, FeelingEntry, Mood};
use crate::kv_store::{KeyValueStore, StoreError};
use chrono::{DateTime, Local};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_STORAGE_KEY: &str = "feelingsEntries";

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Please write something before submitting.")]
    EmptyText,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What sits under the journal key, before records are decoded.
enum Stored {
    Empty,
    Records(Vec<Value>),
    /// Not a JSON array. Kept verbatim so a write can set it aside.
    Unreadable(String),
}

fn decode(record: &Value) -> Option<FeelingEntry> {
    match serde_json::from_value(record.clone()) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!(error = %e, id = ?record.get("id"), "skipping undecodable entry");
            None
        }
    }
}

fn encode(entry: &FeelingEntry) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(entry)?)
}

/// The entry sequence persisted under one key, newest first.
///
/// Every operation re-reads the whole sequence and every mutation writes the
/// whole sequence back before returning. Nothing is cached between calls.
/// Records that do not decode as entries are hidden from [`load`](Self::load)
/// but written back untouched by `add_entry` and `like_entry`.
pub struct JournalState<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> JournalState<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        JournalState {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Key that receives a stored value which was not an entry array, just
    /// before the first write replaces it.
    pub fn unreadable_key(&self) -> String {
        format!("{}.unreadable", self.key)
    }

    fn read_stored(&self) -> Stored {
        let raw = match self.store.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Stored::Empty,
            Err(e) => {
                tracing::warn!(error = %e, "could not read entries, starting empty");
                return Stored::Empty;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => Stored::Records(records),
            Err(e) => {
                tracing::warn!(error = %e, key = %self.key, "stored entries are unparseable, ignoring");
                Stored::Unreadable(raw)
            }
        }
    }

    /// Records to mutate. An unreadable value is copied aside first so the
    /// coming write does not destroy it.
    fn records_for_write(&mut self) -> Result<Vec<Value>, StoreError> {
        match self.read_stored() {
            Stored::Empty => Ok(Vec::new()),
            Stored::Records(records) => Ok(records),
            Stored::Unreadable(raw) => {
                let backup = self.unreadable_key();
                self.store.set_item(&backup, raw)?;
                tracing::warn!(backup = %backup, "moved unparseable entries aside");
                Ok(Vec::new())
            }
        }
    }

    fn write_records(&mut self, records: &[Value]) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(records)?;
        self.store.set_item(&self.key, serialized)?;
        tracing::debug!(count = records.len(), "saved entries");
        Ok(())
    }

    /// Absent, unreadable or malformed data reads as no entries. Single
    /// records that fail to decode are skipped.
    pub fn load(&self) -> Vec<FeelingEntry> {
        match self.read_stored() {
            Stored::Records(records) => records.iter().filter_map(decode).collect(),
            Stored::Empty | Stored::Unreadable(_) => Vec::new(),
        }
    }

    pub fn save(&mut self, entries: &[FeelingEntry]) -> Result<(), StoreError> {
        let records = entries.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
        self.write_records(&records)
    }

    pub fn add_entry(&mut self, text: &str, mood: Mood) -> Result<FeelingEntry, JournalError> {
        self.add_entry_at(text, mood, Local::now())
    }

    pub fn add_entry_at(
        &mut self,
        text: &str,
        mood: Mood,
        created: DateTime<Local>,
    ) -> Result<FeelingEntry, JournalError> {
        let text = text.trim();
        if text.is_empty() {
            tracing::info!("rejected empty entry");
            return Err(JournalError::EmptyText);
        }

        let mut records = self.records_for_write()?;
        let newest = records.first().and_then(|r| r.get("id")).and_then(Value::as_str);
        let id = next_id(created, newest);
        let entry = FeelingEntry::new(id, text.to_string(), mood, created);
        records.insert(0, encode(&entry)?);
        self.write_records(&records)?;
        tracing::info!(id = %entry.id, mood = %entry.mood, "added entry");
        Ok(entry)
    }

    /// Returns the new like count, or `None` when no entry has `id`.
    pub fn like_entry(&mut self, id: &str) -> Result<Option<u64>, JournalError> {
        let Stored::Records(mut records) = self.read_stored() else {
            tracing::debug!(id, "like ignored, no entries");
            return Ok(None);
        };
        let found = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.get("id").and_then(Value::as_str) == Some(id))
            .find_map(|(i, r)| decode(r).map(|entry| (i, entry)));
        let Some((index, mut entry)) = found else {
            tracing::debug!(id, "like ignored, no such entry");
            return Ok(None);
        };
        entry.likes += 1;
        records[index] = encode(&entry)?;
        self.write_records(&records)?;
        tracing::info!(id, likes = entry.likes, "liked entry");
        Ok(Some(entry.likes))
    }
}
