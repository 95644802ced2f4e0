//! Ephemeral keyed store with per-key expiry.
//!
//! Holds withdraw challenge tokens, game cooldowns and quota counters, hidden
//! messages and pending confirmation prompts. Every mutating operation is atomic
//! with respect to concurrent callers of the same store instance.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time_utils::{current_unix_timestamp_ms, is_expired_unix_ms, unix_deadline_ms};

const ENTRIES_TABLE: TableDefinition<&str, &str> = TableDefinition::new("ephemeral_entries");

#[derive(Debug, Error)]
/// Enumerates supported `StoreError` values.
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),
    #[error("stored value for '{key}' is not a counter")]
    NotACounter { key: String },
    #[error("failed to decode stored entry for '{key}': {message}")]
    Corrupt { key: String, message: String },
}

fn backend_error(error: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(error.to_string())
}

/// Trait contract for the ephemeral keyed store.
pub trait EphemeralStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value`, replacing any previous entry and its expiry.
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Atomically replaces the value of a live key and returns the previous
    /// value, keeping the original expiry. Absent or expired keys are left
    /// untouched and yield `None`.
    fn exchange(&self, key: &str, value: &str) -> Result<Option<String>, StoreError>;

    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Increments a counter, creating it with `ttl` when absent.
    fn increment(&self, key: &str, ttl: Duration) -> Result<u64, StoreError>;

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Physically removes expired entries and returns how many were dropped.
    fn purge_expired(&self) -> Result<usize, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    #[serde(default)]
    expires_unix_ms: Option<u64>,
}

impl StoredEntry {
    fn new(value: &str, ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_string(),
            expires_unix_ms: ttl.map(unix_deadline_ms),
        }
    }

    fn is_live(&self, now_unix_ms: u64) -> bool {
        !is_expired_unix_ms(self.expires_unix_ms, now_unix_ms)
    }
}

fn next_counter_value(key: &str, current: Option<&StoredEntry>) -> Result<u64, StoreError> {
    match current {
        None => Ok(1),
        Some(entry) => entry
            .value
            .trim()
            .parse::<u64>()
            .map(|value| value.saturating_add(1))
            .map_err(|_| StoreError::NotACounter {
                key: key.to_string(),
            }),
    }
}

#[derive(Debug, Default)]
/// Process-local store; entries vanish on restart.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(
        &self,
        apply: impl FnOnce(&mut HashMap<String, StoredEntry>, u64) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Backend("memory store mutex is poisoned".to_string()))?;
        let now = current_unix_timestamp_ms();
        entries.retain(|_, entry| entry.is_live(now));
        apply(&mut entries, now)
    }
}

impl EphemeralStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_entries(|entries, _| Ok(entries.get(key).map(|entry| entry.value.clone())))
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.with_entries(|entries, _| {
            entries.insert(key.to_string(), StoredEntry::new(value, ttl));
            Ok(())
        })
    }

    fn exchange(&self, key: &str, value: &str) -> Result<Option<String>, StoreError> {
        self.with_entries(|entries, _| {
            Ok(entries
                .get_mut(key)
                .map(|entry| std::mem::replace(&mut entry.value, value.to_string())))
        })
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.with_entries(|entries, _| Ok(entries.remove(key).is_some()))
    }

    fn purge_expired(&self) -> Result<usize, StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Backend("memory store mutex is poisoned".to_string()))?;
        let before = entries.len();
        let now = current_unix_timestamp_ms();
        entries.retain(|_, entry| entry.is_live(now));
        Ok(before - entries.len())
    }

    fn increment(&self, key: &str, ttl: Duration) -> Result<u64, StoreError> {
        self.with_entries(|entries, _| {
            let next = next_counter_value(key, entries.get(key))?;
            match entries.get_mut(key) {
                Some(entry) => entry.value = next.to_string(),
                None => {
                    entries.insert(
                        key.to_string(),
                        StoredEntry::new(&next.to_string(), Some(ttl)),
                    );
                }
            }
            Ok(next)
        })
    }
}

/// File-backed store; write transactions are serialized by redb, which makes
/// `exchange` and `increment` atomic across tasks sharing the database.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|error| {
                    StoreError::Backend(format!("failed to create {}: {error}", parent.display()))
                })?;
            }
        }
        let db = Database::create(path).map_err(backend_error)?;
        let txn = db.begin_write().map_err(backend_error)?;
        txn.open_table(ENTRIES_TABLE).map_err(backend_error)?;
        txn.commit().map_err(backend_error)?;
        tracing::debug!(path = %path.display(), "opened redb ephemeral store");
        Ok(Self { db })
    }

    fn decode(key: &str, raw: &str) -> Result<StoredEntry, StoreError> {
        serde_json::from_str(raw).map_err(|error| StoreError::Corrupt {
            key: key.to_string(),
            message: error.to_string(),
        })
    }

    fn encode(entry: &StoredEntry) -> Result<String, StoreError> {
        serde_json::to_string(entry).map_err(backend_error)
    }

    fn mutate<T>(
        &self,
        key: &str,
        apply: impl FnOnce(Option<StoredEntry>) -> Result<(Option<StoredEntry>, T), StoreError>,
    ) -> Result<T, StoreError> {
        let txn = self.db.begin_write().map_err(backend_error)?;
        let output = {
            let mut table = txn.open_table(ENTRIES_TABLE).map_err(backend_error)?;
            let raw = table
                .get(key)
                .map_err(backend_error)?
                .map(|guard| guard.value().to_string());
            let now = current_unix_timestamp_ms();
            let current = match raw {
                Some(raw) => Some(Self::decode(key, &raw)?).filter(|entry| entry.is_live(now)),
                None => None,
            };
            let (next, output) = apply(current)?;
            match next {
                Some(entry) => {
                    let encoded = Self::encode(&entry)?;
                    table
                        .insert(key, encoded.as_str())
                        .map_err(backend_error)?;
                }
                None => {
                    table.remove(key).map_err(backend_error)?;
                }
            }
            output
        };
        txn.commit().map_err(backend_error)?;
        Ok(output)
    }
}

impl EphemeralStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let txn = self.db.begin_read().map_err(backend_error)?;
        let table = txn.open_table(ENTRIES_TABLE).map_err(backend_error)?;
        let raw = table
            .get(key)
            .map_err(backend_error)?
            .map(|guard| guard.value().to_string());
        let Some(raw) = raw else {
            return Ok(None);
        };
        let entry = Self::decode(key, &raw)?;
        if entry.is_live(current_unix_timestamp_ms()) {
            Ok(Some(entry.value))
        } else {
            Ok(None)
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.mutate(key, |_| Ok((Some(StoredEntry::new(value, ttl)), ())))
    }

    fn exchange(&self, key: &str, value: &str) -> Result<Option<String>, StoreError> {
        self.mutate(key, |current| match current {
            Some(entry) => {
                let previous = entry.value.clone();
                let replaced = StoredEntry {
                    value: value.to_string(),
                    expires_unix_ms: entry.expires_unix_ms,
                };
                Ok((Some(replaced), Some(previous)))
            }
            None => Ok((None, None)),
        })
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.mutate(key, |current| Ok((None, current.is_some())))
    }

    fn increment(&self, key: &str, ttl: Duration) -> Result<u64, StoreError> {
        self.mutate(key, |current| {
            let next = next_counter_value(key, current.as_ref())?;
            let entry = match current {
                Some(entry) => StoredEntry {
                    value: next.to_string(),
                    expires_unix_ms: entry.expires_unix_ms,
                },
                None => StoredEntry::new(&next.to_string(), Some(ttl)),
            };
            Ok((Some(entry), next))
        })
    }

    fn purge_expired(&self) -> Result<usize, StoreError> {
        let txn = self.db.begin_write().map_err(backend_error)?;
        let purged = {
            let mut table = txn.open_table(ENTRIES_TABLE).map_err(backend_error)?;
            let now = current_unix_timestamp_ms();
            let mut expired = Vec::new();
            for row in table.iter().map_err(backend_error)? {
                let (key, raw) = row.map_err(backend_error)?;
                let key = key.value().to_string();
                match Self::decode(&key, raw.value()) {
                    Ok(entry) if !entry.is_live(now) => expired.push(key),
                    Ok(_) => {}
                    Err(error) => tracing::warn!(%error, "skipping undecodable store entry"),
                }
            }
            for key in &expired {
                table.remove(key.as_str()).map_err(backend_error)?;
            }
            expired.len()
        };
        txn.commit().map_err(backend_error)?;
        if purged > 0 {
            tracing::debug!(purged, "purged expired store entries");
        }
        Ok(purged)
    }
}
