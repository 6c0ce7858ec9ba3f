// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded key-value store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `kv_entries`: key → JSON `{value, expires_at_ms}`
//!
//! Expired entries read as absent and are removed lazily on the next read.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use super::{expiry_from_now, KeyValueStore, StoreError, StoreResult};

/// Primary table: key → serialized [`StoredEntry`] (JSON bytes).
const KV_ENTRIES: TableDefinition<&str, &[u8]> = TableDefinition::new("kv_entries");

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    #[serde(default)]
    expires_at_ms: Option<i64>,
}

impl StoredEntry {
    fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at_ms.is_some_and(|at| at <= now_ms)
    }
}

/// Durable key-value store.
pub struct KvDatabase {
    db: Database,
}

impl KvDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path).map_err(redb::Error::from)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write().map_err(redb::Error::from)?;
        {
            let _ = write_txn.open_table(KV_ENTRIES).map_err(redb::Error::from)?;
        }
        write_txn.commit().map_err(redb::Error::from)?;

        Ok(Self { db })
    }

    fn read_entry(&self, key: &str) -> Result<Option<StoredEntry>, redb::Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KV_ENTRIES)?;
        match table.get(key)? {
            Some(raw) => Ok(serde_json::from_slice(raw.value()).ok()),
            None => Ok(None),
        }
    }

    fn write_entry(&self, key: &str, entry: &StoredEntry) -> StoreResult<()> {
        let json = serde_json::to_vec(entry)?;
        let write_txn = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = write_txn.open_table(KV_ENTRIES).map_err(redb::Error::from)?;
            table
                .insert(key, json.as_slice())
                .map_err(redb::Error::from)?;
        }
        write_txn.commit().map_err(redb::Error::from)?;
        Ok(())
    }

    fn remove_entry(&self, key: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = write_txn.open_table(KV_ENTRIES).map_err(redb::Error::from)?;
            table.remove(key).map_err(redb::Error::from)?;
        }
        write_txn.commit().map_err(redb::Error::from)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for KvDatabase {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let Some(entry) = self.read_entry(key)? else {
            return Ok(None);
        };
        if entry.is_expired(Utc::now().timestamp_millis()) {
            self.remove_entry(key)?;
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<std::time::Duration>) -> StoreResult<()> {
        let entry = StoredEntry {
            value: value.to_string(),
            expires_at_ms: ttl.map(expiry_from_now),
        };
        self.write_entry(key, &entry)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.remove_entry(key)
    }
}

impl From<redb::Error> for StoreError {
    fn from(e: redb::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}
