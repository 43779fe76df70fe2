use std::path::Path;
use std::sync::Arc;

use ::redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// RedbStore is a KVStore implementation backed by redb, a pure-Rust embedded
/// key-value database. It survives restarts, which is what makes the
/// acknowledgement set and the stored token durable.
pub struct RedbStore {
    db: Arc<Database>,
}

fn storage<E: std::fmt::Display>(e: E) -> KVError {
    KVError::Storage(e.to_string())
}

impl RedbStore {
    /// Open or create a redb database at the given path. Missing parent
    /// directories are created.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(storage)?;
            }
        }
        let db = Database::create(path).map_err(storage)?;

        // Ensure the table exists by doing a write transaction.
        let write_txn = db.begin_write().map_err(storage)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;

        debug!(path = %path.display(), "opened local state");
        Ok(Self { db: Arc::new(db) })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(TABLE).map_err(storage)?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(storage(e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            table.insert(key, value).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            table.remove(key).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(TABLE).map_err(storage)?;

        let mut results = Vec::new();
        let iter = table.range(prefix..).map_err(storage)?;

        for entry in iter {
            let entry = entry.map_err(storage)?;
            let key = entry.0.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key, entry.1.value().to_vec()));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_delete() {
        let tmp = TempDir::new().unwrap();
        let store = RedbStore::open(&tmp.path().join("state.redb")).unwrap();

        assert_eq!(store.get("ack:spk").unwrap(), None);
        store.set("ack:spk", b"[1,2]").unwrap();
        assert_eq!(store.get("ack:spk").unwrap(), Some(b"[1,2]".to_vec()));
        store.delete("ack:spk").unwrap();
        assert_eq!(store.get("ack:spk").unwrap(), None);
        // Deleting again is fine.
        store.delete("ack:spk").unwrap();
    }

    #[test]
    fn test_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("state.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.set("auth:directus_token", b"tok").unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(
            store.get("auth:directus_token").unwrap(),
            Some(b"tok".to_vec())
        );
    }

    #[test]
    fn test_scan_prefix() {
        let tmp = TempDir::new().unwrap();
        let store = RedbStore::open(&tmp.path().join("state.redb")).unwrap();
        store.set("ack:b", b"2").unwrap();
        store.set("ack:a", b"1").unwrap();
        store.set("auth:x", b"3").unwrap();

        let keys: Vec<String> = store
            .scan("ack:")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["ack:a", "ack:b"]);
    }
}
