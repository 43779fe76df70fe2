//! Local acknowledgement set reconciled against server results.
//!
//! The set of ids a user has acknowledged lives in local state under one
//! key, as a JSON array. Acknowledging also tries to flag the record on the
//! server, but the local entry is written whatever the server says, and a
//! record counts as acknowledged when *either* side says so. Nothing removes
//! entries for records deleted on the server.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

use pabrik_client::{ApiError, DirectusClient};
use pabrik_core::{Record, RecordId, now_rfc3339, record_id};
use pabrik_kv::{KVError, KVStore, get_json, set_json};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::ServiceError;

/// Where the server-side acknowledgement flag lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckTarget {
    pub collection: &'static str,
    /// Boolean field set to `true` on acknowledgement.
    pub flag_field: &'static str,
    /// Optional timestamp field written alongside the flag.
    pub stamp_field: Option<&'static str>,
}

/// What happened on the server when an id was acknowledged. The local set
/// is updated in both cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    Confirmed,
    Failed { code: &'static str, message: String },
}

impl AckOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, AckOutcome::Confirmed)
    }
}

pub struct AckCache {
    store: Arc<dyn KVStore>,
    key: String,
    target: AckTarget,
    client: DirectusClient,
    // Serialises read-modify-write of the stored array within this process.
    write_lock: Mutex<()>,
}

impl AckCache {
    pub fn new(
        store: Arc<dyn KVStore>,
        key: impl Into<String>,
        target: AckTarget,
        client: DirectusClient,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            target,
            client,
            write_lock: Mutex::new(()),
        }
    }

    pub fn target(&self) -> AckTarget {
        self.target
    }

    fn load(&self) -> Result<Vec<RecordId>, KVError> {
        Ok(get_json::<Vec<RecordId>, _>(self.store.as_ref(), &self.key)?.unwrap_or_default())
    }

    /// Ids compare by their text form, so `7` and `"7"` are the same record.
    fn keys(ids: &[RecordId]) -> HashSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    pub fn is_acknowledged(&self, id: &RecordId) -> Result<bool, KVError> {
        let wanted = id.to_string();
        Ok(self.load()?.iter().any(|known| known.to_string() == wanted))
    }

    pub fn list_acknowledged(&self) -> Result<BTreeSet<RecordId>, KVError> {
        Ok(self.load()?.into_iter().collect())
    }

    /// Add `id` to the local set. Idempotent.
    pub fn record_local(&self, id: &RecordId) -> Result<(), KVError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids = self.load()?;
        if Self::keys(&ids).contains(&id.to_string()) {
            return Ok(());
        }
        ids.push(id.clone());
        set_json(self.store.as_ref(), &self.key, &ids)
    }

    pub fn clear(&self) -> Result<(), KVError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.store.delete(&self.key)
    }

    fn remote_patch(&self) -> Value {
        let mut patch = json!({ self.target.flag_field: true });
        if let Some(stamp) = self.target.stamp_field {
            patch[stamp] = json!(now_rfc3339());
        }
        patch
    }

    /// Flag `id` on the server (best effort), then record it locally.
    ///
    /// Fails only when the local write fails or `id` is blank; a remote
    /// failure is reported in the returned [`AckOutcome`].
    pub async fn acknowledge(&self, id: &RecordId) -> Result<AckOutcome, ServiceError> {
        if id.is_blank() {
            return Err(ServiceError::Validation(
                "cannot acknowledge a blank id".into(),
            ));
        }

        let remote: Result<Value, ApiError> = self
            .client
            .update(self.target.collection, id, &self.remote_patch())
            .await;
        let outcome = match remote {
            Ok(_) => {
                debug!(collection = self.target.collection, %id, "acknowledged on server");
                AckOutcome::Confirmed
            }
            Err(e) => {
                warn!(
                    collection = self.target.collection,
                    %id,
                    error = %e,
                    "server acknowledgement failed, keeping local record"
                );
                AckOutcome::Failed {
                    code: e.error_code(),
                    message: e.to_string(),
                }
            }
        };

        self.record_local(id)?;
        Ok(outcome)
    }

    /// True when the record carries the server-side flag.
    pub fn is_server_flagged(&self, record: &Record) -> bool {
        match record.get(self.target.flag_field) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
            Some(Value::String(s)) => matches!(s.as_str(), "true" | "1" | "read"),
            _ => false,
        }
    }

    /// Records that neither the local set nor the server marks acknowledged.
    /// Records without an id are kept.
    pub fn unacknowledged(&self, records: Vec<Record>) -> Result<Vec<Record>, KVError> {
        let local = Self::keys(&self.load()?);
        Ok(self.subtract(records, &local))
    }

    /// Same as [`AckCache::unacknowledged`], but a local state failure falls
    /// back to the server flag alone.
    pub fn unacknowledged_or_server_only(&self, records: Vec<Record>) -> Vec<Record> {
        let local = match self.load() {
            Ok(ids) => Self::keys(&ids),
            Err(e) => {
                warn!(key = %self.key, error = %e, "local acknowledgements unreadable");
                HashSet::new()
            }
        };
        self.subtract(records, &local)
    }

    fn subtract(&self, records: Vec<Record>, local: &HashSet<String>) -> Vec<Record> {
        records
            .into_iter()
            .filter(|r| {
                let locally = record_id(r).is_some_and(|id| local.contains(&id.to_string()));
                !locally && !self.is_server_flagged(r)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pabrik_core::DirectusConfig;
    use pabrik_kv::MemoryStore;

    const TARGET: AckTarget = AckTarget {
        collection: "spk",
        flag_field: "notification_read",
        stamp_field: Some("notification_read_at"),
    };

    fn cache() -> (Arc<MemoryStore>, AckCache) {
        let store = Arc::new(MemoryStore::new());
        let client =
            DirectusClient::from_config(&DirectusConfig::new("http://127.0.0.1:9")).unwrap();
        let cache = AckCache::new(store.clone(), "ack:spk", TARGET, client);
        (store, cache)
    }

    fn records(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn local_set_is_a_json_array() {
        let (store, cache) = cache();
        cache.record_local(&RecordId::Int(4)).unwrap();
        cache.record_local(&RecordId::from("a")).unwrap();
        cache.record_local(&RecordId::Int(4)).unwrap();
        assert_eq!(store.get("ack:spk").unwrap(), Some(br#"[4,"a"]"#.to_vec()));
        assert!(cache.is_acknowledged(&RecordId::from("4")).unwrap());
        assert_eq!(cache.list_acknowledged().unwrap().len(), 2);

        cache.clear().unwrap();
        assert!(!cache.is_acknowledged(&RecordId::Int(4)).unwrap());
    }

    #[test]
    fn unacknowledged_excludes_both_signals() {
        let (_, cache) = cache();
        cache.record_local(&RecordId::Int(1)).unwrap();
        let rows = records(json!([
            {"id": 1},
            {"id": 2, "notification_read": true},
            {"id": 3, "notification_read": false},
            {"nomor": "no id"}
        ]));
        let left = cache.unacknowledged(rows).unwrap();
        let ids: Vec<Option<RecordId>> = left.iter().map(record_id).collect();
        assert_eq!(ids, vec![Some(RecordId::Int(3)), None]);
    }

    #[test]
    fn local_entry_wins_when_server_flag_is_cleared() {
        let (_, cache) = cache();
        cache.record_local(&RecordId::Int(5)).unwrap();
        let rows = records(json!([{"id": 5, "notification_read": false}]));
        assert!(cache.unacknowledged(rows).unwrap().is_empty());
    }

    #[test]
    fn corrupt_local_state_falls_back_to_server_flag() {
        let (store, cache) = cache();
        store.set("ack:spk", b"{").unwrap();
        let rows = records(json!([{"id": 1}, {"id": 2, "notification_read": 1}]));
        assert!(cache.unacknowledged(rows.clone()).is_err());
        let left = cache.unacknowledged_or_server_only(rows);
        assert_eq!(left.len(), 1);
    }

    #[tokio::test]
    async fn acknowledge_records_locally_when_remote_fails() {
        // Port 9 (discard) is closed on test hosts: the PATCH cannot succeed.
        let (_, cache) = cache();
        let outcome = cache.acknowledge(&RecordId::Int(11)).await.unwrap();
        assert!(!outcome.is_confirmed());
        assert!(cache.is_acknowledged(&RecordId::Int(11)).unwrap());
    }

    #[tokio::test]
    async fn blank_id_is_rejected() {
        let (_, cache) = cache();
        let err = cache.acknowledge(&RecordId::from(" ")).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION");
    }
}
