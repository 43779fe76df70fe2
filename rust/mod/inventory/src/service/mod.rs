pub mod approvals;
pub mod customer;
pub mod gudang;
pub mod outflow;
pub mod raw_material;
pub mod sales_order;
pub mod spk;
pub mod surat_jalan;

use std::sync::Arc;

use pabrik_client::{DirectusClient, FailureLog, Query};
use pabrik_core::{Record, RecordId};
use pabrik_kv::KVStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ack::{AckCache, AckTarget};
use crate::error::{ServiceError, api};

/// Directus collection names.
pub mod collection {
    pub const CUSTOMER: &str = "master_customer";
    pub const GUDANG: &str = "gudang";
    pub const RAW_MATERIAL: &str = "rawmaterial";
    pub const SALES_ORDER: &str = "so_customer";
    pub const SPK: &str = "spk";
    pub const SURAT_JALAN: &str = "suratjalan";
    pub const OUTFLOW: &str = "pengeluaran_inventory";
    pub const BARANG: &str = "Barang";
}

/// Local state key of the acknowledged SPK notice ids.
pub const SPK_ACK_KEY: &str = "ack:spk_notifications";

pub const SPK_ACK_TARGET: AckTarget = AckTarget {
    collection: collection::SPK,
    flag_field: "notification_read",
    stamp_field: Some("notification_read_at"),
};

/// Inventory service: entity wrappers over one Directus connection.
///
/// Reads never fail: a failed read is recorded in [`FailureLog`] and an
/// empty value is returned. Writes return [`ServiceError`].
pub struct InventoryService {
    pub(crate) client: DirectusClient,
    pub(crate) failures: Arc<FailureLog>,
    pub(crate) acks: AckCache,
}

impl InventoryService {
    pub fn new(client: DirectusClient, state: Arc<dyn KVStore>) -> Self {
        let acks = AckCache::new(state, SPK_ACK_KEY, SPK_ACK_TARGET, client.clone());
        Self {
            client,
            failures: Arc::new(FailureLog::new()),
            acks,
        }
    }

    pub fn with_failure_log(mut self, failures: Arc<FailureLog>) -> Self {
        self.failures = failures;
        self
    }

    pub fn client(&self) -> &DirectusClient {
        &self.client
    }

    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }

    pub fn acks(&self) -> &AckCache {
        &self.acks
    }

    // ── Generic helpers ──

    /// List records, or record the failure and return an empty list.
    pub(crate) async fn read_list<T: DeserializeOwned>(
        &self,
        operation: &str,
        collection: &str,
        query: &Query,
    ) -> Vec<T> {
        let result = self.client.list(collection, query).await;
        self.failures.recover(operation, collection, result, Vec::new)
    }

    /// Get one record, or record the failure and return `None`.
    pub(crate) async fn read_one<T: DeserializeOwned>(
        &self,
        operation: &str,
        collection: &str,
        id: &RecordId,
    ) -> Option<T> {
        let result = self.client.get(collection, id, &Query::new()).await;
        self.failures.recover(operation, collection, result, || None)
    }

    pub(crate) async fn create_record<B: Serialize + ?Sized>(
        &self,
        collection: &str,
        what: &str,
        body: &B,
    ) -> Result<Record, ServiceError> {
        let created: Value = self
            .client
            .create(collection, body)
            .await
            .map_err(api(format!("failed to create {what}")))?;
        Ok(into_record(created))
    }

    pub(crate) async fn update_record<B: Serialize + ?Sized>(
        &self,
        collection: &str,
        what: &str,
        id: &RecordId,
        patch: &B,
    ) -> Result<Record, ServiceError> {
        let updated: Value = self
            .client
            .update(collection, id, patch)
            .await
            .map_err(api(format!("failed to update {what}")))?;
        Ok(into_record(updated))
    }

    pub(crate) async fn delete_record(
        &self,
        collection: &str,
        what: &str,
        id: &RecordId,
    ) -> Result<(), ServiceError> {
        self.client
            .delete(collection, id)
            .await
            .map_err(api(format!("failed to delete {what}")))
    }

    /// Fetch a record a mutation depends on. A missing record is `NotFound`.
    pub(crate) async fn require(
        &self,
        collection: &str,
        what: &str,
        id: &RecordId,
    ) -> Result<Record, ServiceError> {
        let found: Option<Record> = self
            .client
            .get(collection, id, &Query::new())
            .await
            .map_err(api(format!("failed to load {what}")))?;
        found.ok_or_else(|| ServiceError::NotFound(format!("{what} {id} not found")))
    }
}

/// Mutation responses without a record body read as an empty record.
pub(crate) fn into_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}
