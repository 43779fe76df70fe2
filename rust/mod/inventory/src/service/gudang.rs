use pabrik_client::Query;
use pabrik_core::{Record, RecordId};

use super::{InventoryService, collection};
use crate::error::ServiceError;

impl InventoryService {
    // ── Warehouses ──

    pub async fn list_gudang(&self) -> Vec<Record> {
        self.read_list("list_gudang", collection::GUDANG, &Query::new())
            .await
    }

    pub async fn get_gudang(&self, id: &RecordId) -> Option<Record> {
        self.read_one("get_gudang", collection::GUDANG, id).await
    }

    pub async fn create_gudang(&self, gudang: &Record) -> Result<Record, ServiceError> {
        self.create_record(collection::GUDANG, "warehouse", gudang)
            .await
    }

    pub async fn update_gudang(
        &self,
        id: &RecordId,
        patch: &Record,
    ) -> Result<Record, ServiceError> {
        self.update_record(collection::GUDANG, "warehouse", id, patch)
            .await
    }

    pub async fn delete_gudang(&self, id: &RecordId) -> Result<(), ServiceError> {
        self.delete_record(collection::GUDANG, "warehouse", id)
            .await
    }
}
