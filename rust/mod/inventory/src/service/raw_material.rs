use pabrik_client::{ConnectionStatus, Query};
use pabrik_core::{Record, RecordId, f64_field};

use super::{InventoryService, collection};
use crate::error::ServiceError;
use crate::model::sanitize_raw_material;

fn published_by_code() -> Query {
    Query::new().eq("status", "published").sort("kode")
}

/// `sisa_stok` below `minimum_stok`. Records missing either number are
/// not flagged.
pub fn is_low_stock(record: &Record) -> bool {
    match (f64_field(record, "sisa_stok"), f64_field(record, "minimum_stok")) {
        (Some(left), Some(min)) => left < min,
        _ => false,
    }
}

impl InventoryService {
    // ── Raw materials ──

    /// Published materials with only `id`, `kode` and `nama`, sorted by code.
    pub async fn list_raw_materials(&self) -> Vec<Record> {
        let query = published_by_code().fields(&["id", "kode", "nama"]);
        self.read_list("list_raw_materials", collection::RAW_MATERIAL, &query)
            .await
    }

    /// Published materials with every field, sorted by code.
    pub async fn list_raw_materials_full(&self) -> Vec<Record> {
        let query = published_by_code().fields(&["*"]);
        self.read_list("list_raw_materials_full", collection::RAW_MATERIAL, &query)
            .await
    }

    pub async fn low_stock_materials(&self) -> Vec<Record> {
        self.list_raw_materials_full()
            .await
            .into_iter()
            .filter(is_low_stock)
            .collect()
    }

    /// Create a material after normalising it with [`sanitize_raw_material`].
    pub async fn create_raw_material(&self, input: &Record) -> Result<Record, ServiceError> {
        let body = sanitize_raw_material(input);
        self.create_record(collection::RAW_MATERIAL, "raw material", &body)
            .await
    }

    pub async fn update_raw_material(
        &self,
        id: &RecordId,
        patch: &Record,
    ) -> Result<Record, ServiceError> {
        self.update_record(collection::RAW_MATERIAL, "raw material", id, patch)
            .await
    }

    pub async fn delete_raw_material(&self, id: &RecordId) -> Result<(), ServiceError> {
        self.delete_record(collection::RAW_MATERIAL, "raw material", id)
            .await
    }

    pub async fn ping_raw_materials(&self) -> ConnectionStatus {
        self.client.ping(collection::RAW_MATERIAL).await
    }
}
