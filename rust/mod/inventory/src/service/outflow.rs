use chrono::NaiveDateTime;
use pabrik_client::Query;
use pabrik_core::{Record, RecordId, f64_field, now_rfc3339};
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{InventoryService, collection};
use crate::error::ServiceError;
use crate::model::{OutflowFilter, OutflowRow, OutflowSummary};

impl InventoryService {
    // ── Inventory outflow ──

    /// One row per delivery note.
    pub async fn list_outflow(&self) -> Vec<OutflowRow> {
        self.list_surat_jalan()
            .await
            .iter()
            .map(OutflowRow::from_delivery_note)
            .collect()
    }

    /// All zeros when the delivery notes cannot be read.
    pub async fn outflow_summary(&self, now: NaiveDateTime) -> OutflowSummary {
        OutflowSummary::compute(&self.list_outflow().await, now)
    }

    pub async fn filter_outflow(&self, filter: &OutflowFilter) -> Vec<OutflowRow> {
        self.list_outflow()
            .await
            .into_iter()
            .filter(|row| filter.matches(row))
            .collect()
    }

    /// Record an outflow that did not come from a delivery note.
    pub async fn create_manual_outflow(&self, entry: &Record) -> Result<Record, ServiceError> {
        let mut body = entry.clone();
        body.insert("status".into(), json!("published"));
        body.insert("date_created".into(), json!(now_rfc3339()));
        self.create_record(collection::OUTFLOW, "outflow entry", &body)
            .await
    }

    /// Subtract `quantity` from the item's `StokIn`, never going below zero.
    /// Returns whether the stock was updated.
    pub async fn deduct_stock(&self, item_id: &RecordId, quantity: f64) -> bool {
        let item: Option<Record> = match self
            .client
            .get(collection::BARANG, item_id, &Query::new())
            .await
        {
            Ok(item) => item,
            Err(e) => {
                self.failures.record("deduct_stock", collection::BARANG, &e);
                return false;
            }
        };
        let Some(item) = item else {
            warn!(%item_id, "stock item not found");
            return false;
        };

        let current = f64_field(&item, "StokIn").unwrap_or(0.0);
        let remaining = (current - quantity).max(0.0);
        let patch = json!({
            "StokIn": remaining,
            "last_updated": now_rfc3339(),
        });
        match self
            .client
            .update::<_, Value>(collection::BARANG, item_id, &patch)
            .await
        {
            Ok(_) => {
                info!(%item_id, from = current, to = remaining, "stock deducted");
                true
            }
            Err(e) => {
                self.failures.record("deduct_stock", collection::BARANG, &e);
                false
            }
        }
    }
}
