use pabrik_client::{ConnectionStatus, Query};
use pabrik_core::{Record, RecordId, str_field};
use serde_json::json;
use tracing::info;

use super::{InventoryService, collection};
use crate::error::ServiceError;
use crate::model::{SpkInput, SpkStatus};

/// Status of a loaded SPK; a missing status reads as draft.
fn status_of(spk: &Record) -> Result<SpkStatus, ServiceError> {
    match str_field(spk, "status") {
        None => Ok(SpkStatus::Draft),
        Some(raw) => SpkStatus::parse(raw)
            .ok_or_else(|| ServiceError::Validation(format!("unknown SPK status {raw:?}"))),
    }
}

impl InventoryService {
    // ── Work orders (SPK) ──

    /// Newest first.
    pub async fn list_spk(&self) -> Vec<Record> {
        let query = Query::new().sort_desc("date_created");
        self.read_list("list_spk", collection::SPK, &query).await
    }

    pub async fn get_spk(&self, id: &RecordId) -> Option<Record> {
        self.read_one("get_spk", collection::SPK, id).await
    }

    pub async fn create_spk(&self, input: &SpkInput) -> Result<Record, ServiceError> {
        self.create_record(collection::SPK, "SPK", &input.to_directus())
            .await
    }

    pub async fn update_spk(&self, id: &RecordId, input: &SpkInput) -> Result<Record, ServiceError> {
        self.update_record(collection::SPK, "SPK", id, &input.to_directus())
            .await
    }

    pub async fn delete_spk(&self, id: &RecordId) -> Result<(), ServiceError> {
        self.delete_record(collection::SPK, "SPK", id).await
    }

    pub async fn ping_spk(&self) -> ConnectionStatus {
        self.client.ping(collection::SPK).await
    }

    // ── SPK approval workflow ──

    /// Move a draft or rejected SPK to `pending_approval`.
    pub async fn submit_spk(&self, id: &RecordId) -> Result<Record, ServiceError> {
        let current = status_of(&self.require(collection::SPK, "SPK", id).await?)?;
        if !current.can_submit() {
            return Err(ServiceError::Validation(format!(
                "SPK {id} is {current} and cannot be submitted"
            )));
        }
        self.set_spk_status(id, SpkStatus::PendingApproval, None)
            .await
    }

    pub async fn approve_spk(&self, id: &RecordId) -> Result<Record, ServiceError> {
        self.decide_spk(id, SpkStatus::Approved, None).await
    }

    /// Reject a pending SPK. A non-empty `reason` is stored in
    /// `rejection_reason`.
    pub async fn reject_spk(&self, id: &RecordId, reason: &str) -> Result<Record, ServiceError> {
        let reason = Some(reason.trim()).filter(|r| !r.is_empty());
        self.decide_spk(id, SpkStatus::Rejected, reason).await
    }

    async fn decide_spk(
        &self,
        id: &RecordId,
        to: SpkStatus,
        reason: Option<&str>,
    ) -> Result<Record, ServiceError> {
        let current = status_of(&self.require(collection::SPK, "SPK", id).await?)?;
        if !current.can_decide() {
            return Err(ServiceError::Validation(format!(
                "SPK {id} is {current}, only pending_approval can be {to}"
            )));
        }
        self.set_spk_status(id, to, reason).await
    }

    async fn set_spk_status(
        &self,
        id: &RecordId,
        to: SpkStatus,
        reason: Option<&str>,
    ) -> Result<Record, ServiceError> {
        let mut patch = json!({ "status": to });
        if let Some(reason) = reason {
            patch["rejection_reason"] = json!(reason);
        }
        let updated = self
            .update_record(collection::SPK, &format!("SPK status to {to}"), id, &patch)
            .await?;
        info!(%id, status = %to, "SPK status changed");
        Ok(updated)
    }
}
