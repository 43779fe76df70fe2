use pabrik_client::Query;
use pabrik_core::{Record, RecordId};

use super::{InventoryService, collection};
use crate::ack::AckOutcome;
use crate::error::ServiceError;
use crate::model::{ApprovalNotice, SpkStatus};

impl InventoryService {
    // ── SPK approval notices ──

    /// SPK waiting for approval, newest first.
    pub async fn pending_spk(&self) -> Vec<Record> {
        let query = Query::new()
            .eq("status", SpkStatus::PendingApproval)
            .sort_desc("date_created");
        self.read_list("pending_spk", collection::SPK, &query).await
    }

    /// Every pending SPK as a notice, acknowledged or not.
    pub async fn approval_notices(&self) -> Vec<ApprovalNotice> {
        self.pending_spk()
            .await
            .iter()
            .filter_map(ApprovalNotice::from_spk)
            .collect()
    }

    /// Pending SPK the user has not acknowledged, locally or on the server.
    pub async fn unacknowledged_notices(&self) -> Vec<ApprovalNotice> {
        let pending = self.pending_spk().await;
        self.acks
            .unacknowledged_or_server_only(pending)
            .iter()
            .filter_map(ApprovalNotice::from_spk)
            .collect()
    }

    /// Full SPK record behind a notice.
    pub async fn notice_details(&self, spk_id: &RecordId) -> Option<Record> {
        self.get_spk(spk_id).await
    }

    /// Mark the notice of `spk_id` read. The local record is kept even when
    /// the server update fails.
    pub async fn acknowledge_notice(&self, spk_id: &RecordId) -> Result<AckOutcome, ServiceError> {
        self.acks.acknowledge(spk_id).await
    }

    pub fn clear_acknowledged(&self) -> Result<(), ServiceError> {
        Ok(self.acks.clear()?)
    }
}
