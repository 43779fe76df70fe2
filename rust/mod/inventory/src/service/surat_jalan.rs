use chrono::NaiveDate;
use pabrik_client::Query;
use pabrik_core::{Record, RecordId, now_millis, str_field};
use serde_json::json;

use super::{InventoryService, collection};
use crate::error::ServiceError;

fn month_prefix(today: NaiveDate) -> String {
    format!("SJ/{}", today.format("%Y%m"))
}

/// Number following `latest` in the month of `today`: `SJ/YYYYMM/NNNN`.
/// The sequence restarts at 1 when `latest` is from another month.
pub fn next_sj_number(latest: Option<&str>, today: NaiveDate) -> String {
    let prefix = month_prefix(today);
    let sequence = match latest {
        Some(nomor) if nomor.starts_with(&prefix) => nomor
            .rsplit('/')
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0)
            + 1,
        _ => 1,
    };
    format!("{prefix}/{sequence:04}")
}

impl InventoryService {
    // ── Delivery notes (surat jalan) ──

    pub async fn list_surat_jalan(&self) -> Vec<Record> {
        self.read_list("list_surat_jalan", collection::SURAT_JALAN, &Query::new())
            .await
    }

    pub async fn get_surat_jalan(&self, id: &RecordId) -> Option<Record> {
        self.read_one("get_surat_jalan", collection::SURAT_JALAN, id)
            .await
    }

    /// Create a delivery note; it is always published.
    pub async fn create_surat_jalan(&self, note: &Record) -> Result<Record, ServiceError> {
        let mut body = note.clone();
        body.insert("status".into(), json!("published"));
        self.create_record(collection::SURAT_JALAN, "delivery note", &body)
            .await
    }

    pub async fn update_surat_jalan(
        &self,
        id: &RecordId,
        patch: &Record,
    ) -> Result<Record, ServiceError> {
        self.update_record(collection::SURAT_JALAN, "delivery note", id, patch)
            .await
    }

    pub async fn delete_surat_jalan(&self, id: &RecordId) -> Result<(), ServiceError> {
        self.delete_record(collection::SURAT_JALAN, "delivery note", id)
            .await
    }

    /// Next delivery note number, based on the most recently created note.
    /// When the lookup fails the sequence is replaced by the current time in
    /// milliseconds: `SJ/YYYYMM/<millis>`.
    pub async fn next_surat_jalan_number(&self, today: NaiveDate) -> String {
        let query = Query::new().sort_desc("date_created").limit(1);
        let result = self
            .client
            .list::<Record>(collection::SURAT_JALAN, &query)
            .await;
        match result {
            Ok(latest) => next_sj_number(
                latest.first().and_then(|sj| str_field(sj, "nomor_sj")),
                today,
            ),
            Err(e) => {
                self.failures
                    .record("next_surat_jalan_number", collection::SURAT_JALAN, &e);
                format!("{}/{}", month_prefix(today), now_millis())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sequence_continues_within_month() {
        let today = day(2024, 5, 20);
        assert_eq!(next_sj_number(Some("SJ/202405/0041"), today), "SJ/202405/0042");
        assert_eq!(next_sj_number(Some("SJ/202405/9999"), today), "SJ/202405/10000");
    }

    #[test]
    fn sequence_restarts() {
        let today = day(2024, 6, 1);
        assert_eq!(next_sj_number(Some("SJ/202405/0041"), today), "SJ/202406/0001");
        assert_eq!(next_sj_number(None, today), "SJ/202406/0001");
        assert_eq!(next_sj_number(Some("SJ/202406/x"), today), "SJ/202406/0001");
    }
}
