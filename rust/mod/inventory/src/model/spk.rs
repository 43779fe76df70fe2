use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Approval workflow of a work order (SPK).
///
/// ```text
/// draft ──submit──▶ pending_approval ──approve──▶ approved
///   ▲                      │
///   └──────submit──── rejected ◀──reject──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpkStatus {
    #[default]
    Draft,
    PendingApproval,
    Approved,
    Rejected,
}

impl SpkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SpkStatus::Draft => "draft",
            SpkStatus::PendingApproval => "pending_approval",
            SpkStatus::Approved => "approved",
            SpkStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(SpkStatus::Draft),
            "pending_approval" => Some(SpkStatus::PendingApproval),
            "approved" => Some(SpkStatus::Approved),
            "rejected" => Some(SpkStatus::Rejected),
            _ => None,
        }
    }

    /// Drafts and rejected orders can be (re)submitted for approval.
    pub fn can_submit(self) -> bool {
        matches!(self, SpkStatus::Draft | SpkStatus::Rejected)
    }

    /// Only orders waiting for approval can be approved or rejected.
    pub fn can_decide(self) -> bool {
        self == SpkStatus::PendingApproval
    }
}

impl fmt::Display for SpkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work order as entered in the form. Field names follow the form
/// (camelCase); [`SpkInput::to_directus`] maps them onto the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpkInput {
    pub nomor: String,
    pub batch_no: Option<String>,
    pub kode_formula: Option<String>,
    pub nama_formula: Option<String>,
    pub finished_good: Option<String>,
    /// Production date, `YYYY-MM-DD`.
    pub tanggal: Option<String>,
    pub jumlah_produksi: Option<f64>,
    pub unit: Option<String>,
    pub kode_customer: Option<String>,
    pub harga_per_unit: Option<f64>,
    pub total_harga: Option<f64>,
    pub status: Option<SpkStatus>,
    pub keterangan: Option<String>,
}

impl SpkInput {
    /// Body for `POST /items/spk` and `PATCH /items/spk/{id}`. Prices default
    /// to 0 and status to `draft`; every field is sent, unset ones as `null`.
    pub fn to_directus(&self) -> Value {
        json!({
            "nomor": self.nomor,
            "batch_no": self.batch_no,
            "kode_formula": self.kode_formula,
            "nama_formula": self.nama_formula,
            "finished_good": self.finished_good,
            "tanggal": self.tanggal,
            "jumlah_produksi": self.jumlah_produksi,
            "unit": self.unit,
            "kode_customer": self.kode_customer,
            "harga_per_unit": self.harga_per_unit.unwrap_or(0.0),
            "total_harga": self.total_harga.unwrap_or(0.0),
            "status": self.status.unwrap_or_default(),
            "keterangan": self.keterangan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions() {
        assert!(SpkStatus::Draft.can_submit());
        assert!(SpkStatus::Rejected.can_submit());
        assert!(!SpkStatus::Approved.can_submit());
        assert!(SpkStatus::PendingApproval.can_decide());
        assert!(!SpkStatus::Draft.can_decide());
        assert_eq!(SpkStatus::parse("pending_approval"), Some(SpkStatus::PendingApproval));
        assert_eq!(
            serde_json::to_value(SpkStatus::PendingApproval).unwrap(),
            "pending_approval"
        );
    }

    #[test]
    fn input_maps_to_collection_fields() {
        let input: SpkInput = serde_json::from_value(json!({
            "nomor": "SPK/001",
            "batchNo": "B-7",
            "namaFormula": "Cat Tembok",
            "jumlahProduksi": 120.0,
            "kodeCustomer": "C01"
        }))
        .unwrap();
        let body = input.to_directus();
        assert_eq!(body["nomor"], "SPK/001");
        assert_eq!(body["batch_no"], "B-7");
        assert_eq!(body["nama_formula"], "Cat Tembok");
        assert_eq!(body["jumlah_produksi"], 120.0);
        assert_eq!(body["kode_customer"], "C01");
        assert_eq!(body["harga_per_unit"], 0.0);
        assert_eq!(body["total_harga"], 0.0);
        assert_eq!(body["status"], "draft");
        assert!(body["keterangan"].is_null());
    }
}
