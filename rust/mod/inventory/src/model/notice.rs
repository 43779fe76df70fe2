use pabrik_core::{Record, RecordId, f64_field, record_id, str_field};
use serde::{Deserialize, Serialize};

/// A work order waiting for approval, shaped for the notification list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalNotice {
    /// `spk_{id}`.
    pub id: String,
    pub spk_id: RecordId,
    pub title: String,
    pub message: String,
    pub spk_nomor: Option<String>,
    pub nama_formula: Option<String>,
    pub finished_good: Option<String>,
    pub jumlah_produksi: Option<f64>,
    pub unit: Option<String>,
    pub kode_customer: Option<String>,
    pub created_at: Option<String>,
}

impl ApprovalNotice {
    /// `None` for records without a usable id.
    pub fn from_spk(record: &Record) -> Option<Self> {
        let spk_id = record_id(record)?;
        let nomor = str_field(record, "nomor").map(String::from);
        let formula = str_field(record, "nama_formula").map(String::from);
        let message = format!(
            "SPK {} ({}) is waiting for approval",
            nomor.as_deref().unwrap_or("-"),
            formula.as_deref().unwrap_or("Formula"),
        );
        Some(Self {
            id: format!("spk_{spk_id}"),
            spk_id,
            title: "SPK awaiting approval".to_string(),
            message,
            spk_nomor: nomor,
            nama_formula: formula,
            finished_good: str_field(record, "finished_good").map(String::from),
            jumlah_produksi: f64_field(record, "jumlah_produksi"),
            unit: str_field(record, "unit").map(String::from),
            kode_customer: str_field(record, "kode_customer").map(String::from),
            created_at: str_field(record, "date_created").map(String::from),
        })
    }
}

/// One item of a production request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestedItem {
    #[serde(rename = "nama_barang", default)]
    pub name: Option<String>,
    #[serde(rename = "kode_barang", default)]
    pub code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "sisa_stok", default)]
    pub remaining_stock: Option<f64>,
}

impl RequestedItem {
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: str_field(record, "nama_barang")
                .or_else(|| str_field(record, "nama"))
                .map(String::from),
            code: str_field(record, "kode_barang")
                .or_else(|| str_field(record, "kode"))
                .map(String::from),
            status: str_field(record, "status").map(String::from),
            remaining_stock: f64_field(record, "sisa_stok"),
        }
    }
}

/// "Production requested" event held by the notification center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionRequest {
    /// Millisecond timestamp, unique within a center.
    pub id: i64,
    pub message: String,
    pub item_count: usize,
    pub items: Vec<RequestedItem>,
    /// Local wall-clock time of the request, `dd/mm/yyyy, HH.MM.SS`.
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notice_from_spk() {
        let spk = json!({
            "id": 12,
            "nomor": "SPK/2024/012",
            "jumlah_produksi": "40",
            "unit": "kg",
            "date_created": "2024-05-01T08:00:00"
        });
        let notice = ApprovalNotice::from_spk(spk.as_object().unwrap()).unwrap();
        assert_eq!(notice.id, "spk_12");
        assert_eq!(notice.spk_id, RecordId::Int(12));
        assert_eq!(notice.message, "SPK SPK/2024/012 (Formula) is waiting for approval");
        assert_eq!(notice.jumlah_produksi, Some(40.0));
        assert_eq!(notice.nama_formula, None);
    }

    #[test]
    fn notice_needs_an_id() {
        let spk = json!({"nomor": "x"});
        assert!(ApprovalNotice::from_spk(spk.as_object().unwrap()).is_none());
    }

    #[test]
    fn requested_item_reads_material_fields() {
        let rm = json!({"kode": "RM-01", "nama": "Resin", "sisa_stok": 3, "status": "low"});
        let item = RequestedItem::from_record(rm.as_object().unwrap());
        assert_eq!(item.code.as_deref(), Some("RM-01"));
        assert_eq!(item.name.as_deref(), Some("Resin"));
        assert_eq!(item.remaining_stock, Some(3.0));
        assert_eq!(
            serde_json::to_value(&item).unwrap()["kode_barang"],
            "RM-01"
        );
    }
}
