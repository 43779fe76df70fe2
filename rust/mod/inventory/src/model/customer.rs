use pabrik_core::{Record, str_field};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A customer usable in a picker: both code and display name are present.
///
/// Serializes as the record's own fields plus `kode` and `nama`; a record
/// that already has `kode` or `nama` keeps its value.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerOption {
    pub kode: String,
    pub nama: String,
    /// The full record, for callers that need more than the label.
    pub record: Record,
}

impl Serialize for CustomerOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.record.contains_key("kode") {
            map.serialize_entry("kode", &self.kode)?;
        }
        if !self.record.contains_key("nama") {
            map.serialize_entry("nama", &self.nama)?;
        }
        for (key, value) in &self.record {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl CustomerOption {
    /// `None` when `kode_customer` or `nama_sj_fp` is missing or empty.
    pub fn from_record(record: Record) -> Option<Self> {
        let kode = str_field(&record, "kode_customer")?.to_string();
        let nama = str_field(&record, "nama_sj_fp")?.to_string();
        Some(Self { kode, nama, record })
    }
}
