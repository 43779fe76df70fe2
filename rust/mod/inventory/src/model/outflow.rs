//! Inventory outflow (pengeluaran) derived from delivery notes.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use pabrik_core::{Record, RecordId, f64_field, parse_datetime, record_id, str_field};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    #[serde(rename = "FINISHED GOOD")]
    FinishedGood,
    #[serde(rename = "RAW MATERIAL")]
    RawMaterial,
    #[serde(rename = "CONSUMABLE")]
    Consumable,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::FinishedGood => "FINISHED GOOD",
            ItemType::RawMaterial => "RAW MATERIAL",
            ItemType::Consumable => "CONSUMABLE",
        }
    }

    /// Accepts the display form or a short name (`fg`, `rm`, `consumable`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().replace(['_', '-'], " ").as_str() {
            "FINISHED GOOD" | "FG" => Some(ItemType::FinishedGood),
            "RAW MATERIAL" | "RM" => Some(ItemType::RawMaterial),
            "CONSUMABLE" => Some(ItemType::Consumable),
            _ => None,
        }
    }
}

/// One outgoing movement of goods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutflowRow {
    pub id: Option<RecordId>,
    pub item_code: String,
    pub item_name: String,
    pub item_type: ItemType,
    pub quantity: f64,
    pub unit: String,
    /// Raw date string from the note (`tgl_sj`, else `date_created`).
    pub date: Option<String>,
    pub destination: String,
    pub pic: String,
    pub notes: String,
    pub status: String,
    pub delivery_note_no: Option<String>,
    pub po_no: Option<String>,
    pub color: Option<String>,
    pub packaging: Option<String>,
    pub price: Option<f64>,
    pub total_price: Option<f64>,
}

impl OutflowRow {
    /// Derive an outflow row from a `suratjalan` record. Every delivery note
    /// that exists counts as approved.
    pub fn from_delivery_note(sj: &Record) -> Self {
        let raw_material = str_field(sj, "nama_rawmaterial");
        let customer = str_field(sj, "kode_customer");
        let nomor_sj = str_field(sj, "nomor_sj");
        let no_po = str_field(sj, "no_po");

        let item_type = if raw_material.is_some() {
            ItemType::RawMaterial
        } else {
            ItemType::FinishedGood
        };
        let destination = match (customer, raw_material) {
            (Some(kode), _) => format!("Customer: {kode}"),
            (None, Some(_)) => "Produksi".to_string(),
            (None, None) => "-".to_string(),
        };
        let mut notes = format!("SJ: {}", nomor_sj.unwrap_or("-"));
        if let Some(po) = no_po {
            notes.push_str(&format!(" | PO: {po}"));
        }

        Self {
            id: record_id(sj),
            item_code: customer.or(nomor_sj).unwrap_or("-").to_string(),
            item_name: str_field(sj, "nama_finishgood")
                .or(raw_material)
                .unwrap_or("-")
                .to_string(),
            item_type,
            quantity: f64_field(sj, "quantity").unwrap_or(0.0),
            unit: str_field(sj, "satuan").unwrap_or("pcs").to_string(),
            date: str_field(sj, "tgl_sj")
                .or_else(|| str_field(sj, "date_created"))
                .map(String::from),
            destination,
            pic: str_field(sj, "kode_sales")
                .or_else(|| str_field(sj, "nama_sopir"))
                .unwrap_or("-")
                .to_string(),
            notes,
            status: "APPROVED".to_string(),
            delivery_note_no: nomor_sj.map(String::from),
            po_no: no_po.map(String::from),
            color: str_field(sj, "warna").map(String::from),
            packaging: str_field(sj, "kemasan").map(String::from),
            price: f64_field(sj, "harga"),
            total_price: f64_field(sj, "total_harga"),
        }
    }

    pub fn datetime(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_datetime)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeCounts {
    pub finished_good: usize,
    pub raw_material: usize,
    pub consumable: usize,
}

/// Headline numbers for the outflow dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutflowSummary {
    pub total: usize,
    pub this_month: usize,
    pub this_year: usize,
    pub by_type: TypeCounts,
    pub total_value: f64,
}

impl OutflowSummary {
    /// Rows without a parseable date count toward `total` only.
    pub fn compute(rows: &[OutflowRow], now: NaiveDateTime) -> Self {
        let today = now.date();
        let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
            .unwrap_or(today)
            .and_time(NaiveTime::MIN);
        let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1)
            .unwrap_or(today)
            .and_time(NaiveTime::MIN);

        let mut summary = OutflowSummary {
            total: rows.len(),
            ..Default::default()
        };
        for row in rows {
            if let Some(at) = row.datetime() {
                if at >= month_start {
                    summary.this_month += 1;
                }
                if at >= year_start {
                    summary.this_year += 1;
                }
            }
            match row.item_type {
                ItemType::FinishedGood => summary.by_type.finished_good += 1,
                ItemType::RawMaterial => summary.by_type.raw_material += 1,
                ItemType::Consumable => summary.by_type.consumable += 1,
            }
            summary.total_value += row.total_price.unwrap_or(0.0);
        }
        summary
    }
}

/// Client-side filter over outflow rows. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutflowFilter {
    /// Inclusive, from midnight.
    pub start_date: Option<NaiveDate>,
    /// Inclusive, through the end of the day.
    pub end_date: Option<NaiveDate>,
    pub item_type: Option<ItemType>,
    pub status: Option<String>,
    /// Case-insensitive substring over name, code, destination, PIC and
    /// delivery note number.
    pub search: Option<String>,
}

impl OutflowFilter {
    pub fn matches(&self, row: &OutflowRow) -> bool {
        if self.start_date.is_some() || self.end_date.is_some() {
            let Some(at) = row.datetime() else {
                return false;
            };
            if let Some(start) = self.start_date {
                if at.date() < start {
                    return false;
                }
            }
            if let Some(end) = self.end_date {
                if at.date() > end {
                    return false;
                }
            }
        }
        if let Some(t) = self.item_type {
            if row.item_type != t {
                return false;
            }
        }
        if let Some(ref status) = self.status {
            if &row.status != status {
                return false;
            }
        }
        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            let hit = [
                Some(row.item_name.as_str()),
                Some(row.item_code.as_str()),
                Some(row.destination.as_str()),
                Some(row.pic.as_str()),
                row.delivery_note_no.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        true
    }
}
