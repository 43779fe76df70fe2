//! CSV and JSON exports of outflow data.

use chrono::NaiveDate;

use crate::model::{OutflowRow, OutflowSummary};

const OUTFLOW_HEADERS: &[&str] = &[
    "Date",
    "Item Code",
    "Item Name",
    "Type",
    "Quantity",
    "Unit",
    "Destination",
    "PIC",
    "Status",
    "Delivery Note",
    "PO",
    "Notes",
];

/// Quote one field: always wrapped in `"`, inner quotes doubled.
pub fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_line<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Header line plus one line per row, `\n` terminated.
pub fn csv_document<R>(headers: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = Vec<String>>,
{
    let mut out = csv_line(headers.iter());
    out.push('\n');
    for row in rows {
        out.push_str(&csv_line(row));
        out.push('\n');
    }
    out
}

fn format_quantity(q: f64) -> String {
    if q.fract() == 0.0 && q.abs() < 1e15 {
        format!("{}", q as i64)
    } else {
        q.to_string()
    }
}

pub fn outflow_csv(rows: &[OutflowRow]) -> String {
    csv_document(
        OUTFLOW_HEADERS,
        rows.iter().map(|row| {
            vec![
                row.datetime()
                    .map(|d| d.format("%d/%m/%Y").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                row.item_code.clone(),
                row.item_name.clone(),
                row.item_type.as_str().to_string(),
                format_quantity(row.quantity),
                row.unit.clone(),
                row.destination.clone(),
                row.pic.clone(),
                row.status.clone(),
                row.delivery_note_no.clone().unwrap_or_default(),
                row.po_no.clone().unwrap_or_default(),
                row.notes.clone(),
            ]
        }),
    )
}

/// `pengeluaran-inventory-YYYY-MM-DD.csv`
pub fn export_file_name(today: NaiveDate) -> String {
    format!("pengeluaran-inventory-{}.csv", today.format("%Y-%m-%d"))
}

pub fn summary_json(summary: &OutflowSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}
