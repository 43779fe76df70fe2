use pabrik_core::Record;
use serde_json::{Value, json};

const TEXT_FIELDS: &[&str] = &[
    "kode", "nama", "kemasan", "satuan", "Divisi", "Group", "Jenis", "stok",
];

const NUMBER_FIELDS: &[&str] = &[
    "harga_beli",
    "harga_lama",
    "hp_awal",
    "sisa_stok",
    "sisa_po",
    "minimum_stok",
    "in_liter",
    "in_kg",
];

/// Text coercion used by the raw material form: falsy values become `""`,
/// anything else its text form.
fn as_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => number_text(n),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => String::new(),
    }
}

/// Integral floats print without a fraction: `25.0` reads `"25"`.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Numeric coercion: numbers and numeric strings, otherwise 0.
fn as_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => Some(0.0),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    n.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Normalise a raw material before it is created: every known field is
/// present with the right JSON type, `kategori` defaults to `Active` and the
/// record is published. Unknown input fields are dropped.
pub fn sanitize_raw_material(input: &Record) -> Record {
    let mut out = Record::new();
    for field in TEXT_FIELDS {
        out.insert(field.to_string(), json!(as_text(input.get(*field))));
    }
    let kategori = as_text(input.get("kategori"));
    out.insert(
        "kategori".into(),
        json!(if kategori.is_empty() { "Active".to_string() } else { kategori }),
    );
    for field in NUMBER_FIELDS {
        out.insert(field.to_string(), json!(as_number(input.get(*field))));
    }
    out.insert("status".into(), json!("published"));
    out
}
