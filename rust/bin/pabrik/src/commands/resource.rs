//! Generic resource CRUD commands.
//!
//! `pabrik get gudang`, `pabrik create spk -f spk.json`, etc.
//! Translates resource names to Directus collections.

use std::path::Path;

use anyhow::Result;
use pabrik_client::{FilterOp, Query};
use pabrik_core::{Record, RecordId};
use pabrik_inventory::collection;
use serde_json::Value;

use super::{Session, print_json};

/// Map a friendly resource name to its collection. Unknown names are used
/// as collection names verbatim.
pub fn resource_collection(resource: &str) -> String {
    match resource.to_lowercase().as_str() {
        "customer" | "customers" => collection::CUSTOMER.to_string(),
        "gudang" | "warehouse" | "warehouses" => collection::GUDANG.to_string(),
        "rawmaterial" | "raw-material" | "raw-materials" | "material" | "materials" => {
            collection::RAW_MATERIAL.to_string()
        }
        "so" | "sales-order" | "sales-orders" => collection::SALES_ORDER.to_string(),
        "spk" | "work-order" | "work-orders" => collection::SPK.to_string(),
        "sj" | "suratjalan" | "delivery-note" | "delivery-notes" => {
            collection::SURAT_JALAN.to_string()
        }
        "outflow" | "pengeluaran" => collection::OUTFLOW.to_string(),
        "barang" | "item" | "items" => collection::BARANG.to_string(),
        _ => resource.to_string(),
    }
}

/// Numeric ids address integer keys; anything else is a string key.
pub fn parse_id(id: &str) -> RecordId {
    id.parse::<i64>()
        .map(RecordId::Int)
        .unwrap_or_else(|_| RecordId::from(id))
}

/// Parse `field:op:value` (`op` with or without the leading `_`).
/// When the middle part is not an operator, everything after the field is
/// an `_eq` value, so `field:value` works even if the value contains `:`.
pub fn parse_filter(raw: &str) -> Result<(String, FilterOp, String)> {
    let (field, rest) = raw
        .split_once(':')
        .filter(|(field, _)| !field.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Invalid filter \"{}\", expected field:op:value", raw))?;
    if let Some((op, value)) = rest.split_once(':') {
        if let Some(op) = FilterOp::parse(op) {
            return Ok((field.to_string(), op, value.to_string()));
        }
    }
    Ok((field.to_string(), FilterOp::Eq, rest.to_string()))
}

fn parse_body(json_body: &str) -> Result<Record> {
    let body: Value =
        serde_json::from_str(json_body).map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))?;
    match body {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Body must be a JSON object."),
    }
}

#[derive(Debug, Default)]
pub struct ListArgs {
    pub limit: Option<i64>,
    pub offset: Option<usize>,
    pub sort: Vec<String>,
    pub filters: Vec<String>,
    pub fields: Option<String>,
}

impl ListArgs {
    pub fn to_query(&self) -> Result<Query> {
        let mut query = Query::new();
        if let Some(ref fields) = self.fields {
            let fields: Vec<&str> = fields.split(',').map(str::trim).collect();
            query = query.fields(&fields);
        }
        for raw in &self.filters {
            let (field, op, value) = parse_filter(raw)?;
            query = query.filter(&field, op, value);
        }
        for s in &self.sort {
            query = match s.strip_prefix('-') {
                Some(field) => query.sort_desc(field),
                None => query.sort(s),
            };
        }
        if let Some(l) = self.limit {
            query = query.limit(l);
        }
        if let Some(o) = self.offset {
            query = query.offset(o);
        }
        Ok(query)
    }
}

/// GET a resource (list or get by ID).
pub async fn get(
    resource: &str,
    id: Option<&str>,
    args: &ListArgs,
    client_config_path: &Path,
) -> Result<()> {
    let session = Session::open(client_config_path)?;
    let target = resource_collection(resource);

    if let Some(id) = id {
        let found: Option<Record> = session
            .client
            .get(&target, &parse_id(id), &args.to_query()?)
            .await?;
        match found {
            Some(record) => print_json(&record)?,
            None => anyhow::bail!("{} {} not found.", target, id),
        }
    } else {
        let page = session
            .client
            .list_page::<Record>(&target, &args.to_query()?)
            .await?;
        print_json(&page)?;
    }
    Ok(())
}

/// CREATE a resource.
pub async fn create(resource: &str, json_body: &str, client_config_path: &Path) -> Result<()> {
    let session = Session::open(client_config_path)?;
    let target = resource_collection(resource);
    let body = parse_body(json_body)?;
    let service = session.service();

    let created = match target.as_str() {
        collection::RAW_MATERIAL => service.create_raw_material(&body).await?,
        collection::SURAT_JALAN => service.create_surat_jalan(&body).await?,
        collection::OUTFLOW => service.create_manual_outflow(&body).await?,
        collection::SPK => {
            let input = serde_json::from_value(Value::Object(body))
                .map_err(|e| anyhow::anyhow!("Invalid SPK: {}", e))?;
            service.create_spk(&input).await?
        }
        _ => session.client.create(&target, &body).await?,
    };

    println!("{} created.", target);
    print_json(&created)
}

/// UPDATE a resource (PATCH).
pub async fn update(
    resource: &str,
    id: &str,
    json_body: &str,
    client_config_path: &Path,
) -> Result<()> {
    let session = Session::open(client_config_path)?;
    let target = resource_collection(resource);
    let body = parse_body(json_body)?;

    let updated: Record = session
        .client
        .update(&target, &parse_id(id), &body)
        .await?;

    println!("{} {} updated.", target, id);
    print_json(&updated)
}

/// DELETE a resource.
pub async fn delete(resource: &str, id: &str, client_config_path: &Path) -> Result<()> {
    let session = Session::open(client_config_path)?;
    let target = resource_collection(resource);
    session.client.delete(&target, &parse_id(id)).await?;
    println!("{} {} deleted.", target, id);
    Ok(())
}

/// STATUS: probe the collections this tool works with.
pub async fn status(client_config_path: &Path) -> Result<()> {
    let session = Session::open(client_config_path)?;

    println!("Context:   {}", session.context.name);
    println!("Server:    {}", session.config.base_url);
    println!("State:     {}", session.config.resolve_state_path().display());

    for name in [
        collection::RAW_MATERIAL,
        collection::SPK,
        collection::SALES_ORDER,
        collection::SURAT_JALAN,
    ] {
        let probe = session.client.ping(name).await;
        let state = if probe.success { "ok" } else { "error" };
        println!("{:14} {:6} {}", name, state, probe.message);
    }
    Ok(())
}
