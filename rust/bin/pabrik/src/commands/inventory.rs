//! Derived views and workflows: sales orders, SPK approvals, outflow,
//! low stock and delivery note numbering.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use pabrik_core::str_field;
use pabrik_inventory::model::{ItemType, OutflowFilter, OutflowRow};
use pabrik_inventory::{export_file_name, outflow_csv, summary_json};

use super::resource::parse_id;
use super::{Session, print_json, report_failures};

// ── Sales orders ──

pub async fn so_pending(client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    let orders = service.pending_sales_orders(Local::now().date_naive()).await;
    report_failures(&service);
    print_json(&orders)
}

pub async fn so_recent(client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    let orders = service.recent_sales_orders(Local::now().naive_local()).await;
    report_failures(&service);
    print_json(&orders)
}

// ── SPK ──

pub async fn spk_list(client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    let list = service.list_spk().await;
    report_failures(&service);
    print_json(&list)
}

pub async fn spk_submit(id: &str, client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    service.submit_spk(&parse_id(id)).await?;
    println!("SPK {} submitted for approval.", id);
    Ok(())
}

pub async fn spk_approve(id: &str, client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    service.approve_spk(&parse_id(id)).await?;
    println!("SPK {} approved.", id);
    Ok(())
}

pub async fn spk_reject(id: &str, reason: &str, client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    service.reject_spk(&parse_id(id), reason).await?;
    println!("SPK {} rejected.", id);
    Ok(())
}

// ── Approval notices ──

pub async fn notices_list(all: bool, json: bool, client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    let notices = if all {
        service.approval_notices().await
    } else {
        service.unacknowledged_notices().await
    };
    report_failures(&service);

    if json {
        return print_json(&notices);
    }
    if notices.is_empty() {
        println!("No SPK waiting for approval.");
        return Ok(());
    }
    println!("{:12} {:20} {:24} {}", "SPK", "NOMOR", "CREATED", "MESSAGE");
    for n in &notices {
        println!(
            "{:12} {:20} {:24} {}",
            n.spk_id.to_string(),
            n.spk_nomor.as_deref().unwrap_or("-"),
            n.created_at.as_deref().unwrap_or("-"),
            n.message
        );
    }
    Ok(())
}

pub async fn notices_show(id: &str, client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    match service.notice_details(&parse_id(id)).await {
        Some(spk) => print_json(&spk),
        None => {
            report_failures(&service);
            anyhow::bail!("SPK {} not found.", id)
        }
    }
}

pub async fn notices_ack(id: &str, client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    let outcome = service.acknowledge_notice(&parse_id(id)).await?;
    if outcome.is_confirmed() {
        println!("Notice for SPK {} marked read.", id);
    } else {
        println!("Notice for SPK {} marked read locally (server not updated).", id);
    }
    Ok(())
}

pub fn notices_clear(client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    service.clear_acknowledged()?;
    println!("Local acknowledgements cleared.");
    Ok(())
}

// ── Outflow ──

#[derive(Debug, Default)]
pub struct OutflowArgs {
    pub from: Option<String>,
    pub to: Option<String>,
    pub item_type: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

fn parse_date(flag: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("--{} expects YYYY-MM-DD, got \"{}\"", flag, raw))
}

impl OutflowArgs {
    pub fn to_filter(&self) -> Result<OutflowFilter> {
        let item_type = match self.item_type.as_deref() {
            Some(raw) => Some(
                ItemType::parse(raw)
                    .ok_or_else(|| anyhow::anyhow!("Unknown item type: {}", raw))?,
            ),
            None => None,
        };
        Ok(OutflowFilter {
            start_date: self.from.as_deref().map(|d| parse_date("from", d)).transpose()?,
            end_date: self.to.as_deref().map(|d| parse_date("to", d)).transpose()?,
            item_type,
            status: self.status.clone(),
            search: self.search.clone(),
        })
    }
}

fn print_outflow_table(rows: &[OutflowRow]) {
    println!(
        "{:12} {:16} {:28} {:14} {:>10} {:20}",
        "DATE", "CODE", "ITEM", "TYPE", "QTY", "DESTINATION"
    );
    for row in rows {
        let date = row
            .datetime()
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:12} {:16} {:28} {:14} {:>10} {:20}",
            date,
            row.item_code,
            row.item_name,
            row.item_type.as_str(),
            format!("{} {}", row.quantity, row.unit),
            row.destination
        );
    }
}

pub async fn outflow_list(args: &OutflowArgs, json: bool, client_config_path: &Path) -> Result<()> {
    let filter = args.to_filter()?;
    let service = Session::open(client_config_path)?.service();
    let rows = service.filter_outflow(&filter).await;
    report_failures(&service);
    if json {
        print_json(&rows)
    } else {
        print_outflow_table(&rows);
        Ok(())
    }
}

pub async fn outflow_summary(client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    let summary = service.outflow_summary(Local::now().naive_local()).await;
    report_failures(&service);
    println!("{}", summary_json(&summary)?);
    Ok(())
}

/// Write the filtered rows as CSV. Without `out` the file is named after
/// today's date in the current directory.
pub async fn outflow_export(
    args: &OutflowArgs,
    out: Option<&str>,
    client_config_path: &Path,
) -> Result<()> {
    let filter = args.to_filter()?;
    let service = Session::open(client_config_path)?.service();
    let rows = service.filter_outflow(&filter).await;
    report_failures(&service);

    let path = out
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(export_file_name(Local::now().date_naive())));
    std::fs::write(&path, outflow_csv(&rows))?;
    println!("Exported {} rows to {}.", rows.len(), path.display());
    Ok(())
}

// ── Raw materials ──

pub async fn materials_low_stock(json: bool, client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    let low = service.low_stock_materials().await;
    report_failures(&service);
    if json {
        return print_json(&low);
    }
    if low.is_empty() {
        println!("No raw material below its minimum stock.");
        return Ok(());
    }
    println!("{:12} {:32} {:>10} {:>10}", "KODE", "NAMA", "SISA", "MINIMUM");
    for m in &low {
        println!(
            "{:12} {:32} {:>10} {:>10}",
            str_field(m, "kode").unwrap_or("-"),
            str_field(m, "nama").unwrap_or("-"),
            m.get("sisa_stok").map(|v| v.to_string()).unwrap_or_default(),
            m.get("minimum_stok").map(|v| v.to_string()).unwrap_or_default(),
        );
    }
    Ok(())
}

// ── Delivery notes ──

pub async fn sj_next_number(client_config_path: &Path) -> Result<()> {
    let service = Session::open(client_config_path)?.service();
    let nomor = service
        .next_surat_jalan_number(Local::now().date_naive())
        .await;
    report_failures(&service);
    println!("{}", nomor);
    Ok(())
}
