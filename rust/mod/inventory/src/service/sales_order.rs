use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use pabrik_client::Query;
use pabrik_core::{Record, days_ago_midnight, parse_datetime, str_field};

use super::{InventoryService, collection};

/// Window of [`InventoryService::recent_sales_orders`], in days.
pub const RECENT_DAYS: i64 = 30;

fn order_date(so: &Record) -> Option<NaiveDateTime> {
    str_field(so, "tanggal_so").and_then(parse_datetime)
}

/// Newest `tanggal_so` first; undated orders last.
fn newest_first(a: &Record, b: &Record) -> Ordering {
    match (order_date(a), order_date(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Orders not yet due: no delivery date, or delivery on or after `today`.
pub fn pending_orders(orders: Vec<Record>, today: NaiveDate) -> Vec<Record> {
    orders
        .into_iter()
        .filter(|so| match str_field(so, "tanggal_kirim") {
            None => true,
            Some(raw) => parse_datetime(raw).is_some_and(|d| d.date() >= today),
        })
        .collect()
}

/// Orders dated on or after midnight [`RECENT_DAYS`] days before `now`,
/// newest first. Undated orders are excluded.
pub fn recent_orders(orders: Vec<Record>, now: NaiveDateTime) -> Vec<Record> {
    let since = days_ago_midnight(now, RECENT_DAYS);
    let mut recent: Vec<Record> = orders
        .into_iter()
        .filter(|so| order_date(so).is_some_and(|d| d >= since))
        .collect();
    recent.sort_by(newest_first);
    recent
}

impl InventoryService {
    // ── Sales orders ──

    pub async fn list_sales_orders(&self) -> Vec<Record> {
        self.read_list("list_sales_orders", collection::SALES_ORDER, &Query::new())
            .await
    }

    /// Newest first, at most `limit` when given.
    pub async fn sales_orders_sorted(&self, limit: Option<usize>) -> Vec<Record> {
        let mut orders = self.list_sales_orders().await;
        orders.sort_by(newest_first);
        if let Some(limit) = limit {
            orders.truncate(limit);
        }
        orders
    }

    pub async fn pending_sales_orders(&self, today: NaiveDate) -> Vec<Record> {
        pending_orders(self.list_sales_orders().await, today)
    }

    pub async fn recent_sales_orders(&self, now: NaiveDateTime) -> Vec<Record> {
        recent_orders(self.list_sales_orders().await, now)
    }
}
