//! Bounded, observable list of "production requested" events.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeZone};
use tokio::sync::watch;
use tracing::debug;

use crate::model::{ProductionRequest, RequestedItem};

pub const NOTIFICATION_CAPACITY: usize = 10;

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H.%M.%S";

/// Holds the most recent [`NOTIFICATION_CAPACITY`] production requests,
/// newest first. Subscribers see every change.
pub struct NotificationCenter {
    tx: watch::Sender<Vec<ProductionRequest>>,
    last_id: Mutex<i64>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            tx,
            last_id: Mutex::new(0),
        }
    }

    /// Record a production request for `items`; returns its id.
    pub fn push(&self, items: Vec<RequestedItem>) -> i64 {
        self.push_at(items, Local::now())
    }

    /// Like [`NotificationCenter::push`] with an explicit clock reading.
    /// Ids stay strictly increasing even if the clock does not.
    pub fn push_at<Tz: TimeZone>(&self, items: Vec<RequestedItem>, at: DateTime<Tz>) -> i64
    where
        Tz::Offset: std::fmt::Display,
    {
        let id = {
            let mut last = self.last_id.lock().unwrap_or_else(|e| e.into_inner());
            let id = at.timestamp_millis().max(*last + 1);
            *last = id;
            id
        };
        let request = ProductionRequest {
            id,
            message: format!("Production requested for {} item(s)", items.len()),
            item_count: items.len(),
            items,
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        };
        self.tx.send_modify(|list| {
            list.insert(0, request);
            list.truncate(NOTIFICATION_CAPACITY);
        });
        debug!(id, "production request recorded");
        id
    }

    /// Returns whether an entry was removed.
    pub fn remove(&self, id: i64) -> bool {
        self.tx.send_if_modified(|list| {
            let before = list.len();
            list.retain(|n| n.id != id);
            list.len() != before
        })
    }

    pub fn clear(&self) {
        self.tx.send_if_modified(|list| {
            let changed = !list.is_empty();
            list.clear();
            changed
        });
    }

    /// Current list, newest first.
    pub fn snapshot(&self) -> Vec<ProductionRequest> {
        self.tx.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<ProductionRequest>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(code: &str) -> RequestedItem {
        RequestedItem {
            code: Some(code.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn eleventh_push_evicts_the_oldest() {
        let center = NotificationCenter::new();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let ids: Vec<i64> = (0..11)
            .map(|i| center.push_at(vec![item(&format!("RM-{i}"))], at))
            .collect();

        let list = center.snapshot();
        assert_eq!(list.len(), NOTIFICATION_CAPACITY);
        assert_eq!(list[0].id, ids[10]);
        assert!(list.iter().all(|n| n.id != ids[0]));
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn event_shape() {
        let center = NotificationCenter::new();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 5, 9).unwrap();
        let id = center.push_at(vec![item("A"), item("B")], at);
        let n = &center.snapshot()[0];
        assert_eq!(n.id, id);
        assert_eq!(id, at.timestamp_millis());
        assert_eq!(n.item_count, 2);
        assert_eq!(n.message, "Production requested for 2 item(s)");
        assert_eq!(n.timestamp, "01/05/2024, 08.05.09");
    }

    #[test]
    fn remove_and_clear() {
        let center = NotificationCenter::new();
        let a = center.push(vec![item("A")]);
        let b = center.push(vec![item("B")]);
        assert!(center.remove(a));
        assert!(!center.remove(a));
        assert_eq!(center.snapshot()[0].id, b);
        center.clear();
        assert!(center.is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let center = NotificationCenter::new();
        let mut rx = center.subscribe();
        center.push(vec![item("A")]);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
