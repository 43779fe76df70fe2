//! Inventory, sales order and work order management over Directus.
//!
//! [`InventoryService`] wraps one [`pabrik_client::DirectusClient`] with the
//! factory's collections. Next to it live the local pieces that never touch
//! the server on their own: [`AckCache`] (which SPK notices the user has
//! read), [`NotificationCenter`] (recent production requests) and the CSV
//! export of outflow rows.

pub mod ack;
pub mod error;
pub mod export;
pub mod model;
pub mod notify;
pub mod service;

pub use ack::{AckCache, AckOutcome, AckTarget};
pub use error::{ServiceError, error_code};
pub use export::{csv_document, csv_field, export_file_name, outflow_csv, summary_json};
pub use notify::{NOTIFICATION_CAPACITY, NotificationCenter};
pub use service::{InventoryService, SPK_ACK_KEY, SPK_ACK_TARGET, collection};
