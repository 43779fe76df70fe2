use pabrik_client::Query;
use pabrik_core::{Record, str_field};

use super::{InventoryService, collection};
use crate::model::CustomerOption;

impl InventoryService {
    // ── Customers ──

    pub async fn list_customers(&self) -> Vec<Record> {
        self.read_list("list_customers", collection::CUSTOMER, &Query::new())
            .await
    }

    /// Customers usable in a picker: only records with both a code and a
    /// delivery name.
    pub async fn customer_options(&self) -> Vec<CustomerOption> {
        self.list_customers()
            .await
            .into_iter()
            .filter_map(CustomerOption::from_record)
            .collect()
    }

    pub async fn customer_by_code(&self, kode: &str) -> Option<Record> {
        self.list_customers()
            .await
            .into_iter()
            .find(|c| str_field(c, "kode_customer") == Some(kode))
    }
}
