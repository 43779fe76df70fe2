pub mod context;
pub mod inventory;
pub mod resource;
pub mod token;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use pabrik_client::{DirectusClient, StoredToken};
use pabrik_core::DirectusConfig;
use pabrik_inventory::InventoryService;
use pabrik_kv::{KVStore, RedbStore};
use serde::Serialize;
use tracing::debug;

use crate::config::{ClientConfig, Context};

/// Everything a command needs to talk to the current context.
pub struct Session {
    pub context: Context,
    pub config: DirectusConfig,
    pub state: Arc<dyn KVStore>,
    pub client: DirectusClient,
}

impl Session {
    pub fn open(client_config_path: &Path) -> Result<Self> {
        let config = ClientConfig::load(client_config_path)?;
        let context = config
            .current()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No current context. Run `pabrik use context <name>`."))?;
        let directus = context.directus_config(|k| std::env::var(k).ok())?;

        let state_path = directus.resolve_state_path();
        debug!(context = %context.name, state = %state_path.display(), "opening local state");
        let state: Arc<dyn KVStore> = Arc::new(RedbStore::open(&state_path)?);

        let tokens = StoredToken::new(state.clone(), directus.token.clone());
        let client = DirectusClient::new(&directus, Arc::new(tokens))?;

        Ok(Self {
            context,
            config: directus,
            state,
            client,
        })
    }

    pub fn service(&self) -> InventoryService {
        InventoryService::new(self.client.clone(), self.state.clone())
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print recovered read failures to stderr so an empty result is not
/// mistaken for an empty collection.
pub fn report_failures(service: &InventoryService) {
    for failure in service.failures().recent().iter().rev() {
        eprintln!(
            "warning: {} on {} failed: {}",
            failure.operation, failure.collection, failure.message
        );
    }
}
