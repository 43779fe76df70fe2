//! Client-side context management.
//!
//! Reads/writes `~/.pabrik/config.toml`.

use std::path::{Path, PathBuf};

use pabrik_core::DirectusConfig;
use serde::{Deserialize, Serialize};

/// A single context: one Directus instance plus its local state file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Context name (e.g. "pabrik-prod").
    pub name: String,

    /// Directus base URL (e.g. "https://directus.example.com").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    /// Static token used when no override is stored locally.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    /// Local state database. Defaults to `~/.pabrik/<name>.redb`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Context {
    /// Connection settings for this context. `PABRIK_*` variables from
    /// `lookup` override the stored values.
    pub fn directus_config<F>(&self, lookup: F) -> anyhow::Result<DirectusConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.server.is_empty() && lookup("PABRIK_BASE_URL").is_none() {
            anyhow::bail!(
                "No server URL set for context \"{}\". Run `pabrik context set {} --server <url>`.",
                self.name,
                self.name
            );
        }
        let mut config = DirectusConfig::new(self.server.as_str());
        if !self.token.is_empty() {
            config.token = Some(self.token.clone());
        }
        config.state_path = Some(if self.state.is_empty() {
            dirs_path().join(format!("{}.redb", self.name))
        } else {
            PathBuf::from(&self.state)
        });
        config.timeout_secs = self.timeout_secs;
        config.apply_env(lookup)?;
        Ok(config)
    }
}

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name of the currently active context.
    #[serde(rename = "current-context", default)]
    pub current_context: String,

    /// List of configured contexts.
    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl ClientConfig {
    /// Default config file path: ~/.pabrik/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the currently active context, if any.
    pub fn current(&self) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == self.current_context)
    }

    /// Get a mutable reference to a context by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Add or update a context.
    pub fn upsert_context(&mut self, ctx: Context) {
        if let Some(existing) = self.get_mut(&ctx.name) {
            *existing = ctx;
        } else {
            self.contexts.push(ctx);
        }
    }

    /// Remove a context by name. Returns true if it was found.
    pub fn remove_context(&mut self, name: &str) -> bool {
        let len = self.contexts.len();
        self.contexts.retain(|c| c.name != name);
        if self.current_context == name {
            self.current_context = String::new();
        }
        self.contexts.len() < len
    }
}

/// Return the pabrik config directory (~/.pabrik).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".pabrik")
}
