//! Context management commands.

use std::path::Path;

use anyhow::Result;

use crate::config::{ClientConfig, Context};

/// Register a new context. The first context becomes the current one.
pub fn create(
    name: &str,
    server: &str,
    token: Option<&str>,
    state: Option<&str>,
    client_config_path: &Path,
) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("Context name cannot be empty.");
    }
    let mut client_config = ClientConfig::load(client_config_path)?;
    if client_config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!("Context \"{}\" already exists. Use `pabrik context set`.", name);
    }
    client_config.upsert_context(Context {
        name: name.to_string(),
        server: server.trim_end_matches('/').to_string(),
        token: token.unwrap_or_default().to_string(),
        state: state.unwrap_or_default().to_string(),
        timeout_secs: None,
    });
    if client_config.current_context.is_empty() {
        client_config.current_context = name.to_string();
    }
    client_config.save(client_config_path)?;

    println!("Context \"{}\" created.", name);
    println!("  Server: {}", server);
    Ok(())
}

/// List all contexts.
pub fn list(client_config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: pabrik context create <name> --server <url>");
        return Ok(());
    }

    println!("{:2} {:20} {:40} {:8}", "", "NAME", "SERVER", "TOKEN");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context {
            "*"
        } else {
            " "
        };
        let server = if ctx.server.is_empty() { "-" } else { &ctx.server };
        let token = if ctx.token.is_empty() { "-" } else { "static" };
        println!("{:2} {:20} {:40} {:8}", marker, ctx.name, server, token);
    }

    Ok(())
}

/// Switch current context.
pub fn use_context(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!(
            "Context \"{}\" not found. Run `pabrik context list` to see available contexts.",
            name
        );
    }

    config.current_context = name.to_string();
    config.save(client_config_path)?;
    println!("Switched to context \"{}\".", name);
    Ok(())
}

/// Set properties on a context.
pub fn set(
    name: &str,
    server: Option<&str>,
    token: Option<&str>,
    timeout_secs: Option<u64>,
    client_config_path: &Path,
) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let ctx = config
        .get_mut(name)
        .ok_or_else(|| anyhow::anyhow!("Context \"{}\" not found.", name))?;

    if let Some(s) = server {
        ctx.server = s.trim_end_matches('/').to_string();
    }
    if let Some(t) = token {
        ctx.token = t.to_string();
    }
    if timeout_secs.is_some() {
        ctx.timeout_secs = timeout_secs.filter(|s| *s > 0);
    }

    config.save(client_config_path)?;
    println!("Context \"{}\" updated.", name);
    Ok(())
}

/// Delete a context (its local state file is left in place).
pub fn delete(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.remove_context(name) {
        anyhow::bail!("Context \"{}\" not found.", name);
    }

    config.save(client_config_path)?;
    println!("Context \"{}\" deleted.", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_context_becomes_current() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        create("prod", "https://directus.example.com/", None, None, &path).unwrap();
        create("stage", "http://localhost:8055", Some("t"), None, &path).unwrap();
        assert!(create("prod", "x", None, None, &path).is_err());

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.current_context, "prod");
        assert_eq!(config.current().unwrap().server, "https://directus.example.com");

        use_context("stage", &path).unwrap();
        set("stage", None, None, Some(15), &path).unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.current().unwrap().timeout_secs, Some(15));
        assert_eq!(config.current().unwrap().token, "t");

        delete("stage", &path).unwrap();
        assert!(ClientConfig::load(&path).unwrap().current().is_none());
        assert!(use_context("stage", &path).is_err());
    }
}
