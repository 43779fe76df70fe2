//! Local token override for the current context.

use std::path::Path;

use anyhow::Result;
use pabrik_client::StoredToken;

use super::Session;

pub fn set(token: &str, client_config_path: &Path) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("Token cannot be empty.");
    }
    let session = Session::open(client_config_path)?;
    StoredToken::save(session.state.as_ref(), token)?;
    println!("Token stored for context \"{}\".", session.context.name);
    Ok(())
}

pub fn clear(client_config_path: &Path) -> Result<()> {
    let session = Session::open(client_config_path)?;
    StoredToken::clear(session.state.as_ref())?;
    println!(
        "Token override cleared for context \"{}\".",
        session.context.name
    );
    Ok(())
}
