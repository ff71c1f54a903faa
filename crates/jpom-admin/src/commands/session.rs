// ABOUTME: Implementation of 'jpom-admin session' commands
// ABOUTME: Shows, stores, renews and clears the persisted session token

use anyhow::{bail, Context, Result};
use colored::Colorize;

use jpom_client::api::user;
use jpom_client::{ClientConfig, FileSessionStore, LoginData, SessionStore};

use super::SessionCommand;
use crate::client;

pub async fn run(config: ClientConfig, token: Option<&str>, cmd: SessionCommand) -> Result<()> {
    match cmd {
        SessionCommand::Show => show_session(&config),
        SessionCommand::Set { token } => set_token(token),
        SessionCommand::Renew => renew(config, token).await,
        SessionCommand::Clear => clear_session(),
    }
}

fn open_store() -> Result<FileSessionStore> {
    let path = FileSessionStore::default_path().context("Could not determine session path")?;
    FileSessionStore::open(&path)
        .with_context(|| format!("Failed to open session file {}", path.display()))
}

fn show_session(config: &ClientConfig) -> Result<()> {
    let store = open_store()?;

    println!("{}", "Session".bold());
    println!("  {}:    {}", "Server".dimmed(), config.base_url);
    println!(
        "  {}: {}",
        "Workspace".dimmed(),
        config.workspace_id.as_deref().unwrap_or("(none)")
    );
    println!("  {}:      {}", "File".dimmed(), store.path().display());
    let status = if store.token().is_some() {
        "token stored".green()
    } else {
        "no token".yellow()
    };
    println!("  {}:    {}", "Status".dimmed(), status);
    Ok(())
}

fn set_token(token: String) -> Result<()> {
    let token = token.trim().to_string();
    if token.is_empty() {
        bail!("Token must not be empty.");
    }

    let store = open_store()?;
    store.store(LoginData {
        token,
        long_term_token: None,
    });
    println!(
        "{} {}",
        "Token saved to".green().bold(),
        store.path().display()
    );
    Ok(())
}

async fn renew(config: ClientConfig, token: Option<&str>) -> Result<()> {
    let dispatcher = client::connect(config, token)?;
    if dispatcher.session().token().is_none() {
        bail!("No session to renew. Store one with 'jpom-admin session set <token>' or pass --token.");
    }

    user::renewal(&dispatcher)
        .await
        .context("Failed to renew session")?;

    println!("{}", "Session renewed".green().bold());
    if token.is_some() {
        println!(
            "  {}",
            "The renewed token was not saved because --token was given.".dimmed()
        );
    }
    Ok(())
}

fn clear_session() -> Result<()> {
    let store = open_store()?;
    store.clear();
    println!("{}", "Session cleared".green().bold());
    Ok(())
}
