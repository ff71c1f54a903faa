// ABOUTME: Dispatcher construction for CLI commands
// ABOUTME: Wires the stored session (or a --token override) and console sinks into the client

use anyhow::{Context, Result};
use jpom_client::{ClientConfig, Dispatcher, FileSessionStore, MemorySessionStore, SessionStore};
use std::sync::Arc;

use crate::console::{ConsoleNavigator, ConsoleNotifier};

/// Session store for this invocation. An explicit token is kept in memory so
/// it never overwrites the stored session.
pub fn session_store(token: Option<&str>) -> Result<Arc<dyn SessionStore>> {
    if let Some(token) = token {
        return Ok(Arc::new(MemorySessionStore::with_token(token)));
    }
    let path = FileSessionStore::default_path().context("Could not determine session path")?;
    let store = FileSessionStore::open(&path)
        .with_context(|| format!("Failed to open session file {}", path.display()))?;
    Ok(Arc::new(store))
}

pub fn connect(config: ClientConfig, token: Option<&str>) -> Result<Dispatcher> {
    tracing::debug!(base_url = %config.base_url, "creating dispatcher");
    Dispatcher::builder(config)
        .session_store(session_store(token)?)
        .notifier(Arc::new(ConsoleNotifier))
        .navigator(Arc::new(ConsoleNavigator))
        .build()
        .context("Failed to create API client")
}
