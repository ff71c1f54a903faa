// ABOUTME: Library exports for jpom-admin functionality
// ABOUTME: Resolves settings from flags, environment and config, then runs a command

use anyhow::{Context, Result};
use jpom_client::{ClientConfig, TransportEncryption};

pub mod client;
pub mod commands;
pub mod console;

pub use commands::{Command, FilesCommand, SessionCommand, UrlCommand};

/// Crates whose events follow `--verbose`.
pub const LOG_TARGETS: &[&str] = &["jpom_client", "jpom_admin"];

/// Values given on the command line (or their env fallbacks).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub workspace: Option<String>,
    pub base64: bool,
}

/// Build the client config (flag > env > config file > default).
pub fn resolve_config(overrides: &Overrides) -> Result<ClientConfig> {
    let config = ClientConfig::load()
        .context("Failed to load config file")?
        .apply_env()
        .context("Invalid JPOM_* environment variable")?;
    Ok(apply_overrides(config, overrides))
}

fn apply_overrides(mut config: ClientConfig, overrides: &Overrides) -> ClientConfig {
    if let Some(ref url) = overrides.base_url {
        config.base_url = jpom_client::config::normalize_base_url(url);
    }
    if let Some(ref ws) = overrides.workspace {
        config.workspace_id = Some(ws.clone());
    }
    if overrides.base64 {
        config.transport_encryption = TransportEncryption::Base64;
    }
    config
}

/// Run an admin command
pub async fn run_command(command: Command, overrides: Overrides) -> Result<()> {
    let config = resolve_config(&overrides)?;

    match command {
        Command::Files(cmd) => {
            let dispatcher = client::connect(config, overrides.token.as_deref())?;
            commands::files::run(&dispatcher, cmd).await
        }
        Command::Session(cmd) => commands::session::run(config, overrides.token.as_deref(), cmd).await,
        Command::Url(cmd) => commands::urls::run(&config, cmd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_targets_include_both_crates() {
        assert!(LOG_TARGETS.contains(&"jpom_client"));
        assert!(LOG_TARGETS.contains(&env!("CARGO_CRATE_NAME")));
    }

    #[test]
    fn test_overrides_win() {
        let config = apply_overrides(
            ClientConfig::new("http://from-file:2122"),
            &Overrides {
                base_url: Some("flag-host:9000/".to_string()),
                token: None,
                workspace: Some("ws".to_string()),
                base64: true,
            },
        );
        assert_eq!(config.base_url, "http://flag-host:9000");
        assert_eq!(config.workspace_id.as_deref(), Some("ws"));
        assert_eq!(config.transport_encryption, TransportEncryption::Base64);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let config = apply_overrides(
            ClientConfig::new("http://from-file:2122").with_workspace("file-ws"),
            &Overrides::default(),
        );
        assert_eq!(config.base_url, "http://from-file:2122");
        assert_eq!(config.workspace_id.as_deref(), Some("file-ws"));
        assert_eq!(config.transport_encryption, TransportEncryption::None);
    }
}
