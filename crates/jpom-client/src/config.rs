// ABOUTME: Client configuration: base URL, router base, timeout, transport encoding
// ABOUTME: Loaded from ~/.config/jpom/config.toml with JPOM_* environment overrides

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Request timeout used when nothing else is configured.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(20);

/// Delay before the login redirect and the post-renewal reload.
pub const DEFAULT_NAVIGATION_DELAY: Duration = Duration::from_secs(2);

/// How outgoing payloads are obfuscated on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransportEncryption {
    #[default]
    None,
    Base64,
}

impl FromStr for TransportEncryption {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" => Ok(TransportEncryption::None),
            "BASE64" => Ok(TransportEncryption::Base64),
            _ => Err(ConfigError::InvalidValue {
                field: "transport_encryption",
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for the request dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server origin, e.g. "http://127.0.0.1:2122"
    pub base_url: String,
    /// Path prefix the console is mounted under ("" when at the root)
    pub router_base: String,
    /// Request timeout in seconds; 0 falls back to the default
    pub api_timeout_secs: u64,
    /// Payload obfuscation applied to outgoing requests
    pub transport_encryption: TransportEncryption,
    /// Workspace sent in the `workspaceId` header
    pub workspace_id: Option<String>,
    /// Include the request path in failure notices (handy outside production)
    pub show_request_url: bool,
    /// Delay before login redirects and post-renewal reloads, in milliseconds
    pub navigation_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:2122".to_string(),
            router_base: String::new(),
            api_timeout_secs: DEFAULT_API_TIMEOUT.as_secs(),
            transport_encryption: TransportEncryption::None,
            workspace_id: None,
            show_request_url: false,
            navigation_delay_ms: DEFAULT_NAVIGATION_DELAY.as_millis() as u64,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            ..Self::default()
        }
    }

    /// Config directory (~/.config/jpom), respecting XDG_CONFIG_HOME.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return Ok(PathBuf::from(xdg).join("jpom"));
            }
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(home.join(".config").join("jpom"))
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load from the default path. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.base_url = normalize_base_url(&config.base_url);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.display().to_string(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply JPOM_* environment overrides.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (environment in production,
    /// a map in tests).
    pub fn apply_vars<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("JPOM_BASE_URL") {
            self.base_url = normalize_base_url(&v);
        }
        if let Some(v) = lookup("JPOM_ROUTER_BASE") {
            self.router_base = v;
        }
        if let Some(v) = lookup("JPOM_API_TIMEOUT") {
            self.api_timeout_secs = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "api_timeout_secs",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("JPOM_TRANSPORT_ENCRYPTION") {
            self.transport_encryption = v.parse()?;
        }
        if let Some(v) = lookup("JPOM_WORKSPACE_ID") {
            self.workspace_id = Some(v).filter(|s| !s.is_empty());
        }
        Ok(self)
    }

    pub fn api_timeout(&self) -> Duration {
        if self.api_timeout_secs == 0 {
            DEFAULT_API_TIMEOUT
        } else {
            Duration::from_secs(self.api_timeout_secs)
        }
    }

    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }

    pub fn with_router_base(mut self, router_base: impl Into<String>) -> Self {
        self.router_base = router_base.into();
        self
    }

    pub fn with_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }

    pub fn with_transport_encryption(mut self, encryption: TransportEncryption) -> Self {
        self.transport_encryption = encryption;
        self
    }

    pub fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay_ms = delay.as_millis() as u64;
        self
    }
}

/// Normalize a server address: trims, strips trailing slashes and adds
/// `http://` when no scheme is given.
pub fn normalize_base_url(raw: &str) -> String {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    format!("http://{}", url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_timeout(), Duration::from_secs(20));
        assert_eq!(config.navigation_delay(), Duration::from_secs(2));
        assert_eq!(config.transport_encryption, TransportEncryption::None);
        assert!(config.workspace_id.is_none());
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let config = ClientConfig {
            api_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.api_timeout(), DEFAULT_API_TIMEOUT);
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("localhost:2122/"), "http://localhost:2122");
        assert_eq!(
            normalize_base_url(" https://jpom.example.com// "),
            "https://jpom.example.com"
        );
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn test_transport_encryption_parse() {
        assert_eq!(
            "base64".parse::<TransportEncryption>().unwrap(),
            TransportEncryption::Base64
        );
        assert_eq!(
            "NONE".parse::<TransportEncryption>().unwrap(),
            TransportEncryption::None
        );
        assert!("aes".parse::<TransportEncryption>().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::default()
            .apply_vars(vars(&[
                ("JPOM_BASE_URL", "jpom.local:9000"),
                ("JPOM_ROUTER_BASE", "/jpom"),
                ("JPOM_API_TIMEOUT", "45"),
                ("JPOM_TRANSPORT_ENCRYPTION", "BASE64"),
                ("JPOM_WORKSPACE_ID", "ws-1"),
            ]))
            .unwrap();

        assert_eq!(config.base_url, "http://jpom.local:9000");
        assert_eq!(config.router_base, "/jpom");
        assert_eq!(config.api_timeout(), Duration::from_secs(45));
        assert_eq!(config.transport_encryption, TransportEncryption::Base64);
        assert_eq!(config.workspace_id.as_deref(), Some("ws-1"));
    }

    #[test]
    fn test_env_bad_timeout() {
        let err = ClientConfig::default()
            .apply_vars(vars(&[("JPOM_API_TIMEOUT", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "api_timeout_secs", .. }));
    }

    #[test]
    fn test_file_roundtrip_and_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = ClientConfig::new("jpom.internal:2122")
            .with_router_base("/console")
            .with_workspace("DEFAULT")
            .with_transport_encryption(TransportEncryption::Base64);
        config.save_to(&path).unwrap();

        let loaded = ClientConfig::load_from(&path).unwrap();
        assert_eq!(loaded.base_url, "http://jpom.internal:2122");
        assert_eq!(loaded.router_base, "/console");
        assert_eq!(loaded.workspace_id.as_deref(), Some("DEFAULT"));
        assert_eq!(loaded.transport_encryption, TransportEncryption::Base64);

        std::fs::write(&path, "base_url = \"https://jpom.example.com/\"\n").unwrap();
        let partial = ClientConfig::load_from(&path).unwrap();
        assert_eq!(partial.base_url, "https://jpom.example.com");
        assert_eq!(partial.api_timeout(), DEFAULT_API_TIMEOUT);
    }
}
