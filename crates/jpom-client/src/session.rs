// ABOUTME: Session token storage and the renewal in-flight guard
// ABOUTME: SessionManager owns the store handle and allows one renewal at a time

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::ConfigError;

/// Payload returned by login and renewal endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_term_token: Option<String>,
}

/// Where the session token lives. Implementations must be cheap to call;
/// the dispatcher reads the token on every request.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn store(&self, login: LoginData);
    fn clear(&self);
}

/// In-process store, used when embedding the client and in tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<LoginData>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Some(LoginData {
                token: token.into(),
                long_term_token: None,
            })),
        }
    }

    pub fn login(&self) -> Option<LoginData> {
        self.inner.read().ok().and_then(|guard| guard.clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        self.login().map(|l| l.token)
    }

    fn store(&self, login: LoginData) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(login);
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }
}

/// Store backed by a TOML file (default `~/.config/jpom/session.toml`).
/// Reads are served from memory; writes go through to disk. Disk failures are
/// logged and never fail the caller.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    cache: MemorySessionStore,
}

impl FileSessionStore {
    /// Default location of the session file.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(crate::config::ClientConfig::config_dir()?.join("session.toml"))
    }

    /// Open the store at `path`, loading any existing session.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let cache = MemorySessionStore::new();

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            let login: LoginData =
                toml::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: path.display().to_string(),
                    source,
                })?;
            if !login.token.is_empty() {
                cache.store(login);
            }
        }

        Ok(Self { path, cache })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, login: &LoginData) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.display().to_string(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(login)?;
        std::fs::write(&self.path, content).map_err(|source| ConfigError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<String> {
        self.cache.token()
    }

    fn store(&self, login: LoginData) {
        if let Err(e) = self.persist(&login) {
            tracing::warn!(error = %e, "failed to persist session");
        }
        self.cache.store(login);
    }

    fn clear(&self) {
        self.cache.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, path = %self.path.display(), "failed to remove session file"),
        }
    }
}

/// Owns the session store and the renewal in-flight state.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    renewing: AtomicBool,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            renewing: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn token(&self) -> Option<String> {
        self.store.token().filter(|t| !t.is_empty())
    }

    pub fn update(&self, login: LoginData) {
        self.store.store(login);
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    /// Mark a renewal as started. Returns false if one is already in flight.
    pub fn try_begin_renewal(&self) -> bool {
        self.renewing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Mark the in-flight renewal as finished.
    pub fn end_renewal(&self) {
        self.renewing.store(false, Ordering::Release);
    }

    pub fn is_renewing(&self) -> bool {
        self.renewing.load(Ordering::Acquire)
    }

    /// Like `try_begin_renewal`, but the returned guard ends the renewal when
    /// dropped.
    pub fn begin_renewal(&self) -> Option<RenewalGuard<'_>> {
        self.try_begin_renewal()
            .then(|| RenewalGuard { manager: self })
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("has_token", &self.token().is_some())
            .field("renewing", &self.is_renewing())
            .finish()
    }
}

/// Ends the renewal it was created for on drop.
#[must_use = "the renewal ends as soon as the guard is dropped"]
pub struct RenewalGuard<'a> {
    manager: &'a SessionManager,
}

impl Drop for RenewalGuard<'_> {
    fn drop(&mut self) {
        self.manager.end_renewal();
    }
}
