// ABOUTME: HTTP client layer for the Jpom admin console API
// ABOUTME: Dispatcher, response classifier, session renewal and per-resource wrappers

pub mod api;
pub mod classify;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod navigate;
pub mod notify;
pub mod request;
pub mod session;
pub mod transport;
pub mod urls;

pub use classify::{classify, Disposition};
pub use config::{ClientConfig, TransportEncryption};
pub use dispatch::{Dispatcher, DispatcherBuilder};
pub use envelope::Envelope;
pub use error::{ApiError, ConfigError};
pub use navigate::{DelayedNavigator, LogNavigator, Navigation, Navigator};
pub use notify::{Notice, Notifier, Severity, TracingNotifier};
pub use request::{ApiRequest, Body, MultipartField, Timeout};
pub use session::{FileSessionStore, LoginData, MemorySessionStore, SessionManager, SessionStore};
