// ABOUTME: Error types for jpom-client
// ABOUTME: Every rejected call surfaces as an ApiError, config problems as ConfigError

use thiserror::Error;

/// Errors returned by dispatched API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx HTTP status.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a valid envelope.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be built (bad URL, unserializable params).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Envelope code 800: the session is no longer valid.
    #[error("session invalid: {msg}")]
    SessionInvalid { msg: String },

    /// Envelope code 801: the session is expiring. The rejected call is never
    /// replayed; `renewed` tells the caller whether a retry is worthwhile.
    #[error("session expiring (renewed: {renewed}): {msg}")]
    SessionExpiring { msg: String, renewed: bool },

    /// Envelope code 802: the account has been disabled.
    #[error("account disabled: {msg}")]
    AccountDisabled { msg: String },

    /// Envelope code 999: this client is not allowed to access the server.
    #[error("access forbidden: {msg}")]
    Forbidden { msg: String },

    /// Any other non-200 envelope code.
    #[error("request failed with code {code}: {msg}")]
    Rejected { code: i32, msg: String },

    /// Local I/O while preparing a request (reading an upload, for example).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Envelope code carried by this error, if it came from the classifier.
    pub fn code(&self) -> Option<i32> {
        match self {
            ApiError::SessionInvalid { .. } => Some(crate::envelope::CODE_SESSION_INVALID),
            ApiError::SessionExpiring { .. } => Some(crate::envelope::CODE_SESSION_EXPIRING),
            ApiError::AccountDisabled { .. } => Some(crate::envelope::CODE_ACCOUNT_DISABLED),
            ApiError::Forbidden { .. } => Some(crate::envelope::CODE_FORBIDDEN),
            ApiError::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when the caller has to log in again before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ApiError::SessionInvalid { .. } | ApiError::AccountDisabled { .. }
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidResponse(err.to_string())
    }
}

/// Errors raised while loading or saving configuration and session files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}
