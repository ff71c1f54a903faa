// ABOUTME: The {code, msg, data} envelope every Jpom endpoint answers with
// ABOUTME: Also defines the result codes the classifier dispatches on

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const CODE_SUCCESS: i32 = 200;
pub const CODE_SESSION_INVALID: i32 = 800;
pub const CODE_SESSION_EXPIRING: i32 = 801;
pub const CODE_ACCOUNT_DISABLED: i32 = 802;
pub const CODE_FORBIDDEN: i32 = 999;

/// Wire-level result of every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    pub code: i32,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }
}

impl Envelope<serde_json::Value> {
    /// Parse a raw response body.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Convert the untyped payload into `T`. A missing `data` field is fed to
    /// `T` as JSON `null`, so `()` and `Option<_>` payloads work.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.unwrap_or(serde_json::Value::Null))
    }
}
