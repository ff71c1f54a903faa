// ABOUTME: Reversible BASE64 obfuscation of outgoing payloads
// ABOUTME: Also flattens serializable params into form pairs the way the console does

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;

use crate::request::{Body, FieldValue, MultipartField};

pub fn encode_str(s: &str) -> String {
    STANDARD.encode(s.as_bytes())
}

pub fn decode_str(s: &str) -> Result<String, TransportDecodeError> {
    let bytes = STANDARD.decode(s.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Debug, thiserror::Error)]
pub enum TransportDecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode every key and value.
pub fn encode_pairs(pairs: &[(String, String)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (encode_str(k), encode_str(v)))
        .collect()
}

pub fn decode_pairs(pairs: &[(String, String)]) -> Result<Vec<(String, String)>, TransportDecodeError> {
    pairs
        .iter()
        .map(|(k, v)| Ok((decode_str(k)?, decode_str(v)?)))
        .collect()
}

/// JSON bodies are serialized first and the resulting text is encoded whole.
pub fn encode_json(value: &Value) -> Result<String, serde_json::Error> {
    Ok(encode_str(&serde_json::to_string(value)?))
}

pub fn decode_json(encoded: &str) -> Result<Value, TransportDecodeError> {
    Ok(serde_json::from_str(&decode_str(encoded)?)?)
}

/// Text fields are encoded; file parts keep their bytes and only the field
/// name changes.
pub fn encode_multipart(fields: Vec<MultipartField>) -> Vec<MultipartField> {
    fields
        .into_iter()
        .map(|field| MultipartField {
            name: encode_str(&field.name),
            value: match field.value {
                FieldValue::Text(text) => FieldValue::Text(encode_str(&text)),
                file @ FieldValue::File { .. } => file,
            },
        })
        .collect()
}

/// Apply BASE64 obfuscation to a request body.
pub fn encode_body(body: Body) -> Result<Body, serde_json::Error> {
    Ok(match body {
        Body::Empty => Body::Empty,
        Body::Form(pairs) => Body::Form(encode_pairs(&pairs)),
        Body::Json(value) => Body::Json(Value::String(encode_json(&value)?)),
        Body::Multipart(fields) => Body::Multipart(encode_multipart(fields)),
    })
}

/// Flatten a serializable value into form pairs. Only top-level scalar fields
/// are kept; nulls, arrays and nested objects are dropped.
pub fn to_form_pairs<T: Serialize + ?Sized>(params: &T) -> Result<Vec<(String, String)>, serde_json::Error> {
    let value = serde_json::to_value(params)?;
    let Value::Object(map) = value else {
        return Ok(Vec::new());
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| scalar_to_string(&value).map(|v| (key, v)))
        .collect())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
