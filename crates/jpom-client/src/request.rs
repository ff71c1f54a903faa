// ABOUTME: Description of one outgoing API call before it is dispatched
// ABOUTME: Method, path, query, body, timeout policy and the suppress-notification flag

use reqwest::Method;
use std::time::Duration;

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    /// `application/x-www-form-urlencoded` (the default content type)
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
    Multipart(Vec<MultipartField>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipartField {
    pub name: String,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    File { file_name: String, bytes: Vec<u8> },
}

impl MultipartField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        }
    }

    pub fn file(name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::File {
                file_name: file_name.into(),
                bytes,
            },
        }
    }
}

/// Per-request timeout policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Timeout {
    /// Use the client's configured timeout.
    #[default]
    Default,
    /// Never time out (large uploads and merges).
    Unbounded,
    After(Duration),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
    pub timeout: Timeout,
    /// Suppress the generic failure notice for this call. Sent to the server
    /// as the `tip: no` header.
    pub suppress_notify: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
            timeout: Timeout::Default,
            suppress_notify: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = Body::Form(pairs);
        self
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    pub fn multipart(mut self, fields: Vec<MultipartField>) -> Self {
        self.body = Body::Multipart(fields);
        self
    }

    pub fn timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn no_timeout(self) -> Self {
        self.timeout(Timeout::Unbounded)
    }

    pub fn silent(mut self) -> Self {
        self.suppress_notify = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let req = ApiRequest::get("/file-storage/has-file");
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.body, Body::Empty);
        assert_eq!(req.timeout, Timeout::Default);
        assert!(!req.suppress_notify);
    }

    #[test]
    fn test_builder_chain() {
        let req = ApiRequest::post("/file-storage/upload-sharding-merge")
            .form(vec![("sliceId".to_string(), "x".to_string())])
            .no_timeout()
            .silent();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.timeout, Timeout::Unbounded);
        assert!(req.suppress_notify);
        assert!(matches!(req.body, Body::Form(ref p) if p.len() == 1));
    }
}
