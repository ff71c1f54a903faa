// ABOUTME: URL assembly for API calls, browser downloads and websocket endpoints
// ABOUTME: Joins base URL and router base, collapsing duplicate slashes in the path

use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Header (and query key) carrying the selected workspace.
pub const WORKSPACE_ID_KEY: &str = "workspaceId";

/// Collapse every run of `/` into a single slash.
pub fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !prev_slash {
                out.push(c);
            }
            prev_slash = true;
        } else {
            out.push(c);
            prev_slash = false;
        }
    }
    out
}

/// `router_base + path`, always starting with a single slash.
pub fn routed_path(router_base: &str, path: &str) -> String {
    collapse_slashes(&format!("/{}/{}", router_base, path))
}

/// Absolute URL for an API path.
pub fn api_url(config: &ClientConfig, path: &str) -> String {
    format!("{}{}", config.base_url, routed_path(&config.router_base, path))
}

/// URL for a direct (non-XHR) download: the routed path plus `params`, with
/// the configured workspace appended.
pub fn download_url(config: &ClientConfig, path: &str, params: &[(String, String)]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in params {
        query.append_pair(k, v);
    }
    query.append_pair(
        WORKSPACE_ID_KEY,
        config.workspace_id.as_deref().unwrap_or_default(),
    );
    format!("{}?{}", api_url(config, path), query.finish())
}

/// Websocket endpoint on the same host as the API. `wss` when the base URL is
/// https, `ws` otherwise. `query` is appended verbatim.
pub fn websocket_url(config: &ClientConfig, path: &str, query: &str) -> Result<String, ApiError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ApiError::InvalidRequest(format!("invalid base url {}: {e}", config.base_url)))?;
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    let host = base
        .host_str()
        .ok_or_else(|| ApiError::InvalidRequest(format!("base url has no host: {}", config.base_url)))?;
    let authority = match base.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    // Base URLs may carry a path of their own (reverse proxies).
    let full_path = collapse_slashes(&format!(
        "{}/{}",
        base.path(),
        routed_path(&config.router_base, path)
    ));
    Ok(format!("{scheme}://{authority}{full_path}?{query}"))
}
