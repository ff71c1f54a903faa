// ABOUTME: Request dispatcher: headers, payload encoding, transport errors, envelope handling
// ABOUTME: Applies the classifier's disposition, including the single-flight session renewal

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::classify::{classify, Disposition, LoginReason};
use crate::config::{ClientConfig, TransportEncryption};
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::navigate::{LogNavigator, Navigation, Navigator};
use crate::notify::{Notice, Notifier, Severity, TracingNotifier};
use crate::request::{ApiRequest, Body, FieldValue, Timeout};
use crate::session::{LoginData, MemorySessionStore, SessionManager, SessionStore};
use crate::transport;
use crate::urls::{self, WORKSPACE_ID_KEY};

/// Header carrying the raw session token.
pub const TOKEN_HEADER: &str = "Authorization";
/// Header marking a request whose failures must not be surfaced.
pub const NO_NOTIFY_HEADER: &str = "tip";
pub const NO_NOTIFY_VALUE: &str = "no";

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

pub const RENEWAL_PATH: &str = "/renewal";
pub const LOGIN_PAGE: &str = "/login";
pub const FORBIDDEN_PAGE: &str = "/prohibit-access";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wraps every call to the Jpom server.
pub struct Dispatcher {
    http: reqwest::Client,
    config: ClientConfig,
    session: SessionManager,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl Dispatcher {
    pub fn builder(config: ClientConfig) -> DispatcherBuilder {
        DispatcherBuilder {
            config,
            store: None,
            notifier: None,
            navigator: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Send `req` and return the envelope payload, or the classified failure.
    pub async fn request<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ApiError> {
        let envelope = self.fetch(&req).await?;
        self.handle_envelope(&req, envelope).await
    }

    /// Transport half: build, send, surface network and HTTP status errors,
    /// decode the envelope. No classification.
    async fn fetch(&self, req: &ApiRequest) -> Result<Envelope, ApiError> {
        let request = self.build(req)?;
        let url = request.url().to_string();
        debug!(method = %req.method, url = %url, "dispatching request");

        let response = match self.http.execute(request).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(url = %url, error = %e, "request produced no response");
                self.notifier.notify(
                    Notice::new(
                        Severity::Error,
                        "Network Error No response",
                        format!("Network error, please retry: {e}"),
                    )
                    .with_key("network-error-no-response"),
                );
                return Err(ApiError::Network(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "server returned error status");
            if !req.suppress_notify {
                self.notifier.notify(
                    Notice::new(
                        Severity::Error,
                        format!("Status code error {}", status.as_u16()),
                        format!("{}{}", status.canonical_reason().unwrap_or_default(), body),
                    )
                    .with_key(format!("network-error-status-{}", status.as_u16())),
                );
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Envelope::from_slice(&bytes).map_err(|e| {
            warn!(url = %url, error = %e, "response is not a valid envelope");
            ApiError::InvalidResponse(e.to_string())
        })
    }

    fn build(&self, req: &ApiRequest) -> Result<reqwest::Request, ApiError> {
        let url = urls::api_url(&self.config, &req.path);
        let encode = self.config.transport_encryption == TransportEncryption::Base64;

        let mut builder = self.http.request(req.method.clone(), &url);

        if let Some(token) = self.session.token() {
            builder = builder.header(TOKEN_HEADER, token);
        }
        if let Some(ref workspace) = self.config.workspace_id {
            builder = builder.header(WORKSPACE_ID_KEY, workspace);
        }
        if req.suppress_notify {
            builder = builder.header(NO_NOTIFY_HEADER, NO_NOTIFY_VALUE);
        }

        match req.timeout {
            Timeout::Default => builder = builder.timeout(self.config.api_timeout()),
            Timeout::After(d) => builder = builder.timeout(d),
            Timeout::Unbounded => {}
        }

        if !req.query.is_empty() {
            let query = if encode {
                transport::encode_pairs(&req.query)
            } else {
                req.query.clone()
            };
            builder = builder.query(&query);
        }

        let body = if encode {
            transport::encode_body(req.body.clone())
                .map_err(|e| ApiError::InvalidRequest(format!("failed to encode body: {e}")))?
        } else {
            req.body.clone()
        };

        builder = match body {
            Body::Empty => builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE),
            Body::Form(pairs) => {
                let mut encoded = url::form_urlencoded::Serializer::new(String::new());
                for (k, v) in &pairs {
                    encoded.append_pair(k, v);
                }
                builder
                    .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                    .body(encoded.finish())
            }
            Body::Json(value) => builder.json(&value),
            Body::Multipart(fields) => {
                let mut form = multipart::Form::new();
                for field in fields {
                    form = match field.value {
                        FieldValue::Text(text) => form.text(field.name, text),
                        FieldValue::File { file_name, bytes } => {
                            form.part(field.name, multipart::Part::bytes(bytes).file_name(file_name))
                        }
                    };
                }
                builder.multipart(form)
            }
        };

        Ok(builder.build()?)
    }

    async fn handle_envelope<T: DeserializeOwned>(
        &self,
        req: &ApiRequest,
        envelope: Envelope,
    ) -> Result<T, ApiError> {
        match classify(envelope.code) {
            Disposition::PassThrough => Ok(envelope.into_data()?),
            Disposition::ForceLogin(reason) => {
                self.to_login(req, &envelope);
                let msg = envelope.msg;
                Err(match reason {
                    LoginReason::SessionInvalid => ApiError::SessionInvalid { msg },
                    LoginReason::AccountDisabled => ApiError::AccountDisabled { msg },
                })
            }
            Disposition::Renew => {
                let renewed = self.renew_session().await;
                Err(ApiError::SessionExpiring {
                    msg: envelope.msg,
                    renewed,
                })
            }
            Disposition::BlockAccess => {
                self.notifier.notify(
                    Notice::new(
                        Severity::Error,
                        "Access forbidden",
                        "Access from the current IP is restricted",
                    )
                    .with_key("prohibit-access"),
                );
                self.navigator.navigate(
                    Navigation::Forbidden {
                        path: urls::routed_path(&self.config.router_base, FORBIDDEN_PAGE),
                    },
                    Duration::ZERO,
                );
                Err(ApiError::Forbidden { msg: envelope.msg })
            }
            Disposition::Fail => {
                if !req.suppress_notify {
                    self.notifier.notify(Notice::new(
                        Severity::Error,
                        self.notice_title(req),
                        envelope.msg.clone(),
                    ));
                    error!(path = %req.path, code = envelope.code, msg = %envelope.msg, "request failed");
                }
                Err(ApiError::Rejected {
                    code: envelope.code,
                    msg: envelope.msg,
                })
            }
        }
    }

    fn notice_title(&self, req: &ApiRequest) -> String {
        if self.config.show_request_url {
            format!("Notice {}", req.path)
        } else {
            "Notice".to_string()
        }
    }

    fn to_login(&self, req: &ApiRequest, envelope: &Envelope) {
        warn!(path = %req.path, code = envelope.code, "session rejected, redirecting to login");
        self.notifier.notify(
            Notice::new(Severity::Warning, self.notice_title(req), envelope.msg.clone())
                .with_key("to-login"),
        );
        self.session.clear();
        self.navigator.navigate(
            Navigation::Login {
                path: urls::routed_path(&self.config.router_base, LOGIN_PAGE),
            },
            self.config.navigation_delay(),
        );
    }

    /// Attempt a silent renewal. Returns true when the session was renewed.
    /// Concurrent callers get false without touching the renewal endpoint.
    async fn renew_session(&self) -> bool {
        let Some(_guard) = self.session.begin_renewal() else {
            debug!("renewal already in flight");
            return false;
        };

        self.notifier.notify(
            Notice::new(
                Severity::Info,
                "Login expired",
                "Trying to renew the session automatically...",
            )
            .with_key("login-timeout"),
        );

        match self.fetch_renewal().await {
            Ok(login) => {
                self.session.update(login);
                let delay = self.config.navigation_delay();
                info!(reload_in_ms = delay.as_millis() as u64, "session renewed");
                self.notifier.notify(Notice::new(
                    Severity::Success,
                    "Notice",
                    format!(
                        "Session renewed, the page will reload in {} seconds",
                        delay.as_secs()
                    ),
                ));
                self.navigator.navigate(Navigation::Reload, delay);
                true
            }
            Err(e) => {
                warn!(error = %e, "session renewal failed");
                false
            }
        }
    }

    async fn fetch_renewal(&self) -> Result<LoginData, ApiError> {
        let req = ApiRequest::post(RENEWAL_PATH).silent();
        let envelope = self.fetch(&req).await?;
        if !envelope.is_success() {
            return Err(ApiError::Rejected {
                code: envelope.code,
                msg: envelope.msg,
            });
        }
        Ok(envelope.into_data()?)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Dispatcher`]. Unset collaborators default to an in-memory
/// session store, a tracing notifier and a logging navigator.
pub struct DispatcherBuilder {
    config: ClientConfig,
    store: Option<Arc<dyn SessionStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl DispatcherBuilder {
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn build(self) -> Result<Dispatcher, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to create HTTP client: {e}")))?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()));

        Ok(Dispatcher {
            http,
            config: self.config,
            session: SessionManager::new(store),
            notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            navigator: self.navigator.unwrap_or_else(|| Arc::new(LogNavigator)),
        })
    }
}
