// ABOUTME: User-facing notifications raised by the dispatcher
// ABOUTME: Notifier is the sink trait; TracingNotifier routes notices into tracing

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// A single notification. `key` deduplicates notices that a UI would
/// otherwise stack (e.g. repeated network errors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub key: Option<String>,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity,
            key: None,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Displays notices to the user. Must not panic; failures are swallowed.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Default sink: emits every notice as a tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let key = notice.key.as_deref().unwrap_or("-");
        match notice.severity {
            Severity::Info | Severity::Success => {
                tracing::info!(key, severity = %notice.severity, "{}: {}", notice.title, notice.description)
            }
            Severity::Warning => {
                tracing::warn!(key, "{}: {}", notice.title, notice.description)
            }
            Severity::Error => {
                tracing::error!(key, "{}: {}", notice.title, notice.description)
            }
        }
    }
}
