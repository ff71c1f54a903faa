// ABOUTME: Navigation side effects requested by the dispatcher
// ABOUTME: Login/forbidden redirects and reloads, deferred on a tokio task or thread

use std::sync::Arc;
use std::time::Duration;

/// A place the front end should move to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Back to the login page (path already includes the router base).
    Login { path: String },
    /// The "prohibit access" page.
    Forbidden { path: String },
    /// Full reload of the current page, picking up a renewed session.
    Reload,
}

/// Performs navigation. `after` is the delay the dispatcher asks for;
/// implementations decide whether to honor it.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: Navigation, after: Duration);
}

/// Runs the wrapped callback after the requested delay on a spawned tokio
/// task, or on a plain thread outside a runtime. Once scheduled, a navigation
/// cannot be cancelled.
pub struct DelayedNavigator<F> {
    action: Arc<F>,
}

impl<F> DelayedNavigator<F>
where
    F: Fn(Navigation) + Send + Sync + 'static,
{
    pub fn new(action: F) -> Self {
        Self {
            action: Arc::new(action),
        }
    }
}

impl<F> Navigator for DelayedNavigator<F>
where
    F: Fn(Navigation) + Send + Sync + 'static,
{
    fn navigate(&self, target: Navigation, after: Duration) {
        if after.is_zero() {
            (self.action)(target);
            return;
        }

        let action = Arc::clone(&self.action);
        tracing::debug!(?target, delay_ms = after.as_millis() as u64, "navigation scheduled");

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            std::thread::spawn(move || {
                std::thread::sleep(after);
                action(target);
            });
            return;
        };

        handle.spawn(async move {
            tokio::time::sleep(after).await;
            action(target);
        });
    }
}

/// Navigator that only logs. Suitable for headless use where there is no page
/// to move.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, target: Navigation, after: Duration) {
        tracing::info!(?target, delay_ms = after.as_millis() as u64, "navigation requested");
    }
}
