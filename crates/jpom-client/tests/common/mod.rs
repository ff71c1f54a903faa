// ABOUTME: Shared fixtures for jpom-client integration tests
// ABOUTME: Recording notifier/navigator and a session store that counts clears

#![allow(dead_code)]

use jpom_client::{
    ClientConfig, Dispatcher, LoginData, MemorySessionStore, Navigation, Navigator, Notice,
    Notifier, SessionStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<Option<String>> {
        self.all().into_iter().map(|n| n.key).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub calls: Mutex<Vec<(Navigation, Duration)>>,
}

impl RecordingNavigator {
    pub fn all(&self) -> Vec<(Navigation, Duration)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: Navigation, after: Duration) {
        self.calls.lock().unwrap().push((target, after));
    }
}

#[derive(Default)]
pub struct CountingStore {
    inner: MemorySessionStore,
    pub clears: AtomicUsize,
    pub stores: AtomicUsize,
}

impl CountingStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            inner: MemorySessionStore::with_token(token),
            ..Self::default()
        }
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }
}

impl SessionStore for CountingStore {
    fn token(&self) -> Option<String> {
        self.inner.token()
    }

    fn store(&self, login: LoginData) {
        self.stores.fetch_add(1, Ordering::SeqCst);
        self.inner.store(login);
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear();
    }
}

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub store: Arc<CountingStore>,
}

pub fn harness(config: ClientConfig) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let store = Arc::new(CountingStore::with_token("old-token"));

    let dispatcher = Dispatcher::builder(config)
        .session_store(store.clone())
        .notifier(notifier.clone())
        .navigator(navigator.clone())
        .build()
        .unwrap();

    Harness {
        dispatcher,
        notifier,
        navigator,
        store,
    }
}
