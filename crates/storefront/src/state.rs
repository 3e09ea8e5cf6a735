//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::api::ApiClient;
use crate::cache::KeyValueCache;
use crate::config::StorefrontConfig;
use crate::stores::SessionStore;
use crate::view::ViewController;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. There is exactly one [`ViewController`]; the
/// mutex makes every event run to completion before the next one starts,
/// including across backend calls.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    view: Mutex<ViewController>,
}

impl AppState {
    /// Create the state, restoring any cached session from `cache`.
    #[must_use]
    pub fn new(config: StorefrontConfig, cache: Arc<dyn KeyValueCache>) -> Self {
        let api = ApiClient::new(&config.api);
        let session = SessionStore::restore(cache);
        let view = ViewController::new(api, session, config.api.checkout_delay);

        Self::from_parts(config, view)
    }

    /// Wrap an already-built controller.
    #[must_use]
    pub fn from_parts(config: StorefrontConfig, view: ViewController) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                view: Mutex::new(view),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Lock the view controller for one event.
    pub async fn view(&self) -> MutexGuard<'_, ViewController> {
        self.inner.view.lock().await
    }
}
