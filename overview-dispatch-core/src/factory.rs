//! Store factory: isolated stores built from a cloned baseline snapshot
//!
//! Every test (and every app start) gets its own store. The factory clones
//! the baseline it is given, so actions dispatched to one store can never
//! reach the fixture another store is built from.
//!
//! ```ignore
//! let baseline = mock_global_state();
//! let deps = StoreDeps::new(Arc::new(MemoryStorage::new()));
//! let instance = create_store(&baseline, reducer, NoopMiddleware, deps);
//! let mut runtime = EffectRuntime::from_instance(instance, handle_effect);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::action::Action;
use crate::effect::{EffectReducer, EffectStoreWithMiddleware};
use crate::query::Transport;
use crate::storage::{MemoryStorage, Storage};
use crate::store::Middleware;

/// Errors raised while building a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The baseline snapshot could not be read.
    #[error("malformed state snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// A value that can be read, replaced and watched.
///
/// Thin wrapper over a `tokio::sync::watch` channel; clones share the value.
pub struct Observable<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self { tx: Arc::new(tx) }
    }

    /// Current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.tx.borrow().clone()
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

/// UI settings as a JSON map (`securitySolution:defaultIndex` and friends).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UiSettings(Map<String, Value>);

impl UiSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Typed lookup; `None` when missing or of the wrong shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.0.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed UI setting");
                None
            }
        }
    }
}

/// Collaborators injected into every store.
#[derive(Clone)]
pub struct StoreDeps {
    /// Query client; `None` means queries stay pending
    pub client: Observable<Option<Arc<dyn Transport>>>,
    /// UI settings channel
    pub settings: Observable<UiSettings>,
    pub storage: Arc<dyn Storage>,
}

impl StoreDeps {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            client: Observable::new(None),
            settings: Observable::new(UiSettings::default()),
            storage,
        }
    }

    pub fn with_client(self, client: Arc<dyn Transport>) -> Self {
        self.client.set(Some(client));
        self
    }

    pub fn with_settings(self, settings: UiSettings) -> Self {
        self.settings.set(settings);
        self
    }

    /// The query client currently installed, if any.
    pub fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.client.get()
    }
}

impl Default for StoreDeps {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }
}

impl fmt::Debug for StoreDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreDeps")
            .field("has_client", &self.client.get().is_some())
            .field("settings", &self.settings.get())
            .field("storage", &self.storage)
            .finish()
    }
}

/// A freshly built store plus its collaborators.
pub struct StoreInstance<S, A, E, M>
where
    A: Action,
    M: Middleware<A>,
{
    pub store: EffectStoreWithMiddleware<S, A, E, M>,
    pub deps: StoreDeps,
}

/// Build a store from a clone of `baseline`.
///
/// The caller's `baseline` is never mutated by the returned store.
pub fn create_store<S, A, E, M>(
    baseline: &S,
    reducer: EffectReducer<S, A, E>,
    middleware: M,
    deps: StoreDeps,
) -> StoreInstance<S, A, E, M>
where
    S: Clone,
    A: Action,
    M: Middleware<A>,
{
    tracing::debug!(?deps, "Creating store from baseline snapshot");
    StoreInstance {
        store: EffectStoreWithMiddleware::new(baseline.clone(), reducer, middleware),
        deps,
    }
}

/// Build a store from a JSON snapshot.
///
/// A malformed snapshot is a setup error and is returned as [`StoreError`].
pub fn create_store_from_json<S, A, E, M>(
    snapshot: &str,
    reducer: EffectReducer<S, A, E>,
    middleware: M,
    deps: StoreDeps,
) -> Result<StoreInstance<S, A, E, M>, StoreError>
where
    S: DeserializeOwned,
    A: Action,
    M: Middleware<A>,
{
    let state: S = serde_json::from_str(snapshot)?;
    Ok(StoreInstance {
        store: EffectStoreWithMiddleware::new(state, reducer, middleware),
        deps,
    })
}
