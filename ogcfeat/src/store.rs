//! Feature store seam.
//!
//! The loader never owns the spatial store; it reports into this minimal
//! interface. Rendering-side stores implement it to insert features into
//! their spatial index and drive their loading-state bookkeeping.

use parking_lot::Mutex;

use crate::extent::Extent;

/// Minimal interface to the consuming feature store.
///
/// During one load session the loader is the store's only writer (guaranteed
/// by cancel-before-start), and it treats the store as append-only:
/// [`add_features`](FeatureStore::add_features) may be invoked several times
/// per load as pages stream in.
pub trait FeatureStore<F>: Send + Sync {
    /// Streamed delivery of one fetched page's features.
    ///
    /// Called once per page, in completion order; each page is atomic.
    fn add_features(&self, features: &[F]);

    /// The load completed; `features` is the complete collection for the
    /// extent (the same features already streamed, in server offset order).
    fn loaded(&self, extent: &Extent, features: &[F]);

    /// The load failed with a genuine error.
    ///
    /// Previously added features stay in place; there is no rollback.
    fn failed(&self, extent: &Extent);

    /// The load was superseded; forget the extent so a later viewport event
    /// retries it. Not a user-visible failure.
    fn unmark_loaded(&self, extent: &Extent);

    /// Fired after every load, success or failure, so loading-state UIs
    /// never get stuck on an aborted loader callback.
    fn changed(&self);
}

/// In-memory [`FeatureStore`] collecting everything it is told.
///
/// Used by the CLI and by integration tests; also a reference for what a
/// real store implementation has to handle.
#[derive(Debug, Default)]
pub struct CollectingStore<F> {
    features: Mutex<Vec<F>>,
    outcomes: Mutex<Vec<StoreEvent>>,
}

/// Store lifecycle events recorded by [`CollectingStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Loaded,
    Failed,
    Unmarked,
    Changed,
}

impl<F> CollectingStore<F> {
    pub fn new() -> Self {
        Self {
            features: Mutex::new(Vec::new()),
            outcomes: Mutex::new(Vec::new()),
        }
    }

    /// All features streamed so far, in delivery order.
    pub fn features(&self) -> Vec<F>
    where
        F: Clone,
    {
        self.features.lock().clone()
    }

    pub fn feature_count(&self) -> usize {
        self.features.lock().len()
    }

    /// Lifecycle events in the order they were reported.
    pub fn events(&self) -> Vec<StoreEvent> {
        self.outcomes.lock().clone()
    }
}

impl<F: Clone + Send + Sync> FeatureStore<F> for CollectingStore<F> {
    fn add_features(&self, features: &[F]) {
        self.features.lock().extend_from_slice(features);
    }

    fn loaded(&self, _extent: &Extent, _features: &[F]) {
        self.outcomes.lock().push(StoreEvent::Loaded);
    }

    fn failed(&self, _extent: &Extent) {
        self.outcomes.lock().push(StoreEvent::Failed);
    }

    fn unmark_loaded(&self, _extent: &Extent) {
        self.outcomes.lock().push(StoreEvent::Unmarked);
    }

    fn changed(&self) {
        self.outcomes.lock().push(StoreEvent::Changed);
    }
}
