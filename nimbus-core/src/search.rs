//! Place search with debouncing and a persisted recency list.
//!
//! Every call to [`LocationSearch::search`] takes a request number. A call
//! only surfaces its results while it is still the newest request, both
//! after the debounce wait and when its response arrives, so a slow
//! response for older input never replaces results for newer input.

use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use crate::{
    error::StoreError,
    model::{Coordinate, NamedLocation},
    provider::{WeatherProvider, is_searchable},
    recent::RecentLocations,
    store::KeyValueStore,
};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub struct LocationSearch {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<dyn KeyValueStore>,
    debounce: Duration,
    latest_request: AtomicU64,
    results: Mutex<Vec<NamedLocation>>,
    recents: Mutex<RecentLocations>,
}

impl LocationSearch {
    /// Loads the recency list from `store`.
    pub fn new(provider: Arc<dyn WeatherProvider>, store: Arc<dyn KeyValueStore>) -> Self {
        let recents = RecentLocations::load(store.as_ref());
        Self {
            provider,
            store,
            debounce: SEARCH_DEBOUNCE,
            latest_request: AtomicU64::new(0),
            results: Mutex::new(Vec::new()),
            recents: Mutex::new(recents),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Debounced search. Returns `None` when a newer call superseded this
    /// one; otherwise the results that are now visible in [`results`].
    ///
    /// Failures are logged and surface as an empty list.
    ///
    /// [`results`]: LocationSearch::results
    pub async fn search(&self, text: &str) -> Option<Vec<NamedLocation>> {
        let request = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;
        if self.is_superseded(request) {
            tracing::debug!(request, text, "search input superseded during debounce");
            return None;
        }

        let found = if is_searchable(text) {
            match self.provider.search_places(text).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(text, "Search failed: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let mut results = self.results.lock();
        if self.is_superseded(request) {
            tracing::debug!(request, text, "dropping results for superseded search");
            return None;
        }
        *results = found.clone();
        Some(found)
    }

    fn is_superseded(&self, request: u64) -> bool {
        self.latest_request.load(Ordering::SeqCst) != request
    }

    /// Results of the newest completed search.
    pub fn results(&self) -> Vec<NamedLocation> {
        self.results.lock().clone()
    }

    pub fn recents(&self) -> Vec<NamedLocation> {
        self.recents.lock().to_vec()
    }

    pub fn recent(&self, id: u64) -> Option<NamedLocation> {
        self.recents.lock().get(id).cloned()
    }

    /// Put `location` at the front of the recency list and persist it.
    pub fn record_selection(
        &self,
        location: NamedLocation,
    ) -> Result<Vec<NamedLocation>, StoreError> {
        self.update_recents(|recents| recents.record(location))
    }

    pub fn remove_from_recents(&self, id: u64) -> Result<Vec<NamedLocation>, StoreError> {
        self.update_recents(|recents| recents.remove(id))
    }

    /// Apply `change` to a copy of the list and keep it only if it was saved.
    fn update_recents(
        &self,
        change: impl FnOnce(&mut RecentLocations),
    ) -> Result<Vec<NamedLocation>, StoreError> {
        let mut recents = self.recents.lock();
        let mut updated = recents.clone();
        change(&mut updated);

        updated.save(self.store.as_ref())?;
        *recents = updated;
        Ok(recents.to_vec())
    }

    /// Choose a place: clears the visible results, drops pending searches,
    /// records the selection, and returns the coordinate to load.
    pub fn select(&self, location: NamedLocation) -> Result<Coordinate, StoreError> {
        self.latest_request.fetch_add(1, Ordering::SeqCst);
        self.results.lock().clear();

        let coord = location.coordinate();
        tracing::info!(name = %location.name, %coord, "location selected");
        self.record_selection(location)?;
        Ok(coord)
    }
}
