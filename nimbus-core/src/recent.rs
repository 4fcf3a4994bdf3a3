use crate::{
    error::StoreError,
    model::NamedLocation,
    store::KeyValueStore,
};

pub const RECENTS_KEY: &str = "weather-saved-locations";
pub const MAX_RECENTS: usize = 5;

/// Recently selected places: newest first, unique by id, at most
/// [`MAX_RECENTS`] entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentLocations {
    entries: Vec<NamedLocation>,
}

impl RecentLocations {
    /// Read the list from the store. A malformed stored value is logged and
    /// treated as an empty list.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(raw) = store.get(RECENTS_KEY) else {
            return Self::default();
        };

        match serde_json::from_str::<Vec<NamedLocation>>(&raw) {
            Ok(entries) => {
                let mut recents = Self::default();
                // Oldest first so the stored order survives re-recording.
                for location in entries.into_iter().rev() {
                    recents.record(location);
                }
                recents
            }
            Err(e) => {
                tracing::warn!("Failed to parse saved locations: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.entries)?;
        store.set(RECENTS_KEY, &json)
    }

    pub fn record(&mut self, location: NamedLocation) {
        self.entries.retain(|saved| saved.id != location.id);
        self.entries.insert(0, location);
        self.entries.truncate(MAX_RECENTS);
    }

    pub fn remove(&mut self, id: u64) {
        self.entries.retain(|saved| saved.id != id);
    }

    pub fn get(&self, id: u64) -> Option<&NamedLocation> {
        self.entries.iter().find(|saved| saved.id == id)
    }

    pub fn as_slice(&self) -> &[NamedLocation] {
        &self.entries
    }

    pub fn to_vec(&self) -> Vec<NamedLocation> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
