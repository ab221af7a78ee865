//! Favorites: saved identifications, keyed by scientific name.
//!
//! The store owns an in-memory collection and an injected `StorageBackend`.
//! Every mutation rewrites the whole collection under two keys:
//! - `natureid-favorites`        JSON array of results, insertion order
//! - `natureid-favorite-images`  JSON object, scientific name → image data URI
//!
//! A missing or unreadable blob at load time means "no favorites yet".
//! There is no cross-process coordination: the last writer wins.

pub mod backend;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};

use crate::error::StorageError;
use crate::llm::IdentificationResult;
use std::collections::HashMap;

pub const FAVORITES_KEY: &str = "natureid-favorites";
pub const FAVORITE_IMAGES_KEY: &str = "natureid-favorite-images";

/// One saved species with the photo it was identified from.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteEntry {
    pub result: IdentificationResult,
    pub image: Option<String>,
}

impl FavoriteEntry {
    pub fn key(&self) -> &str {
        &self.result.scientific_name
    }
}

/// The persisted state: ordered results plus the image map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesCollection {
    entries: Vec<IdentificationResult>,
    images: HashMap<String, String>,
}

impl FavoritesCollection {
    /// Serialize to the two blobs written on every mutation.
    pub fn to_blobs(&self) -> Result<(String, String), StorageError> {
        Ok((
            serde_json::to_string(&self.entries)?,
            serde_json::to_string(&self.images)?,
        ))
    }

    /// Rebuild from persisted blobs. Missing blobs mean empty.
    pub fn from_blobs(
        entries: Option<&str>,
        images: Option<&str>,
    ) -> Result<Self, serde_json::Error> {
        let entries = match entries {
            Some(raw) => serde_json::from_str(raw)?,
            None => Vec::new(),
        };
        let images = match images {
            Some(raw) => serde_json::from_str(raw)?,
            None => HashMap::new(),
        };
        Ok(Self { entries, images })
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.scientific_name == key)
    }
}

pub struct FavoritesStore<B: StorageBackend> {
    backend: B,
    collection: FavoritesCollection,
}

impl<B: StorageBackend> FavoritesStore<B> {
    /// Load favorites from `backend`, tolerating missing or malformed data.
    pub fn load(backend: B) -> Self {
        let collection = match Self::read_collection(&backend) {
            Ok(collection) => {
                log::info!(
                    "[FAVORITES] Loaded {} favorites",
                    collection.entries.len()
                );
                collection
            }
            Err(reason) => {
                log::warn!(
                    "[FAVORITES] Failed to read favorites ({}), starting empty",
                    reason
                );
                FavoritesCollection::default()
            }
        };
        Self {
            backend,
            collection,
        }
    }

    fn read_collection(backend: &B) -> Result<FavoritesCollection, String> {
        let entries = backend.read(FAVORITES_KEY).map_err(|e| e.to_string())?;
        let images = backend
            .read(FAVORITE_IMAGES_KEY)
            .map_err(|e| e.to_string())?;
        FavoritesCollection::from_blobs(entries.as_deref(), images.as_deref())
            .map_err(|e| e.to_string())
    }

    /// Write `next` under both keys, then adopt it as the in-memory state.
    ///
    /// On failure memory keeps the previous collection. If the images write
    /// fails after the entries write succeeded, the previous entries blob is
    /// written back so the two keys stay consistent.
    fn commit(&mut self, next: FavoritesCollection) -> Result<(), StorageError> {
        let (entries, images) = next.to_blobs()?;
        let (previous_entries, _) = self.collection.to_blobs()?;

        self.backend.write(FAVORITES_KEY, &entries)?;
        if let Err(e) = self.backend.write(FAVORITE_IMAGES_KEY, &images) {
            if let Err(restore) = self.backend.write(FAVORITES_KEY, &previous_entries) {
                log::error!("[FAVORITES] Could not restore previous favorites: {}", restore);
            }
            return Err(e);
        }

        self.collection = next;
        log::info!(
            "[FAVORITES] Saved {} favorites",
            self.collection.entries.len()
        );
        Ok(())
    }

    /// Insert or replace by scientific name, then persist.
    ///
    /// A replaced entry keeps its position in the list.
    pub fn add(&mut self, result: IdentificationResult, image: String) -> Result<(), StorageError> {
        let mut next = self.collection.clone();
        let key = result.scientific_name.clone();
        match next.position(&key) {
            Some(idx) => next.entries[idx] = result,
            None => next.entries.push(result),
        }
        next.images.insert(key, image);
        self.commit(next)
    }

    /// Remove by scientific name, then persist. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        let mut next = self.collection.clone();
        let removed_entry = match next.position(key) {
            Some(idx) => {
                next.entries.remove(idx);
                true
            }
            None => false,
        };
        let removed_image = next.images.remove(key).is_some();
        self.commit(next)?;
        Ok(removed_entry || removed_image)
    }

    /// Entries in insertion order.
    pub fn list(&self) -> Vec<FavoriteEntry> {
        self.collection
            .entries
            .iter()
            .map(|result| FavoriteEntry {
                result: result.clone(),
                image: self.collection.images.get(&result.scientific_name).cloned(),
            })
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<FavoriteEntry> {
        let idx = self.collection.position(key)?;
        Some(FavoriteEntry {
            result: self.collection.entries[idx].clone(),
            image: self.image_for(key).map(str::to_string),
        })
    }

    pub fn image_for(&self, key: &str) -> Option<&str> {
        self.collection.images.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.collection.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.collection.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.entries.is_empty()
    }

    pub fn collection(&self) -> &FavoritesCollection {
        &self.collection
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::schema::fixtures::oak;

    const IMG: &str = "data:image/png;base64,AAAA";
    const IMG2: &str = "data:image/png;base64,BBBB";

    fn store() -> FavoritesStore<MemoryBackend> {
        FavoritesStore::load(MemoryBackend::new())
    }

    #[test]
    fn add_same_species_twice_keeps_one_latest() {
        let mut s = store();
        s.add(oak(), IMG.into()).unwrap();
        let mut updated = oak();
        updated.common_name = "Pedunculate oak".into();
        s.add(updated, IMG2.into()).unwrap();

        assert_eq!(s.len(), 1);
        let entry = s.get("Quercus robur").unwrap();
        assert_eq!(entry.result.common_name, "Pedunculate oak");
        assert_eq!(entry.image.as_deref(), Some(IMG2));
    }

    #[test]
    fn replace_keeps_position() {
        let mut s = store();
        let mut birch = oak();
        birch.scientific_name = "Betula pendula".into();
        s.add(oak(), IMG.into()).unwrap();
        s.add(birch, IMG.into()).unwrap();
        s.add(oak(), IMG2.into()).unwrap();

        let keys: Vec<String> = s.list().iter().map(|e| e.key().to_string()).collect();
        assert_eq!(keys, vec!["Quercus robur", "Betula pendula"]);
    }

    #[test]
    fn remove_clears_entry_and_image() {
        let mut s = store();
        s.add(oak(), IMG.into()).unwrap();
        assert!(s.remove("Quercus robur").unwrap());

        assert!(!s.contains("Quercus robur"));
        assert!(s.image_for("Quercus robur").is_none());
        assert!(s.list().is_empty());
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let mut s = store();
        s.add(oak(), IMG.into()).unwrap();
        assert!(!s.remove("Betula pendula").unwrap());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn every_mutation_persists() {
        let mut s = store();
        s.add(oak(), IMG.into()).unwrap();
        let saved = s.backend().blob(FAVORITES_KEY).unwrap();
        assert!(saved.contains("Quercus robur"));
        assert!(s.backend().blob(FAVORITE_IMAGES_KEY).unwrap().contains(IMG));

        s.remove("Quercus robur").unwrap();
        assert_eq!(s.backend().blob(FAVORITES_KEY), Some("[]"));
        assert_eq!(s.backend().blob(FAVORITE_IMAGES_KEY), Some("{}"));
    }

    #[test]
    fn reload_reproduces_collection() {
        let mut s = store();
        s.add(oak(), IMG.into()).unwrap();
        let before = s.collection().clone();

        let reloaded = FavoritesStore::load(s.into_backend());
        assert_eq!(reloaded.collection(), &before);
    }

    #[test]
    fn malformed_blob_loads_empty() {
        let backend = MemoryBackend::new()
            .with_blob(FAVORITES_KEY, "{not json")
            .with_blob(FAVORITE_IMAGES_KEY, "{}");
        let s = FavoritesStore::load(backend);
        assert!(s.is_empty());
    }

    #[test]
    fn malformed_images_blob_loads_empty() {
        let backend = MemoryBackend::new()
            .with_blob(FAVORITES_KEY, "[]")
            .with_blob(FAVORITE_IMAGES_KEY, "[\"not a map\"]");
        let s = FavoritesStore::load(backend);
        assert!(s.is_empty());
        assert!(s.collection().images.is_empty());
    }

    /// Fails every write to one key.
    struct FailingKey {
        inner: MemoryBackend,
        key: &'static str,
    }

    impl StorageBackend for FailingKey {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.read(key)
        }

        fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
            if key == self.key {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.write(key, blob)
        }
    }

    #[test]
    fn failed_image_write_rolls_back_memory_and_entries() {
        let mut s = FavoritesStore::load(FailingKey {
            inner: MemoryBackend::new(),
            key: FAVORITE_IMAGES_KEY,
        });

        assert!(s.add(oak(), IMG.into()).is_err());
        assert!(s.is_empty());
        assert!(s.image_for("Quercus robur").is_none());
        assert_eq!(s.backend().inner.blob(FAVORITES_KEY), Some("[]"));
    }

    #[test]
    fn failed_remove_keeps_entry() {
        let mut seed = FavoritesStore::load(MemoryBackend::new());
        seed.add(oak(), IMG.into()).unwrap();
        let mut s = FavoritesStore::load(FailingKey {
            inner: seed.into_backend(),
            key: FAVORITES_KEY,
        });

        assert!(s.remove("Quercus robur").is_err());
        assert!(s.contains("Quercus robur"));
        assert_eq!(s.image_for("Quercus robur"), Some(IMG));
    }

    #[test]
    fn blobs_round_trip() {
        let mut s = store();
        s.add(oak(), IMG.into()).unwrap();
        let (entries, images) = s.collection().to_blobs().unwrap();
        let back = FavoritesCollection::from_blobs(Some(&entries), Some(&images)).unwrap();
        assert_eq!(&back, s.collection());
    }
}
