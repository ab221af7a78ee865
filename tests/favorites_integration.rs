//! Favorites persisted through the file backend.
//!
//! Each test gets its own temporary data directory.

mod pipeline_helpers;

use natureid_lib::favorites::{
    FavoritesStore, FileBackend, StorageBackend, FAVORITES_KEY, FAVORITE_IMAGES_KEY,
};
use natureid_lib::llm::IdentificationResult;
use pipeline_helpers::{amanita_json, PNG_URI};

fn amanita() -> IdentificationResult {
    serde_json::from_str(&amanita_json()).unwrap()
}

fn birch() -> IdentificationResult {
    let mut r = amanita();
    r.common_name = "Silver birch".into();
    r.scientific_name = "Betula pendula".into();
    r
}

#[test]
fn fresh_directory_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FavoritesStore::load(FileBackend::new(dir.path().join("missing")));
    assert!(store.is_empty());
}

#[test]
fn saved_favorites_reload_in_order() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = FavoritesStore::load(FileBackend::new(dir.path()));
        store.add(amanita(), PNG_URI.into()).unwrap();
        store.add(birch(), PNG_URI.into()).unwrap();
    }

    assert!(dir.path().join("natureid-favorites.json").exists());
    assert!(dir.path().join("natureid-favorite-images.json").exists());

    let store = FavoritesStore::load(FileBackend::new(dir.path()));
    let names: Vec<String> = store
        .list()
        .into_iter()
        .map(|e| e.result.scientific_name)
        .collect();
    assert_eq!(names, vec!["Amanita muscaria", "Betula pendula"]);
    assert_eq!(store.image_for("Betula pendula"), Some(PNG_URI));
    assert_eq!(store.get("Amanita muscaria").unwrap().result, amanita());
}

#[test]
fn adding_twice_is_idempotent_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FavoritesStore::load(FileBackend::new(dir.path()));
    store.add(amanita(), PNG_URI.into()).unwrap();
    store.add(amanita(), PNG_URI.into()).unwrap();

    let reloaded = FavoritesStore::load(FileBackend::new(dir.path()));
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn removal_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FavoritesStore::load(FileBackend::new(dir.path()));
    store.add(amanita(), PNG_URI.into()).unwrap();
    assert!(store.remove("Amanita muscaria").unwrap());

    let reloaded = FavoritesStore::load(FileBackend::new(dir.path()));
    assert!(reloaded.is_empty());
    assert!(reloaded.image_for("Amanita muscaria").is_none());
}

#[test]
fn malformed_file_loads_empty_and_is_overwritten_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = FileBackend::new(dir.path());
    backend.write(FAVORITES_KEY, "[{\"commonName\": 42").unwrap();
    backend.write(FAVORITE_IMAGES_KEY, "{}").unwrap();

    let mut store = FavoritesStore::load(backend);
    assert!(store.is_empty());

    store.add(birch(), PNG_URI.into()).unwrap();
    let reloaded = FavoritesStore::load(FileBackend::new(dir.path()));
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.contains("Betula pendula"));
}

#[test]
fn malformed_images_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = FavoritesStore::load(FileBackend::new(dir.path()));
        store.add(birch(), PNG_URI.into()).unwrap();
    }
    std::fs::write(dir.path().join("natureid-favorite-images.json"), "{\"Betula").unwrap();

    let store = FavoritesStore::load(FileBackend::new(dir.path()));
    assert!(store.is_empty());
    assert!(store.image_for("Betula pendula").is_none());
}

#[test]
fn images_blob_is_a_map_by_scientific_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FavoritesStore::load(FileBackend::new(dir.path()));
    store.add(birch(), PNG_URI.into()).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("natureid-favorite-images.json")).unwrap();
    let images: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(images["Betula pendula"], PNG_URI);
}
