//! API Key Store Integration Tests
//!
//! Persistence round-trips through a real temporary file.

use pplx_bridge::keys::ApiKeyStore;

#[test]
fn test_full_key_lifecycle_persists_across_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api_keys.json");

    // Issue a key, use it, deactivate it.
    let key = {
        let store = ApiKeyStore::open(path.clone());
        let key = store.generate("taskmaster").unwrap();
        store.record_usage(&key).unwrap();
        store.record_tokens(&key, 42, 117).unwrap();
        assert_eq!(store.toggle(&key).unwrap(), Some(false));
        key
    };

    // A fresh process sees the same state.
    let store = ApiKeyStore::open(path);
    assert!(!store.validate(&key));

    let entries = store.list();
    assert_eq!(entries.len(), 1);
    let (stored_key, entry) = &entries[0];
    assert_eq!(stored_key, &key);
    assert_eq!(entry.name, "taskmaster");
    assert_eq!(entry.usage_count, 1);
    assert_eq!(entry.total_input_tokens, 42);
    assert_eq!(entry.total_output_tokens, 117);
    assert!(!entry.active);

    // Reactivate and delete.
    assert_eq!(store.toggle(&key).unwrap(), Some(true));
    assert!(store.validate(&key));
    assert!(store.delete(&key).unwrap());
    assert!(store.list().is_empty());
}

#[test]
fn test_parent_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("keys.json");

    let store = ApiKeyStore::open(path.clone());
    store.generate("nested").unwrap();
    assert!(path.exists());
}
