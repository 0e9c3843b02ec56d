//! Integration tests for the settings store and its change listener.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use ndastro::settings::{default_settings, keys, ChangeListener, SettingsStore};

fn open_store() -> (Arc<SettingsStore>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = SettingsStore::open(temp_dir.path().join("settings.db")).expect("Failed to open store");
    (Arc::new(store), temp_dir)
}

// ============================================================================
// Store
// ============================================================================

mod store {
    use super::*;

    #[test]
    fn test_defaults_are_seeded_once() {
        let (store, _temp_dir) = open_store();
        assert_eq!(store.seed_defaults().unwrap(), default_settings().len());
        assert_eq!(store.seed_defaults().unwrap(), 0);

        let listed = store.list().unwrap();
        let keys: Vec<&str> = listed.iter().map(|(k, _)| k.as_str()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(keys.contains(&keys::THEME));
        assert_eq!(store.get::<Vec<String>>(keys::RECENT_FILES).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_two_handles_share_one_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.db");
        let first = SettingsStore::open(&path).unwrap();
        let second = SettingsStore::open(&path).unwrap();

        first.set(keys::DATE_FORMAT, "%Y/%m/%d").unwrap();
        assert_eq!(
            second.get::<String>(keys::DATE_FORMAT).unwrap().as_deref(),
            Some("%Y/%m/%d")
        );
        assert_eq!(first.latest_change_id().unwrap(), second.latest_change_id().unwrap());
    }

    #[test]
    fn test_structured_values() {
        let (store, _temp_dir) = open_store();
        let value = json!({ "lat": 13.08, "lon": 80.27, "name": "Chennai" });
        store.set("last_place", &value).unwrap();
        assert_eq!(store.get_value("last_place").unwrap(), Some(value));
    }
}

// ============================================================================
// Listener
// ============================================================================

mod listener {
    use super::*;

    #[tokio::test]
    async fn test_sees_changes_in_order() {
        let (store, _temp_dir) = open_store();
        let listener = ChangeListener::spawn(Arc::clone(&store), Duration::from_millis(20)).unwrap();
        let mut rx = listener.subscribe();

        store.set(keys::LANGUAGE, "ta").unwrap();
        store.set(keys::THEME, "dark").unwrap();
        store.remove(keys::THEME).unwrap();

        let mut seen = Vec::new();
        while seen.len() < 3 {
            let change = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("timed out waiting for change")
                .unwrap();
            seen.push(change);
        }

        assert_eq!(seen[0].key, keys::LANGUAGE);
        assert_eq!(seen[0].value, Some(json!("ta")));
        assert_eq!(seen[1].key, keys::THEME);
        assert_eq!(seen[2].key, keys::THEME);
        assert_eq!(seen[2].value, None);
        assert!(seen.windows(2).all(|w| w[0].id < w[1].id));

        listener.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_ignores_changes_before_spawn() {
        let (store, _temp_dir) = open_store();
        store.seed_defaults().unwrap();

        let listener = ChangeListener::spawn(Arc::clone(&store), Duration::from_millis(20)).unwrap();
        let mut rx = listener.subscribe();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());

        store.set(keys::TIMEZONE, "+01:00").unwrap();
        let change = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for change")
            .unwrap();
        assert_eq!(change.key, keys::TIMEZONE);

        listener.stop().await.unwrap();
    }
}
