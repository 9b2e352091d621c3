//! Integration tests for file-backed stores

use core_store::{KvStore, SortedJoin, SqliteKvStore, StoreConfig};
use tempfile::TempDir;

fn file_config(dir: &TempDir) -> StoreConfig {
    StoreConfig::new(dir.path().join("catalog.db"))
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let store = SqliteKvStore::open(file_config(&dir)).await.unwrap();
        store.set("album:a1:Name", b"\"Abbey Road\"").await.unwrap();
        store.zadd("albums:all", 0, "a1").await.unwrap();
        store.zadd("album:idx:year", 1969, "a1").await.unwrap();
        store.close().await;
    }

    let store = SqliteKvStore::open(file_config(&dir)).await.unwrap();
    assert_eq!(
        store.get("album:a1:Name").await.unwrap(),
        Some(b"\"Abbey Road\"".to_vec())
    );
    assert_eq!(store.zcard("albums:all").await.unwrap(), 1);
    assert_eq!(store.zscore("album:idx:year", "a1").await.unwrap(), Some(1969));
}

#[tokio::test]
async fn test_reopen_runs_migrations_idempotently() {
    let dir = TempDir::new().unwrap();

    let first = SqliteKvStore::open(file_config(&dir)).await.unwrap();
    first.close().await;

    let second = SqliteKvStore::open(file_config(&dir)).await.unwrap();
    assert_eq!(second.zcard("anything").await.unwrap(), 0);
}

#[tokio::test]
async fn test_pooled_connections_share_data() {
    let dir = TempDir::new().unwrap();
    let store = SqliteKvStore::open(file_config(&dir).max_connections(4))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .zadd("artists:all", 0, &format!("artist-{}", i))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.zcard("artists:all").await.unwrap(), 8);

    let members = store
        .sorted_join(&SortedJoin::new("artists:all"))
        .await
        .unwrap();
    assert_eq!(members.len(), 8);
}
