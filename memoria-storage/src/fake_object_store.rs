//! In-memory `ObjectStore` double for unit tests (spec §0 test tooling).
//!
//! Lets `memoria-services`/`memoria-web` unit tests exercise memory
//! delete's best-effort blob cleanup without a live MinIO.

use async_trait::async_trait;
use dashmap::DashMap;
use memoria_core::{ObjectStore, Result, Status};

#[derive(Default)]
pub struct FakeObjectStore {
    buckets: DashMap<String, ()>,
    objects: DashMap<(String, String), Vec<u8>>,
}

impl FakeObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        Ok(self.buckets.contains_key(bucket))
    }

    async fn make_bucket(&self, bucket: &str) -> Result<()> {
        self.buckets.insert(bucket.to_string(), ());
        Ok(())
    }

    async fn put(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<()> {
        self.objects.insert((bucket.to_string(), key.to_string()), data);
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Status::not_found(format!("no object {bucket}/{key}")))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        self.objects.remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let store = FakeObjectStore::new();
        store.make_bucket("b").await.unwrap();
        store.put("b", "k", vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get("b", "k").await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn get_missing_object_is_not_found() {
        let store = FakeObjectStore::new();
        let err = store.get("b", "missing").await.unwrap_err();
        assert_eq!(err.code, memoria_core::StatusCode::NotFound);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = FakeObjectStore::new();
        store.put("b", "k", vec![1]).await.unwrap();
        store.delete("b", "k").await.unwrap();
        store.delete("b", "k").await.unwrap();
    }
}
