use bytes::Bytes;
use tracing::debug;

use crate::errors::ShareError;

/// Opaque-keyed blob storage for finished readings.
///
/// A black-box collaborator: Vercel Blob, S3, or an in-memory fake in tests.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the public URL.
    async fn put(&self, key: &str, bytes: Bytes) -> Result<String, ShareError>;

    /// Fetches the bytes stored under `key`.
    async fn get(&self, key: &str) -> Result<Bytes, ShareError>;
}

/// Locale string lookup keyed by `(namespace, key, locale)`.
///
/// Out-of-scope collaborator; consumed by UI layers, not by the relay itself.
pub trait LocaleStrings: Send + Sync {
    fn lookup(&self, namespace: &str, key: &str, locale: &str) -> Option<String>;
}

/// Persists a finished reading's HTML and returns its opaque share id.
pub async fn share_reading(store: &dyn ObjectStore, html: &str) -> Result<String, ShareError> {
    let id = uuid::Uuid::new_v4().to_string();
    let url = store
        .put(&reading_key(&id), Bytes::copy_from_slice(html.as_bytes()))
        .await?;
    debug!(url = %url, "stored shared reading");
    Ok(id)
}

/// Loads a previously shared reading by its opaque id.
pub async fn fetch_reading(store: &dyn ObjectStore, id: &str) -> Result<String, ShareError> {
    let bytes = store.get(&reading_key(id)).await?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| ShareError::Store("stored reading is not valid UTF-8".to_string()))
}

fn reading_key(id: &str) -> String {
    format!("readings/{id}.html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        blobs: Mutex<HashMap<String, Bytes>>,
    }

    #[async_trait::async_trait]
    impl ObjectStore for MemoryStore {
        async fn put(&self, key: &str, bytes: Bytes) -> Result<String, ShareError> {
            self.blobs
                .lock()
                .expect("lock")
                .insert(key.to_string(), bytes);
            Ok(format!("https://blobs.example/{key}"))
        }

        async fn get(&self, key: &str) -> Result<Bytes, ShareError> {
            self.blobs
                .lock()
                .expect("lock")
                .get(key)
                .cloned()
                .ok_or_else(|| ShareError::NotFound(key.to_string()))
        }
    }

    #[tokio::test]
    async fn share_then_fetch_round_trips() {
        let store = MemoryStore::default();
        let id = share_reading(&store, "<p>The Moon rises.</p>")
            .await
            .expect("share");
        let html = fetch_reading(&store, &id).await.expect("fetch");
        assert_eq!(html, "<p>The Moon rises.</p>");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = MemoryStore::default();
        let err = fetch_reading(&store, "missing").await.expect_err("must fail");
        assert!(matches!(err, ShareError::NotFound(_)));
    }
}
