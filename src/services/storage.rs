//! Object storage gateway.

use crate::error::{Result, RevoiceError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Trait for uploading pipeline artifacts to durable object storage.
///
/// This trait allows swapping implementations (real HTTP store vs in-memory).
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file to `(bucket, key)`.
    async fn put_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()>;

    /// Upload raw bytes to `(bucket, key)`.
    async fn put_bytes(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;

    /// URI at which an uploaded object is reachable, in the store's scheme.
    ///
    /// Handed to the transcription service as the media location.
    fn object_uri(&self, bucket: &str, key: &str) -> String;
}

fn require_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(RevoiceError::Upload {
            key: String::new(),
            message: "object key must not be empty".to_string(),
        });
    }
    Ok(())
}

/// S3-compatible store speaking path-style HTTP PUT.
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, api_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{bucket}/{key}", self.endpoint)
    }
}

#[async_trait::async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        require_key(key)?;
        let bytes = tokio::fs::read(path).await.map_err(|e| RevoiceError::Upload {
            key: key.to_string(),
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        let content_type = if path.extension().is_some_and(|ext| ext == "mp3") {
            "audio/mpeg"
        } else {
            "application/octet-stream"
        };
        self.put_bytes(bucket, key, bytes, content_type).await
    }

    async fn put_bytes(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        require_key(key)?;
        let mut request = self
            .client
            .put(self.url(bucket, key))
            .header("Content-Type", content_type)
            .body(bytes);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| RevoiceError::Upload {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(RevoiceError::Upload {
                key: key.to_string(),
                message: format!("store returned status {}", response.status()),
            });
        }

        Ok(())
    }

    fn object_uri(&self, bucket: &str, key: &str) -> String {
        self.url(bucket, key)
    }
}

/// In-memory store for testing.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_keys_containing: Option<String>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure uploads to fail for any key containing `fragment`.
    pub fn with_failure_for(mut self, fragment: &str) -> Self {
        self.fail_keys_containing = Some(fragment.to_string());
        self
    }

    /// Stored bytes for `(bucket, key)`, if the upload happened.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("object map lock poisoned")
            .get(&format!("{bucket}/{key}"))
            .cloned()
    }

    /// All stored `bucket/key` entries, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .expect("object map lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn store(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        require_key(key)?;
        if let Some(fragment) = &self.fail_keys_containing
            && key.contains(fragment.as_str())
        {
            return Err(RevoiceError::Upload {
                key: key.to_string(),
                message: "injected upload failure".to_string(),
            });
        }
        self.objects
            .lock()
            .expect("object map lock poisoned")
            .insert(format!("{bucket}/{key}"), bytes);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path).map_err(|e| RevoiceError::Upload {
            key: key.to_string(),
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        self.store(bucket, key, bytes)
    }

    async fn put_bytes(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<()> {
        self.store(bucket, key, bytes)
    }

    fn object_uri(&self, bucket: &str, key: &str) -> String {
        format!("mem://{bucket}/{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_memory_store_put_bytes_and_read_back() {
        let store = MemoryObjectStore::new();
        store
            .put_bytes("bucket", "beta/transcripts/a.txt", b"hello".to_vec(), "text/plain")
            .await
            .unwrap();

        assert_eq!(
            store.object("bucket", "beta/transcripts/a.txt"),
            Some(b"hello".to_vec())
        );
    }

    #[tokio::test]
    async fn test_memory_store_put_file_reads_contents() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"audio bytes").unwrap();

        let store = MemoryObjectStore::new();
        store
            .put_file("bucket", "beta/audio_inputs/a.mp3", temp.path())
            .await
            .unwrap();

        assert_eq!(
            store.object("bucket", "beta/audio_inputs/a.mp3"),
            Some(b"audio bytes".to_vec())
        );
    }

    #[tokio::test]
    async fn test_memory_store_missing_file_is_upload_error() {
        let store = MemoryObjectStore::new();
        let err = store
            .put_file("bucket", "beta/audio_inputs/a.mp3", Path::new("/no/such/file.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, RevoiceError::Upload { .. }));
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let store = MemoryObjectStore::new();
        let err = store
            .put_bytes("bucket", "", b"x".to_vec(), "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, RevoiceError::Upload { .. }));
    }

    #[tokio::test]
    async fn test_injected_failure_matches_key_fragment() {
        let store = MemoryObjectStore::new().with_failure_for("broken");

        assert!(
            store
                .put_bytes("bucket", "beta/transcripts/broken.txt", b"x".to_vec(), "text/plain")
                .await
                .is_err()
        );
        assert!(
            store
                .put_bytes("bucket", "beta/transcripts/fine.txt", b"x".to_vec(), "text/plain")
                .await
                .is_ok()
        );
    }

    #[test]
    fn test_memory_store_uri_scheme() {
        let store = MemoryObjectStore::new();
        assert_eq!(
            store.object_uri("bucket", "beta/audio_inputs/a.mp3"),
            "mem://bucket/beta/audio_inputs/a.mp3"
        );
    }

    #[test]
    fn test_http_store_uri_strips_trailing_slash() {
        let store = HttpObjectStore::new("http://localhost:9000/", None);
        assert_eq!(
            store.object_uri("bucket", "beta/audio_inputs/a.mp3"),
            "http://localhost:9000/bucket/beta/audio_inputs/a.mp3"
        );
    }

    #[test]
    fn test_keys_are_sorted() {
        let store = MemoryObjectStore::new();
        store.store("b", "z", vec![]).ok();
        store.store("b", "a", vec![]).ok();
        assert_eq!(store.keys(), vec!["b/a".to_string(), "b/z".to_string()]);
    }
}
