use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use clientdesk_lib::storage::Code;
use tokio::sync::RwLock;
use url::Url;

use super::{Backend, BackendError, UploadMetadata};

/// route prefix the server exposes object contents under
pub const OBJECTS_PATH: &str = "/api/objects";

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub content: Bytes,
    pub metadata: UploadMetadata,
}

/// Keeps objects in process memory.
///
/// Used for local runs without the emulator and by the router tests.
#[derive(Debug)]
pub struct MemoryBackend {
    origin: Url,
    objects: RwLock<HashMap<String, StoredBlob>>,
}

impl MemoryBackend {
    pub fn new(origin: Url) -> Self {
        MemoryBackend {
            origin,
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn object(&self, key: &str) -> Option<StoredBlob> {
        let reader = self.objects.read().await;

        reader.get(key).cloned()
    }

    fn object_url(&self, key: &str) -> Result<String, BackendError> {
        let mut url = self.origin.clone();

        {
            let Ok(mut segments) = url.path_segments_mut() else {
                return Err(BackendError::new(
                    Code::Unknown,
                    format!("origin cannot be a base url: {}", self.origin)
                ));
            };

            segments.pop_if_empty();

            for part in OBJECTS_PATH.split('/').filter(|v| !v.is_empty()) {
                segments.push(part);
            }

            for part in key.split('/') {
                segments.push(part);
            }
        }

        Ok(url.into())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn origin(&self) -> &str {
        self.origin.as_str().trim_end_matches('/')
    }

    async fn upload(
        &self,
        key: &str,
        content: Bytes,
        metadata: &UploadMetadata
    ) -> Result<(), BackendError> {
        let mut writer = self.objects.write().await;

        writer.insert(key.to_owned(), StoredBlob {
            content,
            metadata: metadata.clone(),
        });

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        let mut writer = self.objects.write().await;

        if writer.remove(key).is_none() {
            return Err(BackendError::new(
                Code::ObjectNotFound,
                format!("Object '{key}' does not exist.")
            ));
        }

        Ok(())
    }

    async fn download_url(&self, key: &str) -> Result<String, BackendError> {
        {
            let reader = self.objects.read().await;

            if !reader.contains_key(key) {
                return Err(BackendError::new(
                    Code::ObjectNotFound,
                    format!("Object '{key}' does not exist.")
                ));
            }
        }

        self.object_url(key)
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use super::*;

    fn metadata() -> UploadMetadata {
        UploadMetadata {
            content_type: String::from("text/plain"),
            cache_control: String::from("public,max-age=3600"),
            custom: BTreeMap::new(),
        }
    }

    async fn count(backend: &MemoryBackend) -> usize {
        backend.objects.read().await.len()
    }

    fn backend() -> MemoryBackend {
        MemoryBackend::new(Url::parse("http://localhost:8080").unwrap())
    }

    #[tokio::test]
    async fn upload_then_resolve() {
        let backend = backend();

        backend.upload("clients/1/nota_5.txt", Bytes::from_static(b"hola"), &metadata())
            .await
            .unwrap();

        let url = backend.download_url("clients/1/nota_5.txt").await.unwrap();
        assert_eq!(url, "http://localhost:8080/api/objects/clients/1/nota_5.txt");

        let blob = backend.object("clients/1/nota_5.txt").await.unwrap();
        assert_eq!(blob.content, Bytes::from_static(b"hola"));
        assert_eq!(blob.metadata.content_type, "text/plain");
    }

    #[tokio::test]
    async fn key_segments_are_encoded() {
        let backend = backend();

        backend.upload("docs/mi archivo_5.pdf", Bytes::new(), &metadata())
            .await
            .unwrap();

        let url = backend.download_url("docs/mi archivo_5.pdf").await.unwrap();
        assert_eq!(url, "http://localhost:8080/api/objects/docs/mi%20archivo_5.pdf");
    }

    #[tokio::test]
    async fn missing_objects() {
        let backend = backend();

        let err = backend.download_url("nope").await.unwrap_err();
        assert_eq!(err.code(), &Code::ObjectNotFound);

        let err = backend.delete("nope").await.unwrap_err();
        assert_eq!(err.code(), &Code::ObjectNotFound);
    }

    #[tokio::test]
    async fn delete_removes() {
        let backend = backend();

        backend.upload("a_1.txt", Bytes::new(), &metadata()).await.unwrap();
        assert_eq!(count(&backend).await, 1);

        backend.delete("a_1.txt").await.unwrap();
        assert_eq!(count(&backend).await, 0);
        assert!(backend.object("a_1.txt").await.is_none());
    }
}
