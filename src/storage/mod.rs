use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use clientdesk_lib::storage::{self as lib_storage, Code};

pub mod stamp;
pub mod firebase;
pub mod memory;

type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

/// metadata sent along with every upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMetadata {
    pub content_type: String,
    pub cache_control: String,
    pub custom: BTreeMap<String, String>,
}

/// failure reported by a backend, tagged with the reason code
#[derive(Debug, thiserror::Error)]
#[error("{code}: {message}")]
pub struct BackendError {
    code: Code,
    message: String,
    #[source]
    source: Option<BoxDynError>,
}

impl BackendError {
    pub fn new<M>(code: Code, message: M) -> Self
    where
        M: Into<String>
    {
        BackendError {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<S>(mut self, source: S) -> Self
    where
        S: Into<BoxDynError>
    {
        self.source = Some(source.into());
        self
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// the network facing half of the object store
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    /// scheme, host and port requests are sent to
    fn origin(&self) -> &str;

    async fn upload(
        &self,
        key: &str,
        content: Bytes,
        metadata: &UploadMetadata
    ) -> Result<(), BackendError>;

    async fn delete(&self, key: &str) -> Result<(), BackendError>;

    async fn download_url(&self, key: &str) -> Result<String, BackendError>;
}

/// errors handed to callers of the storage client
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No tiene permisos para realizar esta operación")]
    Unauthorized(#[source] BackendError),

    #[error("Operación cancelada")]
    Canceled(#[source] BackendError),

    #[error("Error desconocido, por favor intente nuevamente")]
    Unknown(#[source] BackendError),

    #[error("{}", .0.message())]
    InvalidPath(BackendError),

    #[error(transparent)]
    Service(BackendError),
}

impl StoreError {
    pub fn code(&self) -> &Code {
        match self {
            StoreError::Unauthorized(err) |
            StoreError::Canceled(err) |
            StoreError::Unknown(err) |
            StoreError::InvalidPath(err) |
            StoreError::Service(err) => err.code()
        }
    }

    /// text shown to the end user
    pub fn user_message(&self) -> String {
        match self {
            StoreError::InvalidPath(err) |
            StoreError::Service(err) => err.message().to_owned(),
            localized => localized.to_string(),
        }
    }
}

fn handle_storage_error(err: BackendError) -> StoreError {
    tracing::error!("storage operation failed: {err}");

    match err.code() {
        Code::Unauthorized => StoreError::Unauthorized(err),
        Code::Canceled => StoreError::Canceled(err),
        Code::Unknown => StoreError::Unknown(err),
        _ => StoreError::Service(err),
    }
}

fn object_path(path: &str) -> Result<String, StoreError> {
    lib_storage::canonical_path(path).map_err(|err| {
        tracing::debug!(path = %path, "rejected object path: {err}");

        StoreError::InvalidPath(
            BackendError::new(Code::InvalidArgument, format!("invalid object path \"{path}\": {err}"))
                .with_source(err)
        )
    })
}

/// a file handed over for upload
#[derive(Debug, Clone)]
pub struct Upload {
    pub path: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub content: Bytes,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// store, remove and resolve objects against the configured backend
#[derive(Clone)]
pub struct StorageClient {
    backend: Arc<dyn Backend>,
    stamps: Arc<stamp::StampClock>,
    cache_control: String,
}

impl StorageClient {
    pub fn new<C>(backend: Arc<dyn Backend>, cache_control: C) -> Self
    where
        C: Into<String>
    {
        StorageClient {
            backend,
            stamps: Arc::new(stamp::StampClock::new()),
            cache_control: cache_control.into(),
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub async fn store(&self, upload: Upload) -> Result<StoredObject, StoreError> {
        let path = object_path(&upload.path)?;
        let stamp = self.stamps.next();
        let key = lib_storage::unique_key(&path, stamp, &upload.file_name);

        let mut custom = upload.metadata;
        custom.insert(
            lib_storage::UPLOADED_AT_KEY.to_owned(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        );

        let metadata = UploadMetadata {
            content_type: upload.content_type
                .unwrap_or_else(|| lib_storage::DEFAULT_CONTENT_TYPE.to_owned()),
            cache_control: self.cache_control.clone(),
            custom,
        };

        tracing::debug!(
            key = %key,
            backend = self.backend.name(),
            size = upload.content.len(),
            "uploading object"
        );

        self.backend.upload(&key, upload.content, &metadata)
            .await
            .map_err(handle_storage_error)?;

        let url = self.backend.download_url(&key)
            .await
            .map_err(handle_storage_error)?;

        Ok(StoredObject { key, url })
    }

    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let key = object_path(key)?;

        tracing::debug!(key = %key, backend = self.backend.name(), "deleting object");

        self.backend.delete(&key)
            .await
            .map_err(handle_storage_error)
    }

    pub async fn resolve(&self, key: &str) -> Result<String, StoreError> {
        let key = object_path(key)?;

        self.backend.download_url(&key)
            .await
            .map_err(handle_storage_error)
    }
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("backend", &self.backend.name())
            .field("origin", &self.backend.origin())
            .field("cache_control", &self.cache_control)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use super::*;

    /// fails every operation with the same code
    struct Failing {
        code: Code,
    }

    #[async_trait]
    impl Backend for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn origin(&self) -> &str {
            "http://failing.test"
        }

        async fn upload(&self, _key: &str, _content: Bytes, _metadata: &UploadMetadata) -> Result<(), BackendError> {
            Err(BackendError::new(self.code.clone(), "upload failed"))
        }

        async fn delete(&self, _key: &str) -> Result<(), BackendError> {
            Err(BackendError::new(self.code.clone(), "delete failed"))
        }

        async fn download_url(&self, _key: &str) -> Result<String, BackendError> {
            Err(BackendError::new(self.code.clone(), "download url failed"))
        }
    }

    /// records what was uploaded
    #[derive(Default)]
    struct Recording {
        uploads: Mutex<Vec<(String, UploadMetadata)>>,
    }

    #[async_trait]
    impl Backend for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn origin(&self) -> &str {
            "http://recording.test"
        }

        async fn upload(&self, key: &str, _content: Bytes, metadata: &UploadMetadata) -> Result<(), BackendError> {
            self.uploads.lock()
                .unwrap()
                .push((key.to_owned(), metadata.clone()));

            Ok(())
        }

        async fn delete(&self, _key: &str) -> Result<(), BackendError> {
            Ok(())
        }

        async fn download_url(&self, key: &str) -> Result<String, BackendError> {
            Ok(format!("http://recording.test/{key}"))
        }
    }

    fn upload(path: &str) -> Upload {
        let mut metadata = BTreeMap::new();
        metadata.insert(String::from("clientId"), String::from("12"));
        metadata.insert(String::from("uploadedAt"), String::from("caller value"));

        Upload {
            path: path.to_owned(),
            file_name: String::from("contrato.pdf"),
            content_type: Some(String::from("application/pdf")),
            content: Bytes::from_static(b"%PDF-1.7"),
            metadata,
        }
    }

    #[tokio::test]
    async fn upload_metadata() {
        let backend = Arc::new(Recording::default());
        let client = StorageClient::new(backend.clone(), "public,max-age=3600");

        let stored = client.store(upload("clients/12/contrato"))
            .await
            .expect("store failed");

        assert!(stored.key.starts_with("clients/12/contrato_"));
        assert!(stored.key.ends_with(".pdf"));
        assert_eq!(stored.url, format!("http://recording.test/{}", stored.key));

        let uploads = backend.uploads.lock().unwrap();
        let (key, metadata) = &uploads[0];

        assert_eq!(key, &stored.key);
        assert_eq!(metadata.content_type, "application/pdf");
        assert_eq!(metadata.cache_control, "public,max-age=3600");
        assert_eq!(metadata.custom.get("clientId").map(String::as_str), Some("12"));

        let uploaded_at = metadata.custom.get("uploadedAt").expect("missing uploadedAt");
        assert_ne!(uploaded_at, "caller value");
        assert!(chrono::DateTime::parse_from_rfc3339(uploaded_at).is_ok());
        assert!(uploaded_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn default_content_type() {
        let backend = Arc::new(Recording::default());
        let client = StorageClient::new(backend.clone(), "public,max-age=3600");

        let mut given = upload("docs/nota");
        given.content_type = None;

        client.store(given).await.expect("store failed");

        let uploads = backend.uploads.lock().unwrap();
        assert_eq!(uploads[0].1.content_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn same_path_never_collides() {
        let backend = Arc::new(Recording::default());
        let client = StorageClient::new(backend, "public,max-age=3600");

        let first = client.store(upload("clients/1/foto")).await.expect("store failed");
        let second = client.store(upload("clients/1/foto")).await.expect("store failed");

        assert_ne!(first.key, second.key);
        assert_ne!(first.url, second.url);
    }

    #[tokio::test]
    async fn canonical_keys() {
        let backend = Arc::new(Recording::default());
        let client = StorageClient::new(backend.clone(), "public,max-age=3600");

        for path in ["/docs/foto", "docs//foto", "docs/foto/"] {
            let stored = client.store(upload(path)).await.expect("store failed");

            assert!(stored.key.starts_with("docs/foto_"), "path {path} key {}", stored.key);
        }

        assert_eq!(
            client.resolve("/docs//foto_1.pdf").await.expect("resolve failed"),
            "http://recording.test/docs/foto_1.pdf"
        );
    }

    #[tokio::test]
    async fn relative_paths_rejected() {
        let backend = Arc::new(Recording::default());
        let client = StorageClient::new(backend.clone(), "public,max-age=3600");

        for path in ["../x", "a/./b", "a/..", "/"] {
            let err = client.store(upload(path)).await.expect_err("store succeeded");

            assert!(matches!(err, StoreError::InvalidPath(_)), "path {path} err {err:?}");
            assert_eq!(err.code(), &Code::InvalidArgument);
        }

        let err = client.remove("docs/../secret_1.pdf").await.expect_err("remove succeeded");
        assert!(matches!(err, StoreError::InvalidPath(_)));

        assert!(backend.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn localized_failures() {
        let cases = [
            (Code::Unauthorized, "No tiene permisos para realizar esta operación"),
            (Code::Canceled, "Operación cancelada"),
            (Code::Unknown, "Error desconocido, por favor intente nuevamente"),
        ];

        for (code, expected) in cases {
            assert_eq!(code.localized(), Some(expected));

            let client = StorageClient::new(
                Arc::new(Failing { code: code.clone() }),
                "public,max-age=3600"
            );

            let err = client.store(upload("a/b")).await.expect_err("store succeeded");
            assert_eq!(err.to_string(), expected);
            assert_eq!(err.code(), &code);

            let err = client.remove("a/b_1.pdf").await.expect_err("remove succeeded");
            assert_eq!(err.user_message(), expected);

            let err = client.resolve("a/b_1.pdf").await.expect_err("resolve succeeded");
            assert_eq!(err.to_string(), expected);
        }
    }

    #[tokio::test]
    async fn other_codes_pass_through() {
        let code = Code::from("storage/object-not-found");
        let client = StorageClient::new(
            Arc::new(Failing { code: code.clone() }),
            "public,max-age=3600"
        );

        let err = client.resolve("missing").await.expect_err("resolve succeeded");

        match &err {
            StoreError::Service(inner) => {
                assert_eq!(inner.code(), &code);
                assert_eq!(inner.message(), "download url failed");
            },
            other => panic!("unexpected error {other:?}"),
        }

        assert_eq!(err.user_message(), "download url failed");
    }
}
