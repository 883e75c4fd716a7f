use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut, BufMut};
use clientdesk_lib::storage::Code;
use rand::distributions::{Alphanumeric, DistString};
use reqwest::{Client, StatusCode, Response};
use serde::{Serialize, Deserialize};
use url::Url;

use super::{Backend, BackendError, UploadMetadata};

/// production origin of the storage REST api
pub const PRODUCTION_ORIGIN: &str = "https://firebasestorage.googleapis.com";

const APP_ID_HEADER: &str = "x-firebase-gmpid";
const UPLOAD_PROTOCOL_HEADER: &str = "x-goog-upload-protocol";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceBody<'a> {
    name: &'a str,
    content_type: &'a str,
    cache_control: &'a str,
    metadata: &'a std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectResource {
    download_tokens: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Talks to the storage REST api (or its local emulator).
#[derive(Debug, Clone)]
pub struct FirebaseBackend {
    client: Client,
    origin: Url,
    origin_str: String,
    bucket: String,
    app_id: String,
    emulated: bool,
}

impl FirebaseBackend {
    pub fn new(
        origin: Url,
        bucket: String,
        app_id: String,
        emulated: bool,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()?;

        let origin_str = origin.as_str().trim_end_matches('/').to_owned();

        Ok(FirebaseBackend {
            client,
            origin,
            origin_str,
            bucket,
            app_id,
            emulated,
        })
    }

    /// `{origin}/v0/b/{bucket}/o`
    fn objects_url(&self) -> Result<Url, BackendError> {
        let mut url = self.origin.clone();

        {
            let Ok(mut segments) = url.path_segments_mut() else {
                return Err(BackendError::new(
                    Code::Unknown,
                    format!("invalid storage origin: {}", self.origin)
                ));
            };

            segments.clear()
                .push("v0")
                .push("b")
                .push(&self.bucket)
                .push("o");
        }

        Ok(url)
    }

    /// the key is sent as a single path segment so `/` becomes `%2F`
    fn object_url(&self, key: &str) -> Result<Url, BackendError> {
        let mut url = self.objects_url()?;

        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(key);
        }

        Ok(url)
    }

    fn multipart_body(
        &self,
        boundary: &str,
        key: &str,
        content: &[u8],
        metadata: &UploadMetadata
    ) -> Result<Bytes, BackendError> {
        let resource = serde_json::to_vec(&ResourceBody {
            name: key,
            content_type: &metadata.content_type,
            cache_control: &metadata.cache_control,
            metadata: &metadata.custom,
        }).map_err(|err| BackendError::new(Code::Unknown, "failed to serialize object metadata")
            .with_source(err))?;

        let mut body = BytesMut::with_capacity(resource.len() + content.len() + 256);

        body.put_slice(b"--");
        body.put_slice(boundary.as_bytes());
        body.put_slice(b"\r\nContent-Type: application/json; charset=utf-8\r\n\r\n");
        body.put_slice(&resource);
        body.put_slice(b"\r\n--");
        body.put_slice(boundary.as_bytes());
        body.put_slice(b"\r\nContent-Type: ");
        body.put_slice(metadata.content_type.as_bytes());
        body.put_slice(b"\r\n\r\n");
        body.put_slice(content);
        body.put_slice(b"\r\n--");
        body.put_slice(boundary.as_bytes());
        body.put_slice(b"--");

        Ok(body.freeze())
    }
}

/// reason code for a non success status from the service
fn status_code(status: StatusCode) -> Code {
    match status.as_u16() {
        401 => Code::Unauthenticated,
        402 => Code::QuotaExceeded,
        403 => Code::Unauthorized,
        404 => Code::ObjectNotFound,
        _ => Code::Unknown,
    }
}

/// reason code for a request that never produced a response
fn transport_error(err: reqwest::Error) -> BackendError {
    let (code, msg) = if err.is_timeout() {
        (Code::RetryLimitExceeded, "Max retry time for operation exceeded, please try again.")
    } else if err.is_body() {
        (Code::Canceled, "User canceled the upload/download.")
    } else {
        (Code::Unknown, "An unknown error occurred, please check the error payload for server response.")
    };

    BackendError::new(code, msg).with_source(err)
}

async fn check_response(res: Response) -> Result<Response, BackendError> {
    let status = res.status();

    if status.is_success() {
        return Ok(res);
    }

    let code = status_code(status);
    let text = res.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody { error: ErrorDetail { message: Some(msg) } }) => msg,
        _ if !text.is_empty() => text,
        _ => format!("storage request failed with status {status}"),
    };

    Err(BackendError::new(code, message))
}

#[async_trait]
impl Backend for FirebaseBackend {
    fn name(&self) -> &'static str {
        if self.emulated {
            "firebase-emulator"
        } else {
            "firebase"
        }
    }

    fn origin(&self) -> &str {
        &self.origin_str
    }

    async fn upload(
        &self,
        key: &str,
        content: Bytes,
        metadata: &UploadMetadata
    ) -> Result<(), BackendError> {
        let mut url = self.objects_url()?;
        url.query_pairs_mut().append_pair("name", key);

        let boundary = Alphanumeric.sample_string(&mut rand::thread_rng(), 32);
        let body = self.multipart_body(&boundary, key, &content, metadata)?;

        let res = self.client.post(url)
            .header(APP_ID_HEADER, &self.app_id)
            .header(UPLOAD_PROTOCOL_HEADER, "multipart")
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}")
            )
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        check_response(res).await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        let url = self.object_url(key)?;

        let res = self.client.delete(url)
            .header(APP_ID_HEADER, &self.app_id)
            .send()
            .await
            .map_err(transport_error)?;

        check_response(res).await?;

        Ok(())
    }

    async fn download_url(&self, key: &str) -> Result<String, BackendError> {
        let url = self.object_url(key)?;

        let res = self.client.get(url.clone())
            .header(APP_ID_HEADER, &self.app_id)
            .send()
            .await
            .map_err(transport_error)?;

        let resource: ObjectResource = check_response(res).await?
            .json()
            .await
            .map_err(|err| if err.is_decode() {
                BackendError::new(Code::Unknown, "invalid object metadata received")
                    .with_source(err)
            } else {
                transport_error(err)
            })?;

        let token = resource.download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').find(|t| !t.is_empty()))
            .ok_or_else(|| BackendError::new(
                Code::NoDownloadUrl,
                format!("The given file does not have any download URLs: {key}")
            ))?;

        let mut download = url;
        download.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);

        Ok(download.into())
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use wiremock::matchers::{method, path, query_param, header, header_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const BUCKET: &str = "demo-clientdesk.appspot.com";

    fn backend(server: &MockServer, timeout: Duration) -> FirebaseBackend {
        FirebaseBackend::new(
            Url::parse(&server.uri()).unwrap(),
            BUCKET.to_owned(),
            String::from("1:000:web:demo"),
            true,
            timeout,
        ).unwrap()
    }

    fn metadata() -> UploadMetadata {
        let mut custom = BTreeMap::new();
        custom.insert(String::from("uploadedAt"), String::from("2024-01-01T00:00:00.000Z"));

        UploadMetadata {
            content_type: String::from("application/pdf"),
            cache_control: String::from("public,max-age=3600"),
            custom,
        }
    }

    #[tokio::test]
    async fn upload_sends_multipart() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/v0/b/{BUCKET}/o")))
            .and(query_param("name", "clients/1/contrato_5.pdf"))
            .and(header("x-goog-upload-protocol", "multipart"))
            .and(header("x-firebase-gmpid", "1:000:web:demo"))
            .and(header_regex("content-type", "^multipart/related; boundary=[A-Za-z0-9]{32}$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "clients/1/contrato_5.pdf",
                "bucket": BUCKET,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server, Duration::from_secs(5));

        backend.upload("clients/1/contrato_5.pdf", Bytes::from_static(b"%PDF"), &metadata())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);

        assert!(body.contains("\"cacheControl\":\"public,max-age=3600\""));
        assert!(body.contains("\"contentType\":\"application/pdf\""));
        assert!(body.contains("\"uploadedAt\":\"2024-01-01T00:00:00.000Z\""));
        assert!(body.contains("\r\n\r\n%PDF\r\n"));
    }

    #[tokio::test]
    async fn resolve_builds_token_url() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/v0/b/{BUCKET}/o/clients%2F1%2Ffoto_5.png")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "clients/1/foto_5.png",
                "downloadTokens": "tok-a,tok-b",
            })))
            .mount(&server)
            .await;

        let backend = backend(&server, Duration::from_secs(5));
        let url = backend.download_url("clients/1/foto_5.png").await.unwrap();

        assert_eq!(url, format!(
            "{}/v0/b/{BUCKET}/o/clients%2F1%2Ffoto_5.png?alt=media&token=tok-a",
            server.uri()
        ));
    }

    #[tokio::test]
    async fn resolve_without_tokens() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "a_1.txt",
            })))
            .mount(&server)
            .await;

        let err = backend(&server, Duration::from_secs(5))
            .download_url("a_1.txt")
            .await
            .unwrap_err();

        assert_eq!(err.code(), &Code::NoDownloadUrl);
    }

    #[tokio::test]
    async fn delete_object() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("/v0/b/{BUCKET}/o/docs%2Fnota_9.txt")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        backend(&server, Duration::from_secs(5))
            .delete("docs/nota_9.txt")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn status_codes() {
        let cases = [
            (401, Code::Unauthenticated),
            (402, Code::QuotaExceeded),
            (403, Code::Unauthorized),
            (404, Code::ObjectNotFound),
            (500, Code::Unknown),
        ];

        for (status, expected) in cases {
            let server = MockServer::start().await;

            Mock::given(method("DELETE"))
                .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                    "error": { "code": status, "message": "denied by rules" }
                })))
                .mount(&server)
                .await;

            let err = backend(&server, Duration::from_secs(5))
                .delete("a_1.txt")
                .await
                .unwrap_err();

            assert_eq!(err.code(), &expected, "status {status}");
            assert_eq!(err.message(), "denied by rules");
        }
    }

    #[tokio::test]
    async fn timeout_is_retry_limit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let err = backend(&server, Duration::from_millis(50))
            .download_url("slow_1.txt")
            .await
            .unwrap_err();

        assert_eq!(err.code(), &Code::RetryLimitExceeded);
    }

    /// answers every connection with a body that stops short of its
    /// content-length
    async fn truncated_server() -> Url {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = stream.read(&mut buf).await;
                    let _ = stream.write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{\"name\":"
                    ).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Url::parse(&format!("http://{addr}")).unwrap()
    }

    #[tokio::test]
    async fn interrupted_body_is_canceled() {
        let backend = FirebaseBackend::new(
            truncated_server().await,
            BUCKET.to_owned(),
            String::new(),
            true,
            Duration::from_secs(2),
        ).unwrap();

        let err = backend.download_url("docs/cut_1.pdf").await.unwrap_err();

        assert_eq!(err.code(), &Code::Canceled);
        assert_eq!(err.message(), "User canceled the upload/download.");
    }

    #[tokio::test]
    async fn invalid_metadata_is_unknown() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = backend(&server, Duration::from_secs(2))
            .download_url("docs/a_1.pdf")
            .await
            .unwrap_err();

        assert_eq!(err.code(), &Code::Unknown);
        assert_eq!(err.message(), "invalid object metadata received");
    }

    #[tokio::test]
    async fn unreachable_is_unknown() {
        let backend = FirebaseBackend::new(
            Url::parse("http://127.0.0.1:1").unwrap(),
            BUCKET.to_owned(),
            String::new(),
            true,
            Duration::from_secs(2),
        ).unwrap();

        let err = backend.delete("a_1.txt").await.unwrap_err();

        assert_eq!(err.code(), &Code::Unknown);
    }
}
