use std::collections::BTreeMap;
use std::str::FromStr;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::extract::rejection::BytesRejection;
use axum::http::{header, HeaderMap, StatusCode};
use clientdesk_api::Payload;
use clientdesk_api::files::{META_HEADER_PREFIX, StoredFile, UploadQuery};

use crate::net::error::{self, Detail, GeneralKind};
use crate::sec::session::Authenticated;
use crate::state::ArcShared;
use crate::storage::Upload;

fn get_mime(headers: &HeaderMap) -> error::Result<Option<String>> {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return Ok(None);
    };

    let mime = mime::Mime::from_str(value.to_str()?)?;

    Ok(Some(mime.to_string()))
}

/// `x-meta-{key}` headers become the custom metadata of the upload
fn get_metadata(headers: &HeaderMap) -> error::Result<BTreeMap<String, String>> {
    let mut rtn = BTreeMap::new();

    for (name, value) in headers {
        let Some(key) = name.as_str().strip_prefix(META_HEADER_PREFIX) else {
            continue;
        };

        if key.is_empty() {
            continue;
        }

        let value = value.to_str()?;

        rtn.insert(key.to_owned(), value.to_owned());
    }

    Ok(rtn)
}

/// only the length limit gets its own kind, other body failures are the
/// client's fault
fn get_content(body: Result<Bytes, BytesRejection>, limit: usize) -> error::Result<Bytes> {
    match body {
        Ok(content) => Ok(content),
        Err(rejection) => if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Err(error::Error::api((
                GeneralKind::MaxSize,
                format!("uploads are limited to {limit} bytes")
            )))
        } else {
            Err(error::Error::api((
                GeneralKind::InvalidRequest,
                rejection.body_text()
            )))
        }
    }
}

pub async fn upload(
    State(state): State<ArcShared>,
    _auth: Authenticated,
    headers: HeaderMap,
    Query(UploadQuery { path, name }): Query<UploadQuery>,
    body: Result<Bytes, BytesRejection>,
) -> error::Result<Payload<StoredFile>> {
    let content = get_content(body, state.max_upload())?;
    let mut missing = Vec::new();

    if path.is_empty() {
        missing.push(String::from("path"));
    }

    if name.is_empty() {
        missing.push(String::from("name"));
    }

    if !missing.is_empty() {
        return Err(error::Error::api((
            GeneralKind::MissingData,
            Detail::Keys(missing),
            "path and name are required"
        )));
    }

    let stored = state.project()
        .storage()
        .store(Upload {
            path,
            file_name: name,
            content_type: get_mime(&headers)?,
            content,
            metadata: get_metadata(&headers)?,
        })
        .await?;

    Ok(Payload::created(StoredFile {
        key: stored.key,
        url: stored.url,
    }))
}

pub async fn retrieve(
    State(state): State<ArcShared>,
    _auth: Authenticated,
    Path(key): Path<String>,
) -> error::Result<Payload<StoredFile>> {
    let url = state.project()
        .storage()
        .resolve(&key)
        .await?;

    Ok(Payload::new(StoredFile { key, url }))
}

pub async fn delete(
    State(state): State<ArcShared>,
    _auth: Authenticated,
    Path(key): Path<String>,
) -> error::Result<StatusCode> {
    state.project()
        .storage()
        .remove(&key)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod test {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn metadata_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-meta-client", HeaderValue::from_static("12"));
        headers.insert("x-meta-case", HeaderValue::from_static("abierto"));
        headers.insert("x-meta-", HeaderValue::from_static("ignored"));
        headers.insert("x-other", HeaderValue::from_static("ignored"));

        let metadata = get_metadata(&headers).unwrap();

        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata["client"], "12");
        assert_eq!(metadata["case"], "abierto");
    }

    #[test]
    fn content_type() {
        let mut headers = HeaderMap::new();
        assert_eq!(get_mime(&headers).unwrap(), None);

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
        assert_eq!(get_mime(&headers).unwrap().as_deref(), Some("application/pdf"));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("not a mime"));
        assert!(get_mime(&headers).is_err());
    }
}
