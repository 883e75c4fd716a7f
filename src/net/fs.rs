use std::path::Path;

use tokio::fs::OpenOptions;
use tokio_util::io::ReaderStream;
use axum::http::{header, StatusCode};
use axum::body::Body;
use axum::response::Response;

use crate::net;
use crate::net::error::{self, GeneralKind};
use crate::path::metadata;

pub async fn stream_file<P>(path: P) -> error::Result<Response<Body>>
where
    P: AsRef<Path>,
{
    let path_ref = path.as_ref();
    let mime = net::mime::mime_from_ext(path_ref.extension());

    let file = OpenOptions::new()
        .read(true)
        .open(path_ref)
        .await?;
    let metadata = file.metadata().await?;

    let stream = ReaderStream::new(file);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.to_string())
        .header(header::CONTENT_LENGTH, metadata.len())
        .body(Body::from_stream(stream))?)
}

/// streams the file if it exists, directories are not served
pub async fn response_file<N, P>(name: N, path: P) -> error::Result<Response<Body>>
where
    N: AsRef<str>,
    P: AsRef<Path>,
{
    let path_ref = path.as_ref();

    let Some(meta) = metadata(path_ref)? else {
        return Err(error::Error::api((
            GeneralKind::NotFound,
            format!("{} was not found", name.as_ref())
        )));
    };

    if !meta.is_file() {
        return Err(error::Error::api(GeneralKind::InvalidRequest));
    }

    stream_file(path_ref).await
}
