use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use clientdesk_lib::storage::Code;

use crate::net::error::{self, Detail, GeneralKind, StorageKind};
use crate::state::ArcShared;

/// serves objects held by the in memory store
pub async fn retrieve(
    State(state): State<ArcShared>,
    Path(key): Path<String>,
) -> error::Result<Response> {
    let Some(memory) = state.project().memory() else {
        return Err(error::Error::api(GeneralKind::NotFound));
    };

    let Some(blob) = memory.object(&key).await else {
        return Err(error::Error::api((
            StorageKind::ObjectNotFound,
            Detail::Code(Code::ObjectNotFound.to_string()),
            format!("Object '{key}' does not exist.")
        )));
    };

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, blob.metadata.content_type)
        .header(header::CACHE_CONTROL, blob.metadata.cache_control)
        .header(header::CONTENT_LENGTH, blob.content.len())
        .body(Body::from(blob.content))?)
}
