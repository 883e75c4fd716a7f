use http::StatusCode;
use axum_core::body::Body;
use axum_core::response::Response;
use serde::Serialize;
use bytes::{BytesMut, BufMut};

pub fn serialize_json(
    status: StatusCode,
    data: &impl Serialize
) -> Result<Response, serde_json::Error> {
    let froze = {
        let mut buf = BytesMut::with_capacity(128).writer();
        serde_json::to_writer(&mut buf, data)?;

        buf.into_inner().freeze()
    };

    let len = froze.len();
    let mut response = Response::new(Body::from(froze));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(http::header::CONTENT_TYPE, http::HeaderValue::from_static("application/json"));
    headers.insert(http::header::CONTENT_LENGTH, http::HeaderValue::from(len));

    Ok(response)
}

pub fn error_json() -> Response {
    let body = r#"{"kind":"InternalFailure"}"#;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;

    let headers = response.headers_mut();
    headers.insert(http::header::CONTENT_TYPE, http::HeaderValue::from_static("application/json"));
    headers.insert(http::header::CONTENT_LENGTH, http::HeaderValue::from(body.len()));

    response
}
