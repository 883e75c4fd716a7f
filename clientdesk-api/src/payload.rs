use http::StatusCode;
use axum_core::response::{Response, IntoResponse};
use serde::{Serialize, Deserialize};

use crate::response::{serialize_json, error_json};

#[derive(Debug, Serialize, Deserialize)]
pub struct Payload<T> {
    #[serde(skip)]
    status: Option<u16>,

    payload: T
}

impl<T> Payload<T> {
    pub fn new(payload: T) -> Self {
        Self {
            status: None,
            payload
        }
    }

    /// responds with 201 instead of 200
    pub fn created(payload: T) -> Self {
        Self {
            status: Some(StatusCode::CREATED.as_u16()),
            payload
        }
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T> std::fmt::Display for Payload<T>
where
    T: std::fmt::Display
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        if f.alternate() {
            write!(f, "{:#}", self.payload)
        } else {
            write!(f, "{}", self.payload)
        }
    }
}

impl<T> IntoResponse for Payload<T>
where
    T: Serialize
{
    fn into_response(self) -> Response {
        let status = self.status
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::OK);

        match serialize_json(status, &self) {
            Ok(res) => res,
            Err(err) => {
                tracing::error!("Payload<T> serialization error {:?}", err);
                error_json()
            }
        }
    }
}
