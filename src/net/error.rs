use axum::response::{Response, IntoResponse};
use tracing::Level;

pub use clientdesk_api::error::{
    Detail,
    ApiErrorKind,
    ApiError,
    GeneralKind,
    AuthKind,
    StorageKind,
};
use clientdesk_lib::storage::Code;

use crate::storage::StoreError;

type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

pub async fn handle_error<E>(error: E) -> Response
where
    E: Into<Error>
{
    error.into().into_response()
}

#[derive(Debug)]
pub struct Error {
    inner: ApiError,
    context: Option<String>,
    src: Option<BoxDynError>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new() -> Self {
        Error {
            inner: Default::default(),
            context: None,
            src: None,
        }
    }

    pub fn api<T>(value: T) -> Self
    where
        T: Into<ApiError>
    {
        Error {
            inner: value.into(),
            context: None,
            src: None
        }
    }

    pub fn kind<K>(mut self, kind: K) -> Self
    where
        K: Into<ApiErrorKind>
    {
        self.inner = self.inner.with_kind(kind);
        self
    }

    pub fn context<C>(mut self, ctx: C) -> Self
    where
        C: Into<String>
    {
        self.context = Some(ctx.into());
        self
    }

    pub fn source<S>(mut self, src: S) -> Self
    where
        S: Into<BoxDynError>
    {
        self.src = Some(src.into());
        self
    }

    pub fn inner(&self) -> &ApiError {
        &self.inner
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.inner, &self.context, &self.src) {
            (inner, Some(cxt), Some(err)) => if f.alternate() {
                write!(f, "inner: {}\ncxt: {}\nerr: {:#?}", inner, cxt, err)
            } else {
                write!(f, "inner: {}\ncxt: {}\nerr: {:?}", inner, cxt, err)
            },
            (inner, Some(cxt), None) => write!(f, "inner: {}\ncxt: {}", inner, cxt),
            (inner, None, Some(err)) => if f.alternate() {
                write!(f, "inner: {}\nerr: {:#?}", inner, err)
            } else {
                write!(f, "inner: {}\nerr: {:?}", inner, err)
            },
            (inner, None, None) => write!(f, "inner: {}", inner)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.src.as_ref().map(|v| & **v as _)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Some(err) = self.src.as_ref() {
            match &self.context {
                Some(cxt) => tracing::event!(
                    Level::ERROR,
                    "unhandled error when processing request: {cxt}\n{:#?}",
                    err
                ),
                None => tracing::event!(
                    Level::ERROR,
                    "unhandled error when processing request: {:#?}",
                    err
                ),
            }
        } else {
            tracing::debug!("request rejected {}: {}", self.inner().status(), self.inner());
        }

        self.inner.into_response()
    }
}

impl From<ApiError> for Error {
    fn from(api_err: ApiError) -> Self {
        Error {
            inner: api_err,
            context: None,
            src: None,
        }
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(_infallible: std::convert::Infallible) -> Self {
        Error::new()
            .source("Infallible. how did this happen")
    }
}

/// errors raised by the tower layers in front of the router
impl From<tower::BoxError> for Error {
    fn from(err: tower::BoxError) -> Self {
        if err.is::<tower::timeout::error::Elapsed>() {
            Error::api(GeneralKind::Timeout)
        } else {
            Error::new()
                .context("request middleware failed")
                .source(err)
        }
    }
}

/// the store already logged the failure so only the api error is kept
impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        let kind: ApiErrorKind = match &err {
            StoreError::Unauthorized(_) => StorageKind::PermissionDenied.into(),
            StoreError::Canceled(_) => StorageKind::Canceled.into(),
            StoreError::Unknown(_) => StorageKind::Unknown.into(),
            StoreError::InvalidPath(_) => GeneralKind::InvalidRequest.into(),
            StoreError::Service(inner) => match inner.code() {
                Code::ObjectNotFound => StorageKind::ObjectNotFound.into(),
                Code::Unauthenticated => AuthKind::Unauthenticated.into(),
                _ => StorageKind::Service.into(),
            }
        };

        Error::api((
            kind,
            Detail::Code(err.code().to_string()),
            err.user_message()
        ))
    }
}

macro_rules! simple_from {
    ($e:path) => {
        impl From<$e> for Error {
            fn from(err: $e) -> Self {
                Error::new()
                    .source(err)
            }
        }
    };
    ($e:path, $k:expr) => {
        impl From<$e> for Error {
            fn from(err: $e) -> Self {
                Error::new()
                    .kind($k)
                    .source(err)
            }
        }
    };
    ($e:path, $k:expr, $m:expr) => {
        impl From<$e> for Error {
            fn from(err: $e) -> Self {
                Error::new()
                    .kind($k)
                    .context($m)
                    .source(err)
            }
        }
    };
}

simple_from!(std::io::Error);

simple_from!(axum::http::Error);
simple_from!(
    axum::http::header::ToStrError,
    GeneralKind::InvalidHeaderValue
);
simple_from!(
    axum::http::header::InvalidHeaderValue,
    GeneralKind::InvalidHeaderValue
);
simple_from!(
    axum::http::header::InvalidHeaderName,
    GeneralKind::InvalidHeaderValue
);

simple_from!(
    mime::FromStrError,
    GeneralKind::InvalidMimeType
);

simple_from!(handlebars::RenderError, GeneralKind::InternalFailure, "failed to render template");

simple_from!(serde_json::Error);

// ----------------------------------------------------------------------------

use clientdesk_lib::context_trait;

context_trait!(Error);

impl<T, E> Context<T, E> for std::result::Result<T, E>
where
    E: Into<BoxDynError>
{
    fn context<C>(self, cxt: C) -> std::result::Result<T, Error>
    where
        C: Into<String>
    {
        match self {
            Ok(v) => Ok(v),
            Err(err) => Err(Error::new()
                .context(cxt)
                .source(err))
        }
    }
}

impl<T> Context<T, ()> for std::option::Option<T> {
    fn context<C>(self, cxt: C) -> std::result::Result<T, Error>
    where
        C: Into<String>
    {
        match self {
            Some(v) => Ok(v),
            None => Err(Error::new()
                .context(cxt))
        }
    }
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;

    use crate::storage::BackendError;

    use super::*;

    fn status_of(err: StoreError) -> (StatusCode, ApiError) {
        let err = Error::from(err);

        (err.inner().status(), err.inner().clone())
    }

    #[test]
    fn store_errors() {
        let (status, api) = status_of(StoreError::Unauthorized(
            BackendError::new(Code::Unauthorized, "denied")
        ));
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(api.message(), Some("No tiene permisos para realizar esta operación"));
        assert_eq!(api.detail(), Some(&Detail::Code(String::from("storage/unauthorized"))));

        let (status, api) = status_of(StoreError::Canceled(
            BackendError::new(Code::Canceled, "aborted")
        ));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(api.message(), Some("Operación cancelada"));

        let (status, _) = status_of(StoreError::Unknown(
            BackendError::new(Code::Unknown, "boom")
        ));
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, api) = status_of(StoreError::InvalidPath(
            BackendError::new(Code::InvalidArgument, "invalid object path \"../x\"")
        ));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(api.kind(), &ApiErrorKind::General(GeneralKind::InvalidRequest));
        assert_eq!(api.detail(), Some(&Detail::Code(String::from("storage/invalid-argument"))));
    }

    #[test]
    fn middleware_errors() {
        let elapsed: tower::BoxError = Box::new(tower::timeout::error::Elapsed::new());
        assert_eq!(Error::from(elapsed).inner().status(), StatusCode::REQUEST_TIMEOUT);

        let other: tower::BoxError = "connection reset".into();
        assert_eq!(Error::from(other).inner().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn passthrough_errors() {
        let (status, api) = status_of(StoreError::Service(
            BackendError::new(Code::ObjectNotFound, "Object 'a' does not exist.")
        ));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(api.message(), Some("Object 'a' does not exist."));
        assert_eq!(api.detail(), Some(&Detail::Code(String::from("storage/object-not-found"))));

        let (status, _) = status_of(StoreError::Service(
            BackendError::new(Code::Unauthenticated, "sign in")
        ));
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, api) = status_of(StoreError::Service(
            BackendError::new(Code::from("storage/quota-exceeded"), "quota")
        ));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(api.detail(), Some(&Detail::Code(String::from("storage/quota-exceeded"))));
    }
}
