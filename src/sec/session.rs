use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use clientdesk_lib::sec::session::{Session, SESSION_FLAG_KEY, SESSION_FLAG_VALUE};

use crate::net::cookie::{find_cookie, SameSite, SetCookie};
use crate::net::error;

/// reads the session flag from the request cookies
pub fn from_headers(headers: &HeaderMap) -> Result<Session, axum::http::header::ToStrError> {
    Ok(Session::from_flag(find_cookie(headers, SESSION_FLAG_KEY)?))
}

/// Session flag of the current request, never rejects on a missing flag.
#[derive(Debug, Clone, Copy)]
pub struct CurrentSession(pub Session);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = error::Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(from_headers(&parts.headers)?))
    }
}

/// Rejects the request with `Unauthenticated` unless the flag is set.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated;

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = error::Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;

        if session.is_authenticated() {
            Ok(Authenticated)
        } else {
            Err(error::Error::api((
                error::AuthKind::Unauthenticated,
                "an authenticated session is required"
            )))
        }
    }
}

pub fn login_cookie(secure: bool) -> SetCookie {
    SetCookie::new(SESSION_FLAG_KEY, SESSION_FLAG_VALUE)
        .with_path("/")
        .with_secure(secure)
        .with_same_site(SameSite::Strict)
}

pub fn logout_cookie(secure: bool) -> SetCookie {
    SetCookie::new(SESSION_FLAG_KEY, "")
        .with_max_age(Duration::new(0, 0))
        .with_path("/")
        .with_secure(secure)
        .with_same_site(SameSite::Strict)
}

#[cfg(test)]
mod test {
    use axum::http::{header, HeaderValue, Request, StatusCode};

    use super::*;

    fn parts_with_cookie(cookie: Option<&'static str>) -> Parts {
        let mut builder = Request::builder().uri("/api/files");

        if let Some(value) = cookie {
            builder = builder.header(header::COOKIE, HeaderValue::from_static(value));
        }

        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn current_session() {
        let mut parts = parts_with_cookie(Some("isAuthenticated=true"));
        let CurrentSession(session) = CurrentSession::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(session.is_authenticated());

        let mut parts = parts_with_cookie(None);
        let CurrentSession(session) = CurrentSession::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn authenticated_rejects() {
        let mut parts = parts_with_cookie(Some("isAuthenticated=yes"));
        let err = Authenticated::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();

        assert_eq!(err.inner().status(), StatusCode::UNAUTHORIZED);

        let mut parts = parts_with_cookie(Some("isAuthenticated=true"));
        assert!(Authenticated::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[test]
    fn cookies() {
        assert_eq!(
            login_cookie(false).to_header_string(),
            "isAuthenticated=true; Path=/; SameSite=Strict"
        );
        assert_eq!(
            logout_cookie(true).to_header_string(),
            "isAuthenticated=; Max-Age=0; Path=/; SameSite=Strict; Secure"
        );
    }
}
