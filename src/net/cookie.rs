use std::fmt::Write;
use std::time::Duration;

use axum::http::header::{HeaderMap, HeaderValue, SET_COOKIE, COOKIE};
use axum::response::{IntoResponse, IntoResponseParts, Response, ResponseParts};

use crate::net::error;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// builder for a single `set-cookie` header
#[derive(Debug, Clone)]
pub struct SetCookie {
    name: String,
    value: String,
    max_age: Option<Duration>,
    path: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl SetCookie {
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        SetCookie {
            name: name.into(),
            value: value.into(),
            max_age: None,
            path: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn with_path<P>(mut self, path: P) -> Self
    where
        P: Into<String>
    {
        self.path = Some(path.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn to_header_string(&self) -> String {
        let mut rtn = format!("{}={}", self.name, self.value);

        // writing to a String does not fail
        if let Some(max_age) = &self.max_age {
            let _ = write!(rtn, "; Max-Age={}", max_age.as_secs());
        }

        if let Some(path) = &self.path {
            let _ = write!(rtn, "; Path={path}");
        }

        if let Some(same_site) = &self.same_site {
            let _ = write!(rtn, "; SameSite={}", same_site.as_str());
        }

        if self.secure {
            rtn.push_str("; Secure");
        }

        if self.http_only {
            rtn.push_str("; HttpOnly");
        }

        rtn
    }

    pub fn into_header_value(self) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
        HeaderValue::try_from(self.to_header_string())
    }
}

impl IntoResponseParts for SetCookie {
    type Error = error::Error;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let value = self.into_header_value()?;

        res.headers_mut().append(SET_COOKIE, value);

        Ok(res)
    }
}

impl IntoResponse for SetCookie {
    fn into_response(self) -> Response {
        (self, ()).into_response()
    }
}

/// value of the first cookie with the given name across all `cookie`
/// headers
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, axum::http::header::ToStrError> {
    for value in headers.get_all(COOKIE) {
        let value_str = value.to_str()?;

        for pair in value_str.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key == name {
                    return Ok(Some(value));
                }
            }
        }
    }

    Ok(None)
}
