pub mod error;
pub mod routes;
pub mod sec;
pub mod storage;

/// the view a denied navigation is sent to
pub const LOGIN_PATH: &str = "/login";
