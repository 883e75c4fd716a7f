/// key the login flow persists the flag under
pub const SESSION_FLAG_KEY: &str = "isAuthenticated";

/// the only value treated as logged in
pub const SESSION_FLAG_VALUE: &str = "true";

/// Per request view of the session flag.
///
/// The flag carries no identity and is never verified server side. It is
/// only a proxy for "the login view said yes", so the only state kept is
/// whether the stored value was exactly [`SESSION_FLAG_VALUE`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    authenticated: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Session { authenticated: false }
    }

    pub fn authenticated() -> Self {
        Session { authenticated: true }
    }

    pub fn from_flag(value: Option<&str>) -> Self {
        Session {
            authenticated: value == Some(SESSION_FLAG_VALUE),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
