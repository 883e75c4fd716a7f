use crate::routes::Record;
use crate::LOGIN_PATH;

use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(&'static str),
}

pub fn requires_auth(chain: &[Record]) -> bool {
    chain.iter().any(Record::requires_auth)
}

/// decides whether a navigation to the given route chain may continue
pub fn check(session: &Session, chain: &[Record]) -> Navigation {
    if requires_auth(chain) && !session.is_authenticated() {
        Navigation::Redirect(LOGIN_PATH)
    } else {
        Navigation::Proceed
    }
}
