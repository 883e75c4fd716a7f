use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::sec::session::{self, CurrentSession};
use crate::state::ArcShared;

/// Marks the browser as logged in.
///
/// The login view is the only caller and no credentials are checked here.
pub async fn create(
    State(state): State<ArcShared>,
) -> impl IntoResponse {
    tracing::debug!("session flag set");

    (
        StatusCode::NO_CONTENT,
        session::login_cookie(state.secure_cookies())
    )
}

pub async fn drop(
    State(state): State<ArcShared>,
    CurrentSession(current): CurrentSession,
) -> impl IntoResponse {
    if !current.is_authenticated() {
        tracing::debug!("clearing session flag that was not set");
    }

    (
        StatusCode::NO_CONTENT,
        session::logout_cookie(state.secure_cookies())
    )
}
