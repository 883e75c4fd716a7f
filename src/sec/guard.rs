use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use clientdesk_lib::sec::guard::{self, Navigation};
use clientdesk_lib::sec::session::Session;

use crate::sec::session;
use crate::state::ArcShared;

/// Runs before every navigation to a known view.
///
/// Paths outside of the route table are passed through untouched, api
/// handlers enforce the session themselves.
pub async fn enforce(
    State(state): State<ArcShared>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(found) = state.routes().resolve(request.uri().path()) {
        let session = match session::from_headers(request.headers()) {
            Ok(session) => session,
            Err(err) => {
                tracing::debug!("unreadable cookie header: {err}");

                Session::anonymous()
            }
        };

        if let Navigation::Redirect(to) = guard::check(&session, found.chain()) {
            tracing::debug!(
                route = found.record().name(),
                "navigation denied, redirecting to {to}"
            );

            return Redirect::to(to).into_response();
        }
    }

    next.run(request).await
}
