use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::net::error;
use crate::state::ArcShared;

mod session;
mod project;
mod files;
mod objects;

async fn not_found() -> error::Error {
    error::Error::api(error::GeneralKind::NotFound)
}

pub fn routes(state: &ArcShared) -> Router<ArcShared> {
    Router::new()
        .route("/session", post(session::create)
            .delete(session::drop))
        .route("/project", get(project::retrieve))
        .route("/files", post(files::upload)
            .layer(DefaultBodyLimit::max(state.max_upload())))
        .route("/files/*key", get(files::retrieve)
            .delete(files::delete))
        .route("/objects/*key", get(objects::retrieve))
        .fallback(not_found)
}
