use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::net::error;
use crate::net::layer;
use crate::sec::guard;
use crate::state::ArcShared;

mod api;
mod views;

async fn ping() -> (StatusCode, &'static str) {
    (StatusCode::OK, "pong")
}

pub fn routes(state: &ArcShared) -> Router {
    Router::new()
        .nest("/api", api::routes(state))
        .route("/ping", get(ping))
        .fallback(views::serve)
        .layer(middleware::from_fn_with_state(state.clone(), guard::enforce))
        .layer(ServiceBuilder::new()
            .layer(layer::RIDLayer::new())
            .layer(TraceLayer::new_for_http()
                .make_span_with(layer::trace::make_span_with)
                .on_request(layer::trace::on_request)
                .on_response(layer::trace::on_response)
                .on_failure(layer::trace::on_failure))
            .layer(HandleErrorLayer::new(error::handle_error))
            .layer(TimeoutLayer::new(state.request_timeout())))
        .with_state(state.clone())
}
