pub mod request_id;

pub use request_id::RIDLayer;

pub mod trace {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, Response};
    use tracing::Span;
    use tower_http::classify::ServerErrorsFailureClass;

    use super::request_id::RequestId;

    pub fn make_span_with(request: &Request<Body>) -> Span {
        let id = RequestId::try_get(request)
            .map(|req_id| *req_id.id())
            .unwrap_or(0);

        tracing::info_span!(
            "REQ",
            i = id,
            v = ?request.version(),
            m = %request.method(),
            u = %request.uri(),
            s = tracing::field::Empty
        )
    }

    pub fn on_request(_request: &Request<Body>, _span: &Span) {}

    pub fn on_response(response: &Response<Body>, latency: Duration, span: &Span) {
        span.record("s", &tracing::field::display(response.status()));

        tracing::info!("{:#?}", latency)
    }

    pub fn on_failure(error: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
        tracing::error!("{} {:#?}", error, latency)
    }
}
