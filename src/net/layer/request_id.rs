use std::task::{Context, Poll};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tower::{Layer, Service};
use axum::http::Request;

type Counter = Arc<AtomicU64>;

/// process unique id attached to every request for log correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(u64);

impl RequestId {
    pub fn try_get<B>(req: &Request<B>) -> Option<&Self> {
        req.extensions().get()
    }

    pub fn id(&self) -> &u64 {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct RIDService<S> {
    inner: S,
    counter: Counter
}

impl<S, B> Service<Request<B>> for RIDService<S>
where
    S: Service<Request<B>>
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let id = self.counter.fetch_add(1, Ordering::Relaxed);

        request.extensions_mut().insert(RequestId(id));

        self.inner.call(request)
    }
}

#[derive(Debug, Clone)]
pub struct RIDLayer {
    counter: Counter
}

impl RIDLayer {
    pub fn new() -> Self {
        RIDLayer {
            counter: Arc::new(AtomicU64::new(1))
        }
    }
}

impl<S> Layer<S> for RIDLayer {
    type Service = RIDService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RIDService {
            inner,
            counter: self.counter.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::convert::Infallible;

    use tower::{ServiceBuilder, ServiceExt};

    use super::*;

    #[tokio::test]
    async fn ids_increase() {
        let layer = RIDLayer::new();

        let service = ServiceBuilder::new()
            .layer(layer)
            .service_fn(|req: Request<()>| async move {
                Ok::<_, Infallible>(RequestId::try_get(&req).map(|rid| *rid.id()))
            });

        let first = service.clone().oneshot(Request::new(())).await.unwrap();
        let second = service.oneshot(Request::new(())).await.unwrap();

        assert_eq!(first, Some(1));
        assert_eq!(second, Some(2));
    }
}
