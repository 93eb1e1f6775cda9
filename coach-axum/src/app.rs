use std::future::Future;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::handler::Handler;
use axum::routing::get;
use axum::Router;
use coach_core::CoachApi;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::rest;
use crate::CoachAxumState;

/// Headroom on top of the photo limit for the `coach` part and multipart framing.
const BODY_OVERHEAD_BYTES: usize = 1024 * 1024;

pub struct CoachAxumApp {
    pub api: Arc<dyn CoachApi>,
    pub router: Router<()>,
}

impl Clone for CoachAxumApp {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            router: self.router.clone(),
        }
    }
}

impl CoachAxumApp {
    /// Mount `api` under `/coaches` with a `/health` probe.
    pub fn new(api: Arc<dyn CoachApi>) -> Self {
        let state = CoachAxumState::new(Arc::clone(&api));
        Self {
            api,
            router: Router::new().nest("/coaches", rest::coach_router(state)),
        }
        .service("/health", || async { "ok" })
    }

    pub fn service<H, T>(mut self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        self.router = self.router.route(path, get(handler));
        self
    }

    /// Cap request bodies so a multipart upload can carry `max_photo_bytes`.
    pub fn with_photo_limit(mut self, max_photo_bytes: usize) -> Self {
        self.router = self.router.layer(DefaultBodyLimit::max(
            max_photo_bytes.saturating_add(BODY_OVERHEAD_BYTES),
        ));
        self
    }

    /// Request tracing plus `x-request-id` (kept if the caller sent one).
    pub fn with_tracing(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn listen_until<A, S>(self, addr: A, shutdown: S) -> std::io::Result<()>
    where
        A: ToSocketAddrs,
        S: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "coach service listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
