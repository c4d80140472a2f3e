//! The single routing function and the service that feeds it.
//!
//! # Responsibilities
//! - Define the one function an application implements (`MatchRouter::route`)
//! - Forward every verb on every path into it
//!
//! # Design Decisions
//! - axum makes no routing decisions: the whole service is one fallback
//! - A single route means layers such as the concurrency limit exist once
//! - The router is shared as `Arc<dyn MatchRouter>` (immutable, lock-free)

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router,
};
use futures_util::future::BoxFuture;

/// An application's routing function.
pub trait MatchRouter: Send + Sync + 'static {
    /// Produce the response for any incoming request.
    fn route(&self, request: Request<Body>) -> BoxFuture<'_, Response>;
}

/// Build an axum router that hands every request to `router`.
pub fn into_service(router: Arc<dyn MatchRouter>) -> Router {
    Router::new().fallback(forward).with_state(router)
}

async fn forward(
    State(router): State<Arc<dyn MatchRouter>>,
    request: Request<Body>,
) -> Response {
    router.route(request).await
}
