//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile the application's match block
//! - Wrap the forwarding service in middleware (request ID, tracing,
//!   security headers, concurrency and body limits, timeout)
//! - Bind server to listener
//! - Stop on the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::app::{self, AppState};
use crate::books::NewBook;
use crate::config::AppConfig;
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::http::response::nosniff_layer;
use crate::routing::{self, MatchRouter, TemplateError};

/// HTTP server for the application.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a server whose book store is seeded from the configuration.
    pub fn new(config: AppConfig) -> Result<Self, TemplateError> {
        let state = AppState::in_memory(config.books.iter().cloned().map(NewBook::from));
        Self::with_state(config, state)
    }

    /// Create a server over existing state.
    pub fn with_state(config: AppConfig, state: AppState) -> Result<Self, TemplateError> {
        let dispatcher = app::router(state)?;

        tracing::info!(
            cases = dispatcher.block().len(),
            "Match block compiled"
        );
        for (index, case) in dispatcher.block().cases().enumerate() {
            tracing::debug!(
                index,
                case = %case,
                template = %case.template(),
                method = ?case.method(),
                "Case registered"
            );
        }

        let router = Self::build_router(&config, Arc::new(dispatcher));
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The forwarding service is a single fallback route, so the concurrency
    /// limit below is one semaphore for the whole server.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, dispatcher: Arc<dyn MatchRouter>) -> Router {
        let mut router = routing::into_service(dispatcher)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(ConcurrencyLimitLayer::new(config.listener.max_connections));

        if config.security.enable_headers {
            router = router.layer(nosniff_layer());
        }

        // Outermost last: the request ID must exist before the trace span opens.
        router
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_connections = self.config().listener.max_connections,
            request_timeout_secs = self.config().timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The fully layered router, for serving it elsewhere.
    pub fn into_router(self) -> Router {
        self.router
    }
}
