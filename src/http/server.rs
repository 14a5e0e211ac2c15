//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile the access policy once, before any request arrives
//! - Create the Axum Router with the log handlers
//! - Wire up middleware (access gate, tracing, limits, request ID)
//! - Serve with peer addresses attached for the gate

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ViewerConfig;
use crate::http::middleware::{access_control_middleware, track_requests, AccessControlState};
use crate::security::{AccessPolicy, DiagnosticHook, LogDiagnostics, NetworkCache};
use crate::viewer::handlers::{self, ViewerState};
use crate::viewer::LogStore;

/// HTTP server for the log viewer.
pub struct HttpServer {
    router: Router,
    config: ViewerConfig,
    policy: Arc<AccessPolicy>,
}

impl HttpServer {
    /// Create a new HTTP server with its own CIDR cache.
    pub fn new(config: ViewerConfig) -> Self {
        Self::with_cache(config, &NetworkCache::new(), &LogDiagnostics)
    }

    /// Create a server that compiles its policy through a shared cache.
    pub fn with_cache(
        config: ViewerConfig,
        cache: &NetworkCache,
        diagnostics: &dyn DiagnosticHook,
    ) -> Self {
        let policy = Arc::new(AccessPolicy::from_config(&config.access, cache, diagnostics));
        let router = Self::build_router(&config, policy.clone());
        Self {
            router,
            config,
            policy,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ViewerConfig, policy: Arc<AccessPolicy>) -> Router {
        let viewer_state = ViewerState {
            store: Arc::new(LogStore::new(&config.viewer)),
            page_size: config.viewer.page_size,
        };
        let access_state = AccessControlState { policy };

        let guarded = Router::new()
            .route("/log", get(handlers::index))
            .route("/log/getLogFilesList", get(handlers::list_files))
            .route("/log/getFileContent", get(handlers::file_content))
            .route("/log/clearFileContent", post(handlers::clear_file))
            .route("/log/deleteAllFiles", post(handlers::delete_all))
            .route("/log/exportFile", get(handlers::export_file))
            .route_layer(middleware::from_fn_with_state(
                access_state,
                access_control_middleware,
            ))
            .with_state(viewer_state);

        Router::new()
            .route("/health", get(handlers::health))
            .merge(guarded)
            .layer(middleware::from_fn(track_requests))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The compiled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C or a shutdown broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            log_dir = %self.config.viewer.log_dir,
            ip_restriction = self.policy.is_enabled(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for Ctrl+C or a broadcast from [`crate::lifecycle::Shutdown`].
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = shutdown.recv() => {}
    }
    tracing::info!("Shutdown signal received");
}
