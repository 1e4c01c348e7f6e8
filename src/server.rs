// ABOUTME: HTTP server assembly: merges domain routers, applies middleware, serves with graceful shutdown
// ABOUTME: CORS is permissive; request tracing and a whole-request timeout wrap every route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{info, warn, Level};

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::routes::{AdminRoutes, ChatRoutes, HealthRoutes, UtilityRoutes};

/// Extra time the HTTP layer allows beyond the turn timeout, covering persistence
const HTTP_TIMEOUT_MARGIN_SECS: u64 = 5;

/// The Luna HTTP server
pub struct LunaServer {
    resources: Arc<ServerResources>,
}

impl LunaServer {
    /// Wrap shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Router with every route and middleware layer
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(&self.resources)
    }

    /// Bind `port` on all interfaces and serve until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the server fails.
    pub async fn run(&self, port: u16) -> AppResult<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        info!("Luna server listening on http://{addr}");

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Transport error: {e}")))?;

        info!("Luna server stopped");
        Ok(())
    }
}

/// Merge the domain routers and apply middleware
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let http_timeout = Duration::from_secs(
        resources
            .config
            .conversation
            .request_timeout_secs
            .saturating_add(HTTP_TIMEOUT_MARGIN_SECS),
    );

    Router::new()
        .merge(ChatRoutes::routes(resources.clone()))
        .merge(UtilityRoutes::routes(resources.clone()))
        .merge(AdminRoutes::routes(resources.clone()))
        .merge(HealthRoutes::routes(resources.clone()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            http_timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
