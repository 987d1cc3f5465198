//! Axum application builder.

use axum::Router;
use axum::routing::{get, post};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes::{control, health, query, stream};
use crate::state::ServerState;

/// Create the router with every endpoint mounted.
pub fn create_app(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health::health))
        // Read surface
        .route("/state", get(query::get_state))
        .route("/commodities", get(query::get_commodities))
        .route("/agents", get(query::get_agents))
        .route("/metrics", get(query::get_metrics))
        .route("/orderbook/{symbol}", get(query::get_orderbook))
        .route("/trades", get(query::get_trades))
        .route("/news", get(query::get_news).post(control::post_news))
        .route("/news/history", get(query::get_news_history))
        .route("/candles/bulk", get(query::get_candles_bulk))
        .route("/candles/{symbol}", get(query::get_candles))
        .route("/config", get(query::get_config).post(control::post_config))
        // Control surface
        .route("/control", post(control::post_control))
        .route("/orders", post(control::post_orders))
        .route("/reinitialize", post(control::post_reinitialize))
        .route("/populate", post(control::post_populate))
        .route("/export", post(control::post_export))
        // Streaming
        .route("/stream", get(stream::sse_stream))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind address configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Serve until the future is cancelled (the caller handles shutdown
/// signals).
pub async fn serve(state: ServerState, config: ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "api listening");
    axum::serve(listener, create_app(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use simulation::Simulation;

    #[test]
    fn bind_addr_formats() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn app_builds() {
        let state = ServerState::new(Simulation::with_defaults(), "data");
        let _app = create_app(state);
    }
}
