//! Agent HTTP surface: liveness, a live price proxy and Prometheus metrics.
//!
//! Runs as its own task and shares nothing mutable with the submission loop.

use crate::shutdown_requested;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use qo_04_price_feed::PriceSource;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
struct PriceQuery {
    coin: Option<String>,
}

/// Builds the agent router.
pub fn router(prices: Arc<dyn PriceSource>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/price", get(price))
        .route("/metrics", get(metrics))
        .with_state(prices)
}

/// Binds `addr` and serves [`router`] until shutdown.
pub async fn spawn_http_server(
    prices: Arc<dyn PriceSource>,
    addr: SocketAddr,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "Agent HTTP server listening");

    let app = router(prices);
    let handle = tokio::spawn(async move {
        let graceful = async move { shutdown_requested(&mut shutdown).await };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(graceful)
            .await
        {
            error!(error = %e, "Agent HTTP server error");
        }
    });
    Ok((local, handle))
}

async fn health() -> &'static str {
    "Oracle Node is running"
}

async fn price(
    State(prices): State<Arc<dyn PriceSource>>,
    Query(query): Query<PriceQuery>,
) -> Response {
    let Some(coin) = query.coin.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing 'coin' query parameter").into_response();
    };

    match prices.fetch_usd(&coin).await {
        Ok(quote) => Json(json!({ "coin": coin, "price": quote, "currency": "usd" })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to fetch price: {e}"),
        )
            .into_response(),
    }
}

async fn metrics() -> Response {
    match oracle_telemetry::encode_metrics() {
        Ok(body) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
