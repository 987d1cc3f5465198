//! Control-plane endpoints: lifecycle commands, user orders, news
//! injection, config patches, populate, and export.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::{info, warn};

use news::{NewsCategory, NewsSentiment};
use types::{AgentId, Order, OrderSide, OrderType};

use crate::error::{AppError, AppResult};
use crate::state::ServerState;

// =============================================================================
// /control
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    pub action: String,
    #[serde(default)]
    pub count: Option<u64>,
}

pub async fn post_control(
    State(state): State<ServerState>,
    Json(request): Json<ControlRequest>,
) -> AppResult<Json<Value>> {
    let sim = &state.sim;
    match request.action.as_str() {
        "start" => sim.start(),
        "pause" => sim.pause(),
        "resume" => sim.resume(),
        "stop" => sim.stop(),
        "reset" => sim.reset(),
        "step" => {
            let count = request.count.unwrap_or(1);
            let sim = sim.clone();
            // Stepping many ticks can outlive the request budget; keep the
            // executor responsive.
            tokio::task::spawn_blocking(move || sim.step(count))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
        }
        other => {
            return Err(AppError::BadRequest(format!("unknown action: {}", other)));
        }
    }

    Ok(Json(json!({ "status": "ok", "action": request.action })))
}

// =============================================================================
// /orders
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub price: f64,
    pub quantity: i64,
    /// Defaults to the user sentinel id 0.
    #[serde(default)]
    pub user_id: u64,
}

pub async fn post_orders(
    State(state): State<ServerState>,
    Json(request): Json<OrderRequest>,
) -> AppResult<Json<Value>> {
    let order = Order {
        id: types::OrderId::UNASSIGNED,
        agent_id: AgentId(request.user_id),
        symbol: request.symbol,
        side: request.side,
        order_type: request.order_type,
        price: request.price,
        quantity: request.quantity,
        timestamp: 0,
    };

    let (order_id, trades) = state.sim.submit_order(order)?;
    Ok(Json(json!({
        "orderId": order_id,
        "trades": trades,
    })))
}

// =============================================================================
// /news
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct NewsRequest {
    pub category: NewsCategory,
    pub sentiment: NewsSentiment,
    pub magnitude: f64,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
}

pub async fn post_news(
    State(state): State<ServerState>,
    Json(request): Json<NewsRequest>,
) -> AppResult<Json<Value>> {
    if !(0.0..=1.0).contains(&request.magnitude) {
        return Err(AppError::BadRequest(
            "magnitude must be within [0, 1]".into(),
        ));
    }
    if matches!(
        request.category,
        NewsCategory::Supply | NewsCategory::Demand
    ) && request.target.as_deref().unwrap_or("").is_empty()
    {
        return Err(AppError::BadRequest(
            "supply and demand news require a target symbol".into(),
        ));
    }

    state.sim.inject_news(
        request.category,
        request.sentiment,
        request.magnitude,
        request.target.as_deref(),
        request.headline.as_deref(),
    )?;
    Ok(Json(json!({ "status": "queued" })))
}

// =============================================================================
// /config and /reinitialize
// =============================================================================

pub async fn post_config(
    State(state): State<ServerState>,
    Json(patch): Json<Value>,
) -> AppResult<Json<Value>> {
    state.sim.load_config(&patch)?;
    Ok(Json(state.sim.config_json()))
}

pub async fn post_reinitialize(State(state): State<ServerState>) -> AppResult<Json<Value>> {
    if state.sim.is_running() {
        return Err(AppError::Conflict(
            "stop the simulation before reinitializing".into(),
        ));
    }
    state.sim.reinitialize()?;
    Ok(Json(json!({ "status": "reinitialized" })))
}

// =============================================================================
// /populate
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulateRequest {
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_start_date")]
    pub start_date: String,
}

fn default_start_date() -> String {
    "2025-01-01".to_string()
}

pub async fn post_populate(
    State(state): State<ServerState>,
    Json(request): Json<PopulateRequest>,
) -> AppResult<Json<Value>> {
    if state.sim.is_running() || state.sim.is_populating() {
        return Err(AppError::Conflict(
            "cannot populate while running or already populating".into(),
        ));
    }
    // Validate the date up front so the caller gets a 4xx instead of a
    // background failure.
    sim_core::SimClock::parse_date(&request.start_date)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let sim = state.sim.clone();
    match (request.days, request.ticks) {
        (Some(days), _) => {
            tokio::task::spawn_blocking(move || {
                if let Err(e) = sim.populate(days, &request.start_date) {
                    warn!(error = %e, "populate failed");
                }
            });
            info!(days, "populate launched");
            Ok(Json(json!({ "status": "populating", "days": days })))
        }
        (None, Some(ticks)) => {
            tokio::task::spawn_blocking(move || {
                if let Err(e) = sim.populate_ticks(ticks, &request.start_date) {
                    warn!(error = %e, "populate failed");
                }
            });
            info!(ticks, "populate launched");
            Ok(Json(json!({ "status": "populating", "ticks": ticks })))
        }
        (None, None) => Err(AppError::BadRequest(
            "populate requires days or ticks".into(),
        )),
    }
}

// =============================================================================
// /export
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// "csv" or "json".
    pub format: String,
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub max_ticks: usize,
}

pub async fn post_export(
    State(state): State<ServerState>,
    Json(request): Json<ExportRequest>,
) -> AppResult<Json<Value>> {
    let dir = request
        .data_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| state.data_dir.clone());

    let sim = state.sim.clone();
    let max_ticks = request.max_ticks;
    match request.format.as_str() {
        "csv" => {
            let out = dir.clone();
            tokio::task::spawn_blocking(move || sim.export_csv(&out, max_ticks))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))??;
            Ok(Json(json!({ "status": "exported", "format": "csv", "dir": dir })))
        }
        "json" => {
            let path = dir.join("export.json");
            let out = path.clone();
            tokio::task::spawn_blocking(move || sim.export_json(&out, max_ticks))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))??;
            Ok(Json(json!({ "status": "exported", "format": "json", "path": path })))
        }
        other => Err(AppError::BadRequest(format!(
            "unknown export format: {}",
            other
        ))),
    }
}
