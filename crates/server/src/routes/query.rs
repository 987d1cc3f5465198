//! Read-oriented endpoints. All of them go through the controller's shared
//! (reader) lock and never require the engine to be paused.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use storage::CandleInterval;

use crate::error::{AppError, AppResult};
use crate::state::ServerState;

pub async fn get_state(State(state): State<ServerState>) -> Json<Value> {
    Json(state.sim.state_json())
}

pub async fn get_commodities(State(state): State<ServerState>) -> Json<Value> {
    Json(state.sim.commodities_json())
}

pub async fn get_agents(State(state): State<ServerState>) -> Json<Value> {
    Json(state.sim.agents_json())
}

pub async fn get_metrics(State(state): State<ServerState>) -> Json<Value> {
    Json(state.sim.metrics_json())
}

#[derive(Debug, Deserialize)]
pub struct DepthQuery {
    #[serde(default = "default_depth")]
    pub depth: usize,
}

fn default_depth() -> usize {
    10
}

pub async fn get_orderbook(
    State(state): State<ServerState>,
    Path(symbol): Path<String>,
    Query(query): Query<DepthQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.sim.orderbook_json(&symbol, query.depth)?;
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

pub async fn get_trades(
    State(state): State<ServerState>,
    Query(query): Query<LimitQuery>,
) -> Json<Value> {
    Json(json!(state.sim.recent_trades(query.limit)))
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    #[serde(default = "default_news_count")]
    pub count: usize,
}

fn default_news_count() -> usize {
    20
}

pub async fn get_news(
    State(state): State<ServerState>,
    Query(query): Query<NewsQuery>,
) -> Json<Value> {
    Json(json!(state.sim.recent_news(query.count)))
}

pub async fn get_news_history(State(state): State<ServerState>) -> Json<Value> {
    Json(json!(state.sim.news_history()))
}

#[derive(Debug, Deserialize)]
pub struct CandleQuery {
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default)]
    pub since: u64,
    #[serde(default = "default_candle_limit")]
    pub limit: usize,
}

fn default_interval() -> String {
    "1m".to_string()
}

fn default_candle_limit() -> usize {
    500
}

fn parse_interval(raw: &str) -> AppResult<CandleInterval> {
    CandleInterval::parse(raw)
        .ok_or_else(|| AppError::BadRequest(format!("unknown candle interval: {}", raw)))
}

pub async fn get_candles(
    State(state): State<ServerState>,
    Path(symbol): Path<String>,
    Query(query): Query<CandleQuery>,
) -> AppResult<Json<Value>> {
    let interval = parse_interval(&query.interval)?;
    let candles = state
        .sim
        .candles(&symbol, interval, query.since, query.limit)?;
    Ok(Json(json!({
        "symbol": symbol,
        "interval": interval.as_str(),
        "candles": candles,
    })))
}

pub async fn get_candles_bulk(
    State(state): State<ServerState>,
    Query(query): Query<CandleQuery>,
) -> AppResult<Json<Value>> {
    let interval = parse_interval(&query.interval)?;
    let bulk = state.sim.candles_bulk(interval, query.since);
    Ok(Json(json!({
        "interval": interval.as_str(),
        "candles": bulk,
    })))
}

pub async fn get_config(State(state): State<ServerState>) -> Json<Value> {
    Json(state.sim.config_json())
}
