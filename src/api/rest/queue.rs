use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::rest::orders::{build_cart, CartLineRequest};
use crate::engine::checkout::pickup_slots;
use crate::engine::queue::{decode_orders, queue_view, rank_active_orders, QueueEntry};
use crate::engine::rush::{best_time_to_visit, RushReport};
use crate::error::AppError;
use crate::models::order::Order;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/queue", get(get_queue))
        .route("/queue/rank", post(rank_snapshot))
        .route("/rush", get(get_rush))
        .route("/pickup-slots", post(get_pickup_slots))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RushResponse {
    #[serde(flatten)]
    pub report: RushReport,
    pub status_message: String,
    pub best_time_to_visit: DateTime<FixedOffset>,
}

#[derive(Deserialize)]
pub struct PickupSlotsRequest {
    pub items: Vec<CartLineRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupSlotsResponse {
    pub estimated_prep_minutes: u32,
    pub slots: Vec<DateTime<Utc>>,
}

async fn get_queue(State(state): State<Arc<AppState>>) -> Json<Vec<QueueEntry>> {
    Json(queue_view(
        &state.order_snapshot(),
        Utc::now(),
        &state.config.queue,
    ))
}

/// Ranks an externally supplied order snapshot without touching the store.
async fn rank_snapshot(Json(snapshot): Json<Value>) -> Result<Json<Vec<Order>>, AppError> {
    let orders = decode_orders(snapshot)?;
    Ok(Json(rank_active_orders(&orders)))
}

async fn get_rush(State(state): State<Arc<AppState>>) -> Json<RushResponse> {
    let now = state.local_now();
    let report = state.rush_report();

    Json(RushResponse {
        status_message: report.status_message(&now),
        best_time_to_visit: best_time_to_visit(&report, &now),
        report,
    })
}

async fn get_pickup_slots(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PickupSlotsRequest>,
) -> Result<Json<PickupSlotsResponse>, AppError> {
    let cart = build_cart(&state, &payload.items)?;

    Ok(Json(PickupSlotsResponse {
        estimated_prep_minutes: cart.estimated_prep_minutes(),
        slots: pickup_slots(&cart, Utc::now()),
    }))
}
