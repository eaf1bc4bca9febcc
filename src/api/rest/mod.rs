pub mod analytics;
pub mod complaints;
pub mod menu;
pub mod orders;
pub mod queue;
pub mod ws;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.config.cors_origins.clone()))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(menu::router())
        .merge(orders::router())
        .merge(queue::router())
        .merge(complaints::router())
        .merge(analytics::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .fallback_service(ServeDir::new("static"))
        .layer(cors)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    menu_items: usize,
    orders: usize,
    active_orders: usize,
    complaints: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let active_orders = state
        .orders
        .iter()
        .filter(|entry| entry.value().is_active())
        .count();

    Json(HealthResponse {
        status: "ok",
        menu_items: state.menu.len(),
        orders: state.orders.len(),
        active_orders,
        complaints: state.complaints.len(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
