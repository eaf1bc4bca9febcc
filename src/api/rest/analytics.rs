use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::engine::analytics::{daily_analytics, DailyAnalytics};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/analytics", get(get_analytics))
}

async fn get_analytics(State(state): State<Arc<AppState>>) -> Json<DailyAnalytics> {
    Json(daily_analytics(&state.order_snapshot(), &state.offset()))
}
