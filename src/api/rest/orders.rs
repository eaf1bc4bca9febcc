use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::engine::checkout::{Cart, CheckoutDetails};
use crate::engine::queue::advance_status;
use crate::error::AppError;
use crate::models::order::{Order, OrderEvent, OrderStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(list_orders).post(place_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_order_status))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub menu_item_id: Uuid,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<CartLineRequest>,
    #[serde(flatten)]
    pub details: CheckoutDetails,
}

#[derive(Deserialize)]
pub struct OrdersQuery {
    pub student: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Resolves requested lines against the live menu, capturing current prices.
pub fn build_cart(state: &AppState, lines: &[CartLineRequest]) -> Result<Cart, AppError> {
    let mut cart = Cart::new();
    for line in lines {
        let item = state.menu.get(&line.menu_item_id).ok_or_else(|| {
            AppError::NotFound(format!("menu item {} not found", line.menu_item_id))
        })?;
        cart.add(item.value().clone(), line.quantity);
    }
    Ok(cart)
}

async fn place_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let cart = build_cart(&state, &payload.items)?;
    let order = cart.checkout(payload.details, Utc::now())?;

    state.orders.insert(order.id, order.clone());
    state.metrics.orders_placed_total.inc();
    state.publish(OrderEvent::Placed {
        order: order.clone(),
    });
    state.refresh_load_metrics();

    info!(
        order_id = %order.id,
        token = %order.token,
        total_price = order.total_price,
        pickup_time = %order.pickup_time,
        group = order.is_group_order,
        "order placed"
    );

    Ok(Json(order))
}

/// With `student`, returns that student's history newest first.
async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OrdersQuery>,
) -> Json<Vec<Order>> {
    let snapshot = state.order_snapshot();

    let orders = match query.student.as_deref().map(str::trim) {
        Some(student) if !student.is_empty() => {
            let mut history: Vec<Order> = snapshot
                .into_iter()
                .filter(|order| order.student_name.eq_ignore_ascii_case(student))
                .collect();
            history.sort_by(|a, b| b.order_time.cmp(&a.order_time));
            history
        }
        _ => snapshot,
    };

    Json(orders)
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .orders
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    Ok(Json(order.value().clone()))
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    // The entry lock is held across the guard and the write, so two staff
    // actions on one order cannot both pass the same check.
    let (order, previous) = {
        let mut entry = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

        let previous = advance_status(&mut entry, payload.status)?;
        (entry.clone(), previous)
    };

    state
        .metrics
        .order_status_transitions_total
        .with_label_values(&[order.status.as_str()])
        .inc();
    state.publish(OrderEvent::StatusChanged {
        order: order.clone(),
        previous,
    });
    state.refresh_load_metrics();

    info!(
        order_id = %order.id,
        token = %order.token,
        from = previous.as_str(),
        to = order.status.as_str(),
        "order status advanced"
    );

    Ok(Json(order))
}
