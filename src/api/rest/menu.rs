use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::menu::{Category, MenuItem};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/menu", get(list_menu).post(add_menu_item))
        .route("/menu/:id", put(update_menu_item))
}

#[derive(Deserialize)]
pub struct MenuQuery {
    pub category: Option<Category>,
    pub q: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemRequest {
    pub name: String,
    pub category: Category,
    pub price: u32,
    #[serde(default = "available_by_default")]
    pub available: bool,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub prep_time: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

fn available_by_default() -> bool {
    true
}

impl MenuItemRequest {
    fn into_item(self, id: Uuid) -> Result<MenuItem, AppError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("name cannot be empty".to_string()));
        }

        if self.price == 0 {
            return Err(AppError::BadRequest("price must be > 0".to_string()));
        }

        Ok(MenuItem {
            id,
            name,
            category: self.category,
            price: self.price,
            available: self.available,
            stock: self.stock,
            prep_time: self.prep_time,
            description: self.description.trim().to_string(),
            image: self.image.trim().to_string(),
        })
    }
}

async fn list_menu(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MenuQuery>,
) -> Json<Vec<MenuItem>> {
    let search = query.q.unwrap_or_default();
    let mut items: Vec<MenuItem> = state
        .menu
        .iter()
        .map(|entry| entry.value().clone())
        .filter(|item| query.category.is_none_or(|category| item.category == category))
        .filter(|item| item.matches_query(&search))
        .collect();

    items.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
    Json(items)
}

async fn add_menu_item(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MenuItemRequest>,
) -> Result<Json<MenuItem>, AppError> {
    let item = payload.into_item(Uuid::new_v4())?;

    state.menu.insert(item.id, item.clone());
    info!(menu_item_id = %item.id, name = %item.name, price = item.price, "menu item added");

    Ok(Json(item))
}

async fn update_menu_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MenuItemRequest>,
) -> Result<Json<MenuItem>, AppError> {
    let mut entry = state
        .menu
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("menu item {} not found", id)))?;

    *entry = payload.into_item(id)?;
    info!(menu_item_id = %id, available = entry.available, "menu item updated");

    Ok(Json(entry.clone()))
}
