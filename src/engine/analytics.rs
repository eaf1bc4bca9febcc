use std::collections::BTreeMap;

use chrono::{TimeZone, Timelike};
use serde::Serialize;
use uuid::Uuid;

use crate::models::menu::Category;
use crate::models::order::{Order, OrderStatus};

const PEAK_HOURS_SHOWN: usize = 8;
const POPULAR_ITEMS_SHOWN: usize = 5;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HourlyCount {
    pub hour: u32,
    pub label: String,
    pub orders: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PopularItem {
    pub menu_item_id: Uuid,
    pub name: String,
    pub count: u64,
    pub revenue: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: Category,
    pub quantity: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyAnalytics {
    pub total_orders: usize,
    pub total_revenue: u64,
    pub completed_orders: usize,
    pub average_order_value: f64,
    pub peak_hours: Vec<HourlyCount>,
    pub popular_items: Vec<PopularItem>,
    pub categories: Vec<CategoryShare>,
}

/// Dashboard aggregates over every order, completed or not. Hours are bucketed
/// by submission time in `zone`.
pub fn daily_analytics<Tz: TimeZone>(orders: &[Order], zone: &Tz) -> DailyAnalytics {
    let total_orders = orders.len();
    let total_revenue: u64 = orders.iter().map(|order| u64::from(order.total_price)).sum();
    let completed_orders = orders
        .iter()
        .filter(|order| order.status == OrderStatus::Completed)
        .count();
    let average_order_value = if total_orders > 0 {
        total_revenue as f64 / total_orders as f64
    } else {
        0.0
    };

    DailyAnalytics {
        total_orders,
        total_revenue,
        completed_orders,
        average_order_value,
        peak_hours: peak_hours(orders, zone),
        popular_items: popular_items(orders),
        categories: category_distribution(orders),
    }
}

fn peak_hours<Tz: TimeZone>(orders: &[Order], zone: &Tz) -> Vec<HourlyCount> {
    let mut buckets = [0usize; 24];
    for order in orders {
        let hour = order.order_time.with_timezone(zone).hour() as usize;
        buckets[hour] += 1;
    }

    let mut busy: Vec<HourlyCount> = buckets
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(hour, count)| HourlyCount {
            hour: hour as u32,
            label: format!("{hour}:00"),
            orders: *count,
        })
        .collect();

    busy.sort_by(|a, b| b.orders.cmp(&a.orders));
    busy.truncate(PEAK_HOURS_SHOWN);
    busy
}

fn popular_items(orders: &[Order]) -> Vec<PopularItem> {
    let mut items: Vec<PopularItem> = Vec::new();

    for line in orders.iter().flat_map(|order| &order.items) {
        let quantity = u64::from(line.quantity);
        let revenue = u64::from(line.menu_item.price) * quantity;

        match items
            .iter_mut()
            .find(|item| item.menu_item_id == line.menu_item.id)
        {
            Some(item) => {
                item.count += quantity;
                item.revenue += revenue;
            }
            None => items.push(PopularItem {
                menu_item_id: line.menu_item.id,
                name: line.menu_item.name.clone(),
                count: quantity,
                revenue,
            }),
        }
    }

    items.sort_by(|a, b| b.count.cmp(&a.count));
    items.truncate(POPULAR_ITEMS_SHOWN);
    items
}

fn category_distribution(orders: &[Order]) -> Vec<CategoryShare> {
    let mut totals: BTreeMap<Category, u64> = BTreeMap::new();
    for line in orders.iter().flat_map(|order| &order.items) {
        *totals.entry(line.menu_item.category).or_default() += u64::from(line.quantity);
    }

    totals
        .into_iter()
        .map(|(category, quantity)| CategoryShare { category, quantity })
        .collect()
}
