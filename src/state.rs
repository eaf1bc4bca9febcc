use chrono::{DateTime, FixedOffset, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::engine::rush::{classify_rush, RushReport};
use crate::error::AppError;
use crate::models::complaint::Complaint;
use crate::models::menu::MenuItem;
use crate::models::order::{Order, OrderEvent};
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub menu: DashMap<Uuid, MenuItem>,
    pub orders: DashMap<Uuid, Order>,
    pub complaints: DashMap<Uuid, Complaint>,
    pub order_events_tx: broadcast::Sender<OrderEvent>,
    pub metrics: Metrics,
    pub config: Config,
    offset: FixedOffset,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let offset = config.canteen_offset()?;
        let (order_events_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);

        Ok(Self {
            menu: DashMap::new(),
            orders: DashMap::new(),
            complaints: DashMap::new(),
            order_events_tx,
            metrics: Metrics::new(),
            config,
            offset,
        })
    }

    /// Wall clock in the canteen's zone.
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Point-in-time copy of all orders in submission order.
    pub fn order_snapshot(&self) -> Vec<Order> {
        let mut snapshot: Vec<Order> = self
            .orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        snapshot.sort_by_key(|order| (order.order_time, order.id));
        snapshot
    }

    pub fn rush_report(&self) -> RushReport {
        classify_rush(&self.order_snapshot(), &self.local_now(), &self.config.rush)
    }

    pub fn publish(&self, event: OrderEvent) {
        // No subscribers is fine.
        let _ = self.order_events_tx.send(event);
    }

    /// Refreshes the load gauges after the order set changed.
    pub fn refresh_load_metrics(&self) {
        let snapshot = self.order_snapshot();
        let active = snapshot.iter().filter(|order| order.is_active()).count();
        let report = classify_rush(&snapshot, &self.local_now(), &self.config.rush);

        debug!(active, level = report.level.as_str(), "load metrics refreshed");
        self.metrics.record_load(active, report.level);
    }
}
