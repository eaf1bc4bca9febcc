use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::engine::rush::RushLevel;

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_placed_total: IntCounter,
    pub order_status_transitions_total: IntCounterVec,
    pub active_orders: IntGauge,
    pub rush_level: IntGauge,
    pub complaints_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_placed_total =
            IntCounter::new("orders_placed_total", "Total orders placed through checkout")
                .expect("valid orders_placed_total metric");

        let order_status_transitions_total = IntCounterVec::new(
            Opts::new(
                "order_status_transitions_total",
                "Order status advancements by target status",
            ),
            &["status"],
        )
        .expect("valid order_status_transitions_total metric");

        let active_orders = IntGauge::new("active_orders", "Orders not yet completed")
            .expect("valid active_orders metric");

        let rush_level = IntGauge::new("rush_level", "Current rush level (0=low, 1=medium, 2=high)")
            .expect("valid rush_level metric");

        let complaints_total = IntCounterVec::new(
            Opts::new("complaints_total", "Complaints filed by kind"),
            &["kind"],
        )
        .expect("valid complaints_total metric");

        registry
            .register(Box::new(orders_placed_total.clone()))
            .expect("register orders_placed_total");
        registry
            .register(Box::new(order_status_transitions_total.clone()))
            .expect("register order_status_transitions_total");
        registry
            .register(Box::new(active_orders.clone()))
            .expect("register active_orders");
        registry
            .register(Box::new(rush_level.clone()))
            .expect("register rush_level");
        registry
            .register(Box::new(complaints_total.clone()))
            .expect("register complaints_total");

        Self {
            registry,
            orders_placed_total,
            order_status_transitions_total,
            active_orders,
            rush_level,
            complaints_total,
        }
    }

    pub fn record_load(&self, active: usize, level: RushLevel) {
        self.active_orders.set(active as i64);
        self.rush_level.set(match level {
            RushLevel::Low => 0,
            RushLevel::Medium => 1,
            RushLevel::High => 2,
        });
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
