use chrono::{DateTime, Duration, TimeZone, Timelike};
use serde::Serialize;

use crate::models::order::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RushThresholds {
    pub high_hour_orders: usize,
    pub high_pending: usize,
    pub medium_hour_orders: usize,
    pub medium_pending: usize,
    pub high_wait_minutes: u32,
    pub medium_wait_minutes: u32,
    pub low_wait_minutes: u32,
}

impl Default for RushThresholds {
    fn default() -> Self {
        Self {
            high_hour_orders: 15,
            high_pending: 10,
            medium_hour_orders: 8,
            medium_pending: 5,
            high_wait_minutes: 20,
            medium_wait_minutes: 12,
            low_wait_minutes: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RushLevel {
    Low,
    Medium,
    High,
}

impl RushLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RushLevel::Low => "low",
            RushLevel::Medium => "medium",
            RushLevel::High => "high",
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            RushLevel::Low => {
                "Great time to order! The canteen is not busy right now. Quick service expected!"
            }
            RushLevel::Medium => {
                "Moderately busy. Your order will be prepared soon, but there might be a slight wait."
            }
            RushLevel::High => {
                "It's very busy right now! Consider ordering for a later time or expect longer wait times."
            }
        }
    }

    pub fn tip(self) -> &'static str {
        match self {
            RushLevel::Low => "Perfect time to grab your favorite meal without the wait!",
            RushLevel::Medium => "Pre-order now for later pickup to skip the queue!",
            RushLevel::High => "Consider waiting 30-45 minutes or ordering for later pickup.",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RushReport {
    pub level: RushLevel,
    pub current_hour_count: usize,
    pub next_hour_count: usize,
    pub pending_count: usize,
    pub estimated_wait_minutes: u32,
    pub message: &'static str,
    pub tip: &'static str,
}

impl RushReport {
    pub fn status_message<Tz>(&self, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        format!(
            "Live canteen status ({})\n\n{}\n\nCurrent stats:\n\
             - Orders in queue: {}\n\
             - This hour: {} orders\n\
             - Next hour: {} orders\n\
             - Estimated wait: ~{} mins\n\n\
             Tip: {}",
            now.format("%H:%M"),
            self.message,
            self.pending_count,
            self.current_hour_count,
            self.next_hour_count,
            self.estimated_wait_minutes,
            self.tip,
        )
    }
}

/// Buckets active orders by pickup hour in `now`'s zone and grades the load.
/// High is checked before medium; the first match wins.
pub fn classify_rush<Tz: TimeZone>(
    orders: &[Order],
    now: &DateTime<Tz>,
    thresholds: &RushThresholds,
) -> RushReport {
    let current_hour = now.hour();
    let next_hour = (current_hour + 1) % 24;
    let zone = now.timezone();

    let (current_hour_count, next_hour_count) = orders
        .iter()
        .filter(|order| order.is_active())
        .map(|order| order.pickup_time.with_timezone(&zone).hour())
        .fold((0, 0), |(current, next), hour| {
            (
                current + usize::from(hour == current_hour),
                next + usize::from(hour == next_hour),
            )
        });

    let pending_count = orders
        .iter()
        .filter(|order| order.status.is_in_kitchen())
        .count();

    let (level, estimated_wait_minutes) = if current_hour_count > thresholds.high_hour_orders
        || pending_count > thresholds.high_pending
    {
        (RushLevel::High, thresholds.high_wait_minutes)
    } else if current_hour_count > thresholds.medium_hour_orders
        || pending_count > thresholds.medium_pending
    {
        (RushLevel::Medium, thresholds.medium_wait_minutes)
    } else {
        (RushLevel::Low, thresholds.low_wait_minutes)
    };

    RushReport {
        level,
        current_hour_count,
        next_hour_count,
        pending_count,
        estimated_wait_minutes,
        message: level.recommendation(),
        tip: level.tip(),
    }
}

pub fn best_time_to_visit<Tz: TimeZone>(report: &RushReport, now: &DateTime<Tz>) -> DateTime<Tz> {
    match report.level {
        RushLevel::High => now.clone() + Duration::hours(1),
        RushLevel::Medium | RushLevel::Low => now.clone(),
    }
}
