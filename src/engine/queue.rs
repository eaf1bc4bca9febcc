use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};

const MILLIS_PER_MINUTE: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueThresholds {
    pub urgent_minutes: i64,
    pub soon_minutes: i64,
}

impl Default for QueueThresholds {
    fn default() -> Self {
        Self {
            urgent_minutes: 5,
            soon_minutes: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Urgent,
    Soon,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub rank: usize,
    pub order: Order,
    pub minutes_until_pickup: i64,
    pub urgency: Option<Urgency>,
    pub next_status: Option<OrderStatus>,
    pub action: Option<&'static str>,
}

/// Active orders in the sequence the kitchen should work through them:
/// earliest pickup first, then earliest submission. Exact ties keep input order.
pub fn rank_active_orders(orders: &[Order]) -> Vec<Order> {
    let mut active: Vec<Order> = orders
        .iter()
        .filter(|order| order.is_active())
        .cloned()
        .collect();

    active.sort_by_key(|order| (order.pickup_time, order.order_time));
    active
}

/// Whole minutes until pickup, floored; past-due pickups are negative.
pub fn minutes_until_pickup(order: &Order, now: DateTime<Utc>) -> i64 {
    (order.pickup_time - now)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_MINUTE)
}

pub fn urgency(order: &Order, now: DateTime<Utc>, thresholds: &QueueThresholds) -> Option<Urgency> {
    let minutes = minutes_until_pickup(order, now);

    if minutes < thresholds.urgent_minutes {
        Some(Urgency::Urgent)
    } else if minutes < thresholds.soon_minutes {
        Some(Urgency::Soon)
    } else {
        None
    }
}

pub fn queue_view(
    orders: &[Order],
    now: DateTime<Utc>,
    thresholds: &QueueThresholds,
) -> Vec<QueueEntry> {
    rank_active_orders(orders)
        .into_iter()
        .enumerate()
        .map(|(index, order)| QueueEntry {
            rank: index + 1,
            minutes_until_pickup: minutes_until_pickup(&order, now),
            urgency: urgency(&order, now, thresholds),
            next_status: order.status.next(),
            action: order.status.action_label(),
            order,
        })
        .collect()
}

/// Moves `order` one step forward. `requested` must be exactly the next status.
/// Returns the status the order left.
pub fn advance_status(order: &mut Order, requested: OrderStatus) -> Result<OrderStatus, AppError> {
    let current = order.status;
    let Some(next) = current.next() else {
        return Err(AppError::Conflict(format!(
            "order {} is already completed",
            order.id
        )));
    };

    if requested != next {
        return Err(AppError::Conflict(format!(
            "order {} cannot move from {} to {}; next status is {}",
            order.id,
            current.as_str(),
            requested.as_str(),
            next.as_str()
        )));
    }

    order.status = next;
    Ok(current)
}

/// Decodes a JSON order snapshot. Every order must carry an RFC 3339 `pickupTime`.
pub fn decode_orders(snapshot: Value) -> Result<Vec<Order>, AppError> {
    let Value::Array(entries) = snapshot else {
        return Err(AppError::BadRequest(
            "order snapshot must be a JSON array".to_string(),
        ));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            match entry.get("pickupTime") {
                Some(Value::String(raw)) => {
                    DateTime::parse_from_rfc3339(raw).map_err(|err| {
                        AppError::Validation(format!(
                            "order at index {index} has invalid pickupTime {raw:?}: {err}"
                        ))
                    })?;
                }
                Some(Value::Null) | None => {
                    return Err(AppError::Validation(format!(
                        "order at index {index} is missing pickupTime"
                    )));
                }
                Some(other) => {
                    return Err(AppError::Validation(format!(
                        "order at index {index} has non-string pickupTime {other}"
                    )));
                }
            }

            serde_json::from_value::<Order>(entry).map_err(|err| {
                AppError::BadRequest(format!("order at index {index} is malformed: {err}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::models::order::{Order, OrderStatus};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 30, 0).unwrap()
    }

    fn order(seed: u128, pickup_in: Duration, ordered_ago: Duration, status: OrderStatus) -> Order {
        Order {
            id: Uuid::from_u128(seed),
            token: format!("T{}", 100 + seed),
            student_name: "test-student".to_string(),
            items: Vec::new(),
            total_price: 0,
            pickup_time: now() + pickup_in,
            order_time: now() - ordered_ago,
            status,
            is_group_order: false,
            group_members: None,
        }
    }

    fn ids(orders: &[Order]) -> Vec<Uuid> {
        orders.iter().map(|order| order.id).collect()
    }

    #[test]
    fn ranks_three_orders_by_pickup_time() {
        let orders = vec![
            order(3, Duration::minutes(20), Duration::minutes(1), OrderStatus::Pending),
            order(1, Duration::minutes(10), Duration::minutes(1), OrderStatus::Ready),
            order(2, Duration::minutes(15), Duration::minutes(1), OrderStatus::Preparing),
        ];

        let ranked = rank_active_orders(&orders);

        assert_eq!(
            ids(&ranked),
            vec![Uuid::from_u128(1), Uuid::from_u128(2), Uuid::from_u128(3)]
        );
    }

    #[test]
    fn completed_orders_never_ranked() {
        let orders = vec![
            order(1, Duration::minutes(10), Duration::minutes(5), OrderStatus::Completed),
            order(2, Duration::minutes(30), Duration::minutes(5), OrderStatus::Pending),
            order(3, Duration::minutes(-5), Duration::minutes(20), OrderStatus::Completed),
        ];

        let ranked = rank_active_orders(&orders);

        assert_eq!(ids(&ranked), vec![Uuid::from_u128(2)]);
        assert!(ranked.iter().all(|order| order.status != OrderStatus::Completed));
    }

    #[test]
    fn equal_pickup_breaks_tie_on_earlier_submission() {
        let orders = vec![
            order(1, Duration::minutes(10), Duration::minutes(2), OrderStatus::Pending),
            order(2, Duration::minutes(10), Duration::minutes(9), OrderStatus::Pending),
        ];

        let ranked = rank_active_orders(&orders);

        assert_eq!(ids(&ranked), vec![Uuid::from_u128(2), Uuid::from_u128(1)]);
    }

    #[test]
    fn exact_ties_keep_input_order() {
        let orders: Vec<Order> = (1..=4)
            .map(|seed| order(seed, Duration::minutes(10), Duration::minutes(3), OrderStatus::Pending))
            .collect();

        let ranked = rank_active_orders(&orders);

        assert_eq!(ids(&ranked), ids(&orders));
    }

    #[test]
    fn past_due_pickups_rank_first() {
        let orders = vec![
            order(1, Duration::minutes(5), Duration::minutes(1), OrderStatus::Pending),
            order(2, Duration::minutes(-12), Duration::minutes(40), OrderStatus::Ready),
        ];

        let ranked = rank_active_orders(&orders);

        assert_eq!(ids(&ranked), vec![Uuid::from_u128(2), Uuid::from_u128(1)]);
    }

    #[test]
    fn ranking_is_sorted_and_repeatable() {
        let orders: Vec<Order> = [(40, 3), (5, 1), (25, 9), (5, 7), (-3, 30), (25, 2)]
            .into_iter()
            .enumerate()
            .map(|(index, (pickup, ago))| {
                order(
                    index as u128,
                    Duration::minutes(pickup),
                    Duration::minutes(ago),
                    OrderStatus::Preparing,
                )
            })
            .collect();

        let first = rank_active_orders(&orders);
        let second = rank_active_orders(&orders);
        assert_eq!(ids(&first), ids(&second));

        for pair in first.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.pickup_time < b.pickup_time
                    || (a.pickup_time == b.pickup_time && a.order_time <= b.order_time)
            );
        }
    }

    #[test]
    fn empty_input_ranks_to_empty_output() {
        assert!(rank_active_orders(&[]).is_empty());
        assert!(queue_view(&[], now(), &QueueThresholds::default()).is_empty());
    }

    #[test]
    fn urgency_bands_follow_thresholds() {
        let thresholds = QueueThresholds::default();
        let cases = [
            (Duration::minutes(-10), Some(Urgency::Urgent)),
            (Duration::minutes(4), Some(Urgency::Urgent)),
            (Duration::minutes(5), Some(Urgency::Soon)),
            (Duration::minutes(14), Some(Urgency::Soon)),
            (Duration::minutes(15), None),
            (Duration::minutes(45), None),
        ];

        for (pickup_in, expected) in cases {
            let order = order(1, pickup_in, Duration::zero(), OrderStatus::Pending);
            assert_eq!(urgency(&order, now(), &thresholds), expected, "{pickup_in}");
        }
    }

    #[test]
    fn minutes_until_pickup_floors() {
        let almost_five = order(1, Duration::seconds(299), Duration::zero(), OrderStatus::Pending);
        assert_eq!(minutes_until_pickup(&almost_five, now()), 4);

        let just_missed = order(2, Duration::seconds(-30), Duration::zero(), OrderStatus::Pending);
        assert_eq!(minutes_until_pickup(&just_missed, now()), -1);
    }

    #[test]
    fn queue_view_annotates_rank_and_next_action() {
        let orders = vec![
            order(1, Duration::minutes(30), Duration::minutes(1), OrderStatus::Pending),
            order(2, Duration::minutes(3), Duration::minutes(8), OrderStatus::Ready),
        ];

        let view = queue_view(&orders, now(), &QueueThresholds::default());

        assert_eq!(view.len(), 2);
        assert_eq!(view[0].rank, 1);
        assert_eq!(view[0].order.id, Uuid::from_u128(2));
        assert_eq!(view[0].urgency, Some(Urgency::Urgent));
        assert_eq!(view[0].next_status, Some(OrderStatus::Completed));
        assert_eq!(view[0].action, Some("Complete"));
        assert_eq!(view[1].rank, 2);
        assert_eq!(view[1].urgency, None);
        assert_eq!(view[1].action, Some("Start Preparing"));
    }

    #[test]
    fn advance_status_only_accepts_the_next_step() {
        let mut order = order(1, Duration::minutes(10), Duration::zero(), OrderStatus::Pending);

        assert!(matches!(
            advance_status(&mut order, OrderStatus::Ready),
            Err(AppError::Conflict(_))
        ));
        assert_eq!(order.status, OrderStatus::Pending);

        assert_eq!(
            advance_status(&mut order, OrderStatus::Preparing).unwrap(),
            OrderStatus::Pending
        );
        assert!(advance_status(&mut order, OrderStatus::Pending).is_err());
        advance_status(&mut order, OrderStatus::Ready).unwrap();
        advance_status(&mut order, OrderStatus::Completed).unwrap();

        assert!(matches!(
            advance_status(&mut order, OrderStatus::Completed),
            Err(AppError::Conflict(_))
        ));
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[test]
    fn decode_rejects_missing_or_invalid_pickup_time() {
        let valid = serde_json::to_value(order(
            1,
            Duration::minutes(10),
            Duration::zero(),
            OrderStatus::Pending,
        ))
        .unwrap();

        let mut missing = valid.clone();
        missing.as_object_mut().unwrap().remove("pickupTime");
        assert!(matches!(
            decode_orders(json!([valid.clone(), missing])),
            Err(AppError::Validation(msg)) if msg.contains("index 1")
        ));

        let mut garbled = valid.clone();
        garbled["pickupTime"] = json!("half past noon");
        assert!(matches!(
            decode_orders(json!([garbled])),
            Err(AppError::Validation(_))
        ));

        let mut null = valid.clone();
        null["pickupTime"] = Value::Null;
        assert!(matches!(decode_orders(json!([null])), Err(AppError::Validation(_))));

        let decoded = decode_orders(json!([valid])).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn decode_rejects_non_array_snapshot() {
        assert!(matches!(
            decode_orders(json!({ "orders": [] })),
            Err(AppError::BadRequest(_))
        ));
    }
}
