use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::menu::MenuItem;
use crate::models::order::{Order, OrderItem, OrderStatus};

const PICKUP_BUFFER_MINUTES: i64 = 5;
const PICKUP_SLOT_MINUTES: i64 = 15;
const PICKUP_SLOT_COUNT: i64 = 8;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDetails {
    pub student_name: String,
    pub pickup_time: DateTime<Utc>,
    #[serde(default)]
    pub is_group_order: bool,
    #[serde(default)]
    pub group_members: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<OrderItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` of `menu_item`, merging with an existing line for the same item.
    pub fn add(&mut self, menu_item: MenuItem, quantity: u32) {
        match self
            .items
            .iter_mut()
            .find(|line| line.menu_item.id == menu_item.id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.items.push(OrderItem {
                menu_item,
                quantity,
            }),
        }
    }

    /// Zero removes the line.
    pub fn update_quantity(&mut self, menu_item_id: Uuid, quantity: u32) {
        if quantity == 0 {
            self.remove(menu_item_id);
            return;
        }

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.menu_item.id == menu_item_id)
        {
            line.quantity = quantity;
        }
    }

    pub fn remove(&mut self, menu_item_id: Uuid) {
        self.items.retain(|line| line.menu_item.id != menu_item_id);
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }

    pub fn total_price(&self) -> Result<u32, AppError> {
        self.items.iter().try_fold(0u32, |total, line| {
            line.line_total()
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or_else(|| AppError::Validation("order total is too large".to_string()))
        })
    }

    /// Slowest line bounds the wait.
    pub fn estimated_prep_minutes(&self) -> u32 {
        self.items
            .iter()
            .map(|line| line.menu_item.prep_time)
            .max()
            .unwrap_or(0)
    }

    pub fn checkout(self, details: CheckoutDetails, now: DateTime<Utc>) -> Result<Order, AppError> {
        if self.is_empty() {
            return Err(AppError::Validation("cart is empty".to_string()));
        }

        let student_name = details.student_name.trim().to_string();
        if student_name.is_empty() {
            return Err(AppError::Validation("student name cannot be empty".to_string()));
        }

        if details.pickup_time <= now {
            return Err(AppError::Validation(
                "pickup time must be in the future".to_string(),
            ));
        }

        for line in &self.items {
            if line.quantity == 0 {
                return Err(AppError::Validation(format!(
                    "quantity for {} must be > 0",
                    line.menu_item.name
                )));
            }
            if !line.menu_item.available {
                return Err(AppError::Validation(format!(
                    "{} is not available",
                    line.menu_item.name
                )));
            }
        }

        let total_price = self.total_price()?;
        let group_members = details
            .is_group_order
            .then(|| dedup_members(details.group_members));

        Ok(Order {
            id: Uuid::new_v4(),
            token: issue_token(),
            student_name,
            items: self.items,
            total_price,
            pickup_time: details.pickup_time,
            order_time: now,
            status: OrderStatus::Pending,
            is_group_order: details.is_group_order,
            group_members,
        })
    }
}

/// Selectable pickup times: the first leaves room for the slowest line plus a buffer.
pub fn pickup_slots(cart: &Cart, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let earliest = now
        + Duration::minutes(i64::from(cart.estimated_prep_minutes()) + PICKUP_BUFFER_MINUTES);

    (0..PICKUP_SLOT_COUNT)
        .map(|slot| earliest + Duration::minutes(slot * PICKUP_SLOT_MINUTES))
        .collect()
}

fn dedup_members(members: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(members.len());
    for member in members {
        let member = member.trim();
        if !member.is_empty() && !unique.iter().any(|known| known == member) {
            unique.push(member.to_string());
        }
    }
    unique
}

fn issue_token() -> String {
    let digits = 100 + Uuid::new_v4().as_u128() % 900;
    format!("T{digits}")
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::models::menu::{Category, MenuItem};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    fn item(seed: u128, price: u32, prep_time: u32) -> MenuItem {
        MenuItem {
            id: Uuid::from_u128(seed),
            name: format!("item-{seed}"),
            category: Category::Snacks,
            price,
            available: true,
            stock: 10,
            prep_time,
            description: String::new(),
            image: String::new(),
        }
    }

    fn details(pickup_in: Duration) -> CheckoutDetails {
        CheckoutDetails {
            student_name: "Arjun".to_string(),
            pickup_time: now() + pickup_in,
            is_group_order: false,
            group_members: Vec::new(),
        }
    }

    #[test]
    fn adding_the_same_item_merges_quantities() {
        let mut cart = Cart::new();
        cart.add(item(1, 120, 8), 1);
        cart.add(item(2, 50, 6), 2);
        cart.add(item(1, 120, 8), 2);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total_price().unwrap(), 460);
        assert_eq!(cart.estimated_prep_minutes(), 8);
    }

    #[test]
    fn zero_quantity_update_removes_line() {
        let mut cart = Cart::new();
        cart.add(item(1, 120, 8), 1);
        cart.add(item(2, 50, 6), 1);

        cart.update_quantity(Uuid::from_u128(2), 4);
        assert_eq!(cart.items()[1].quantity, 4);

        cart.update_quantity(Uuid::from_u128(1), 0);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].menu_item.id, Uuid::from_u128(2));
    }

    #[test]
    fn checkout_freezes_total_and_starts_pending() {
        let mut cart = Cart::new();
        cart.add(item(1, 150, 10), 2);
        cart.add(item(2, 30, 2), 1);

        let order = cart.checkout(details(Duration::minutes(30)), now()).unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_price, 330);
        assert_eq!(order.order_time, now());
        assert_eq!(order.pickup_time, now() + Duration::minutes(30));
        assert_eq!(order.group_members, None);

        let digits: u32 = order.token.trim_start_matches('T').parse().unwrap();
        assert!(order.token.starts_with('T'));
        assert!((100..=999).contains(&digits));
    }

    #[test]
    fn checkout_rejects_invalid_submissions() {
        let empty = Cart::new().checkout(details(Duration::minutes(30)), now());
        assert!(matches!(empty, Err(AppError::Validation(_))));

        let mut cart = Cart::new();
        cart.add(item(1, 150, 10), 1);

        let mut nameless = details(Duration::minutes(30));
        nameless.student_name = "   ".to_string();
        assert!(cart.clone().checkout(nameless, now()).is_err());

        assert!(cart.clone().checkout(details(Duration::zero()), now()).is_err());
        assert!(cart.clone().checkout(details(Duration::minutes(-5)), now()).is_err());

        let mut sold_out = Cart::new();
        let mut unavailable = item(3, 80, 8);
        unavailable.available = false;
        sold_out.add(unavailable, 1);
        assert!(sold_out.checkout(details(Duration::minutes(30)), now()).is_err());

        let mut zero = Cart::new();
        zero.add(item(4, 80, 8), 0);
        assert!(zero.checkout(details(Duration::minutes(30)), now()).is_err());
    }

    #[test]
    fn group_members_are_trimmed_and_unique() {
        let mut cart = Cart::new();
        cart.add(item(1, 150, 10), 3);

        let mut group = details(Duration::minutes(30));
        group.is_group_order = true;
        group.group_members = vec![
            " Meera ".to_string(),
            "Kabir".to_string(),
            "Meera".to_string(),
            String::new(),
        ];

        let order = cart.checkout(group, now()).unwrap();

        assert!(order.is_group_order);
        assert_eq!(
            order.group_members,
            Some(vec!["Meera".to_string(), "Kabir".to_string()])
        );
    }

    #[test]
    fn pickup_slots_start_after_slowest_prep_plus_buffer() {
        let mut cart = Cart::new();
        cart.add(item(1, 150, 12), 1);
        cart.add(item(2, 30, 5), 1);

        let slots = pickup_slots(&cart, now());

        assert_eq!(slots.len(), 8);
        assert_eq!(slots[0], now() + Duration::minutes(17));
        assert_eq!(slots[7], now() + Duration::minutes(17 + 7 * 15));
    }

    #[test]
    fn total_overflow_is_a_validation_error() {
        let mut cart = Cart::new();
        cart.add(item(1, u32::MAX, 1), 2);
        assert!(matches!(cart.total_price(), Err(AppError::Validation(_))));
    }
}
