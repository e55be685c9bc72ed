// storefront/src/models/order_item.rs

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::Item;

/// One product line of an order. Quantity is always at least 1; a line that
/// would drop to zero is deleted instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub user_id: Uuid,
  pub item_id: Uuid,
  pub ordered: bool,
  pub quantity: i32,
}

/// What a single-unit removal did to a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDecrement {
  Decremented(OrderItem),
  Deleted,
  /// The line was already gone.
  Missing,
}

/// A line joined with its item, carrying the computed prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
  #[serde(flatten)]
  pub line: OrderItem,
  pub item: Item,
  pub total_price_cents: i64,
  pub discounted_total_cents: Option<i64>,
  pub amount_saved_cents: i64,
  pub final_price_cents: i64,
}

impl OrderLine {
  pub fn new(line: OrderItem, item: Item) -> Self {
    let quantity = i64::from(line.quantity);
    let total_price_cents = quantity * i64::from(item.price_cents);
    let discounted_total_cents = item.discount_price_cents.map(|d| quantity * i64::from(d));
    let amount_saved_cents = discounted_total_cents.map_or(0, |d| total_price_cents - d);
    let final_price_cents = discounted_total_cents.unwrap_or(total_price_cents);
    Self {
      line,
      item,
      total_price_cents,
      discounted_total_cents,
      amount_saved_cents,
      final_price_cents,
    }
  }
}
