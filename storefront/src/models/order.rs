// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::{Address, Coupon, OrderLine};

/// A user's order. The one with `ordered == false` is the user's cart; there
/// is at most one such order per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub ref_code: Option<String>,
  pub start_date: DateTime<Utc>,
  pub ordered_date: DateTime<Utc>,
  pub ordered: bool,
  pub shipping_address_id: Option<Uuid>,
  pub billing_address_id: Option<Uuid>,
  pub coupon_id: Option<Uuid>,
  pub being_delivered: bool,
  pub received: bool,
  pub refund_requested: bool,
  pub refund_granted: bool,
}

impl Order {
  /// A fresh, empty cart for `user_id`.
  pub fn new_active(user_id: Uuid, now: DateTime<Utc>) -> Self {
    Self {
      id: Uuid::new_v4(),
      user_id,
      ref_code: None,
      start_date: now,
      ordered_date: now,
      ordered: false,
      shipping_address_id: None,
      billing_address_id: None,
      coupon_id: None,
      being_delivered: false,
      received: false,
      refund_requested: false,
      refund_granted: false,
    }
  }
}

/// Read-only projection of an order for the summary, checkout and payment pages.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
  pub order: Order,
  pub lines: Vec<OrderLine>,
  pub coupon: Option<Coupon>,
  pub shipping_address: Option<Address>,
  pub billing_address: Option<Address>,
  pub total_cents: i64,
}

impl OrderSummary {
  pub fn new(
    order: Order,
    lines: Vec<OrderLine>,
    coupon: Option<Coupon>,
    shipping_address: Option<Address>,
    billing_address: Option<Address>,
  ) -> Self {
    let total_cents = order_total_cents(&lines, coupon.as_ref());
    Self {
      order,
      lines,
      coupon,
      shipping_address,
      billing_address,
      total_cents,
    }
  }
}

/// Sum of final line prices minus the coupon amount, never below zero.
pub fn order_total_cents(lines: &[OrderLine], coupon: Option<&Coupon>) -> i64 {
  let gross: i64 = lines.iter().map(|l| l.final_price_cents).sum();
  let discount = coupon.map_or(0, |c| i64::from(c.amount_cents));
  (gross - discount).max(0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Item, OrderItem};

  fn item(price: i32, discount: Option<i32>) -> Item {
    Item {
      id: Uuid::new_v4(),
      title: "Linen Shirt".to_string(),
      price_cents: price,
      discount_price_cents: discount,
      category_id: 1,
      slug: "linen-shirt".to_string(),
      description: String::new(),
      image: "linen-shirt.jpg".to_string(),
      created_at: Utc::now(),
    }
  }

  fn line(item: &Item, quantity: i32) -> OrderLine {
    let order_item = OrderItem {
      id: Uuid::new_v4(),
      order_id: Uuid::new_v4(),
      user_id: Uuid::new_v4(),
      item_id: item.id,
      ordered: false,
      quantity,
    };
    OrderLine::new(order_item, item.clone())
  }

  fn coupon(amount: i32) -> Coupon {
    Coupon {
      id: Uuid::new_v4(),
      code: "SPRING".to_string(),
      amount_cents: amount,
    }
  }

  #[test]
  fn line_without_discount_charges_full_price() {
    let l = line(&item(2500, None), 3);
    assert_eq!(l.total_price_cents, 7500);
    assert_eq!(l.discounted_total_cents, None);
    assert_eq!(l.amount_saved_cents, 0);
    assert_eq!(l.final_price_cents, 7500);
  }

  #[test]
  fn discounted_line_reports_savings() {
    let l = line(&item(2500, Some(2000)), 2);
    assert_eq!(l.total_price_cents, 5000);
    assert_eq!(l.discounted_total_cents, Some(4000));
    assert_eq!(l.amount_saved_cents, 1000);
    assert_eq!(l.final_price_cents, 4000);
  }

  #[test]
  fn coupon_is_subtracted_from_order_total() {
    let lines = vec![line(&item(2500, Some(2000)), 2), line(&item(999, None), 1)];
    assert_eq!(order_total_cents(&lines, None), 4999);
    assert_eq!(order_total_cents(&lines, Some(&coupon(1000))), 3999);
  }

  #[test]
  fn coupon_larger_than_order_floors_total_at_zero() {
    let lines = vec![line(&item(500, None), 1)];
    assert_eq!(order_total_cents(&lines, Some(&coupon(1000))), 0);
    assert_eq!(order_total_cents(&[], Some(&coupon(1000))), 0);
  }
}
