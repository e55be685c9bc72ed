// storefront/src/models/coupon.rs

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Coupon {
  pub id: Uuid,
  pub code: String,
  pub amount_cents: i32,
}
