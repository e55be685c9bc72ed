// storefront/src/models/refund.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Refund {
  pub id: Uuid,
  pub order_id: Uuid,
  pub reason: String,
  pub accepted: bool,
  pub email: String,
  pub created_at: DateTime<Utc>,
}
