// storefront/src/models/item.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A product in the catalog. The cart and checkout flows never modify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Item {
  pub id: Uuid,
  pub title: String,
  pub price_cents: i32,
  pub discount_price_cents: Option<i32>,
  pub category_id: i32,
  pub slug: String, // unique
  pub description: String,
  pub image: String,
  pub created_at: DateTime<Utc>,
}

/// Catalog listing filter. Both parts are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
  pub category_id: Option<i32>,
  /// Case-insensitive substring of the title.
  pub title_contains: Option<String>,
}

impl ItemFilter {
  pub fn matches(&self, item: &Item) -> bool {
    if let Some(category_id) = self.category_id {
      if item.category_id != category_id {
        return false;
      }
    }
    match &self.title_contains {
      Some(needle) => item.title.to_lowercase().contains(&needle.to_lowercase()),
      None => true,
    }
  }
}
