// storefront/src/store/postgres.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{
  Address, AddressType, Category, Coupon, Item, ItemFilter, LineDecrement, NewAddress, Order, OrderItem, Refund,
};
use crate::store::Store;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

const ITEM_COLUMNS: &str =
  "id, title, price_cents, discount_price_cents, category_id, slug, description, image, created_at";
const ORDER_COLUMNS: &str = "id, user_id, ref_code, start_date, ordered_date, ordered, shipping_address_id, \
  billing_address_id, coupon_id, being_delivered, received, refund_requested, refund_granted";
const ORDER_ITEM_COLUMNS: &str = "id, order_id, user_id, item_id, ordered, quantity";
const ADDRESS_COLUMNS: &str =
  "id, user_id, street_address, apartment_address, country, zip, address_type, is_default, created_at";

/// Postgres-backed store using runtime-checked queries.
#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPool::connect(database_url).await.map_err(|e| {
      error!("Failed to connect to the database: {}", e);
      AppError::Sqlx(e)
    })?;
    info!("Successfully connected to the database.");
    Ok(Self::new(pool))
  }

  /// Creates tables, enum types and indexes that do not exist yet.
  #[instrument(skip(self))]
  pub async fn apply_schema(&self) -> Result<()> {
    sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
    info!("Database schema is up to date.");
    Ok(())
  }
}

/// ILIKE pattern matching `needle` literally anywhere in the text.
fn contains_pattern(needle: &str) -> String {
  let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
  format!("%{}%", escaped)
}

const ITEM_FILTER_SQL: &str =
  "($1::int4 IS NULL OR category_id = $1) AND ($2::text IS NULL OR title ILIKE $2)";

#[async_trait]
impl Store for PgStore {
  async fn list_items(&self, filter: &ItemFilter, limit: i64, offset: i64) -> Result<Vec<Item>> {
    let sql = format!(
      "SELECT {} FROM items WHERE {} ORDER BY title ASC, id ASC LIMIT $3 OFFSET $4",
      ITEM_COLUMNS, ITEM_FILTER_SQL
    );
    let items = sqlx::query_as::<_, Item>(&sql)
      .bind(filter.category_id)
      .bind(filter.title_contains.as_deref().map(contains_pattern))
      .bind(limit)
      .bind(offset)
      .fetch_all(&self.pool)
      .await?;
    Ok(items)
  }

  async fn count_items(&self, filter: &ItemFilter) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM items WHERE {}", ITEM_FILTER_SQL);
    let count: i64 = sqlx::query_scalar(&sql)
      .bind(filter.category_id)
      .bind(filter.title_contains.as_deref().map(contains_pattern))
      .fetch_one(&self.pool)
      .await?;
    Ok(count)
  }

  async fn item_by_slug(&self, slug: &str) -> Result<Option<Item>> {
    let sql = format!("SELECT {} FROM items WHERE slug = $1", ITEM_COLUMNS);
    Ok(sqlx::query_as::<_, Item>(&sql).bind(slug).fetch_optional(&self.pool).await?)
  }

  async fn items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Item>> {
    let sql = format!("SELECT {} FROM items WHERE id = ANY($1)", ITEM_COLUMNS);
    Ok(sqlx::query_as::<_, Item>(&sql).bind(ids).fetch_all(&self.pool).await?)
  }

  async fn category(&self, id: i32) -> Result<Option<Category>> {
    Ok(
      sqlx::query_as::<_, Category>("SELECT id, title, slug FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn insert_category(&self, title: &str, slug: &str) -> Result<Category> {
    Ok(
      sqlx::query_as::<_, Category>("INSERT INTO categories (title, slug) VALUES ($1, $2) RETURNING id, title, slug")
        .bind(title)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  async fn insert_item(&self, item: &Item) -> Result<()> {
    sqlx::query(
      "INSERT INTO items (id, title, price_cents, discount_price_cents, category_id, slug, description, image, created_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(item.id)
    .bind(&item.title)
    .bind(item.price_cents)
    .bind(item.discount_price_cents)
    .bind(item.category_id)
    .bind(&item.slug)
    .bind(&item.description)
    .bind(&item.image)
    .bind(item.created_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn active_order(&self, user_id: Uuid) -> Result<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE user_id = $1 AND NOT ordered", ORDER_COLUMNS);
    Ok(sqlx::query_as::<_, Order>(&sql).bind(user_id).fetch_optional(&self.pool).await?)
  }

  #[instrument(skip(self))]
  async fn get_or_create_active_order(&self, user_id: Uuid) -> Result<Order> {
    // The partial unique index orders_one_active_per_user turns a concurrent
    // second insert into a no-op; both callers then read the same row.
    let now = Utc::now();
    sqlx::query(
      "INSERT INTO orders (id, user_id, start_date, ordered_date, ordered) VALUES ($1, $2, $3, $3, FALSE) \
       ON CONFLICT (user_id) WHERE NOT ordered DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(now)
    .execute(&self.pool)
    .await?;

    self
      .active_order(user_id)
      .await?
      .ok_or_else(|| AppError::Internal(format!("Active order for user {} vanished after upsert", user_id)))
  }

  async fn order_by_ref_code(&self, ref_code: &str) -> Result<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE ref_code = $1", ORDER_COLUMNS);
    Ok(sqlx::query_as::<_, Order>(&sql).bind(ref_code).fetch_optional(&self.pool).await?)
  }

  async fn set_order_shipping_address(&self, order_id: Uuid, address_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE orders SET shipping_address_id = $2 WHERE id = $1")
      .bind(order_id)
      .bind(address_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn set_order_billing_address(&self, order_id: Uuid, address_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE orders SET billing_address_id = $2 WHERE id = $1")
      .bind(order_id)
      .bind(address_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn set_order_coupon(&self, order_id: Uuid, coupon_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE orders SET coupon_id = $2 WHERE id = $1")
      .bind(order_id)
      .bind(coupon_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  #[instrument(skip(self, reason, email))]
  async fn request_refund(&self, order_id: Uuid, reason: &str, email: &str) -> Result<Refund> {
    let mut tx = self.pool.begin().await?;
    sqlx::query("UPDATE orders SET refund_requested = TRUE WHERE id = $1")
      .bind(order_id)
      .execute(&mut *tx)
      .await?;
    let refund = sqlx::query_as::<_, Refund>(
      "INSERT INTO refunds (id, order_id, reason, accepted, email, created_at) VALUES ($1, $2, $3, FALSE, $4, $5) \
       RETURNING id, order_id, reason, accepted, email, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(order_id)
    .bind(reason)
    .bind(email)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(refund)
  }

  async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
    let sql = format!("SELECT {} FROM order_items WHERE order_id = $1 ORDER BY id", ORDER_ITEM_COLUMNS);
    Ok(sqlx::query_as::<_, OrderItem>(&sql).bind(order_id).fetch_all(&self.pool).await?)
  }

  async fn find_order_item(&self, order_id: Uuid, item_id: Uuid) -> Result<Option<OrderItem>> {
    let sql = format!("SELECT {} FROM order_items WHERE order_id = $1 AND item_id = $2", ORDER_ITEM_COLUMNS);
    Ok(
      sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn increment_order_item(&self, order_id: Uuid, user_id: Uuid, item_id: Uuid) -> Result<OrderItem> {
    let sql = format!(
      "INSERT INTO order_items (id, order_id, user_id, item_id, ordered, quantity) VALUES ($1, $2, $3, $4, FALSE, 1) \
       ON CONFLICT (order_id, item_id) DO UPDATE SET quantity = order_items.quantity + 1 \
       RETURNING {}",
      ORDER_ITEM_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, OrderItem>(&sql)
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(user_id)
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  async fn decrement_order_item(&self, order_id: Uuid, item_id: Uuid) -> Result<LineDecrement> {
    let mut tx = self.pool.begin().await?;
    let sql = format!(
      "UPDATE order_items SET quantity = quantity - 1 \
       WHERE order_id = $1 AND item_id = $2 AND quantity > 1 RETURNING {}",
      ORDER_ITEM_COLUMNS
    );
    let decremented = sqlx::query_as::<_, OrderItem>(&sql)
      .bind(order_id)
      .bind(item_id)
      .fetch_optional(&mut *tx)
      .await?;
    let outcome = match decremented {
      Some(order_item) => LineDecrement::Decremented(order_item),
      None => {
        let deleted = sqlx::query("DELETE FROM order_items WHERE order_id = $1 AND item_id = $2 AND quantity = 1")
          .bind(order_id)
          .bind(item_id)
          .execute(&mut *tx)
          .await?;
        if deleted.rows_affected() > 0 {
          LineDecrement::Deleted
        } else {
          LineDecrement::Missing
        }
      }
    };
    tx.commit().await?;
    Ok(outcome)
  }

  async fn delete_order_item(&self, order_item_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM order_items WHERE id = $1")
      .bind(order_item_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn address(&self, address_id: Uuid) -> Result<Option<Address>> {
    let sql = format!("SELECT {} FROM addresses WHERE id = $1", ADDRESS_COLUMNS);
    Ok(sqlx::query_as::<_, Address>(&sql).bind(address_id).fetch_optional(&self.pool).await?)
  }

  async fn addresses_for_user(&self, user_id: Uuid) -> Result<Vec<Address>> {
    let sql = format!("SELECT {} FROM addresses WHERE user_id = $1 ORDER BY created_at", ADDRESS_COLUMNS);
    Ok(sqlx::query_as::<_, Address>(&sql).bind(user_id).fetch_all(&self.pool).await?)
  }

  async fn default_address(&self, user_id: Uuid, address_type: AddressType) -> Result<Option<Address>> {
    let sql = format!(
      "SELECT {} FROM addresses WHERE user_id = $1 AND address_type = $2 AND is_default",
      ADDRESS_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Address>(&sql)
        .bind(user_id)
        .bind(address_type)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn insert_address(&self, new_address: &NewAddress) -> Result<Address> {
    let sql = format!(
      "INSERT INTO addresses (id, user_id, street_address, apartment_address, country, zip, address_type, is_default, created_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8) RETURNING {}",
      ADDRESS_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Address>(&sql)
        .bind(Uuid::new_v4())
        .bind(new_address.user_id)
        .bind(&new_address.street_address)
        .bind(&new_address.apartment_address)
        .bind(&new_address.country)
        .bind(&new_address.zip)
        .bind(new_address.address_type)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?,
    )
  }

  #[instrument(skip(self))]
  async fn make_default_address(&self, user_id: Uuid, address_type: AddressType, address_id: Uuid) -> Result<()> {
    let mut tx = self.pool.begin().await?;
    sqlx::query(
      "UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND address_type = $2 AND is_default AND id <> $3",
    )
    .bind(user_id)
    .bind(address_type)
    .bind(address_id)
    .execute(&mut *tx)
    .await?;
    let updated = sqlx::query(
      "UPDATE addresses SET is_default = TRUE WHERE id = $1 AND user_id = $2 AND address_type = $3",
    )
    .bind(address_id)
    .bind(user_id)
    .bind(address_type)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() != 1 {
      // Dropping the transaction rolls back the cleared defaults.
      return Err(AppError::NotFound(format!("Address {} not found", address_id)));
    }
    tx.commit().await?;
    Ok(())
  }

  async fn coupon(&self, coupon_id: Uuid) -> Result<Option<Coupon>> {
    Ok(
      sqlx::query_as::<_, Coupon>("SELECT id, code, amount_cents FROM coupons WHERE id = $1")
        .bind(coupon_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>> {
    Ok(
      sqlx::query_as::<_, Coupon>("SELECT id, code, amount_cents FROM coupons WHERE code = $1")
        .bind(code)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn insert_coupon(&self, code: &str, amount_cents: i32) -> Result<Coupon> {
    Ok(
      sqlx::query_as::<_, Coupon>(
        "INSERT INTO coupons (id, code, amount_cents) VALUES ($1, $2, $3) RETURNING id, code, amount_cents",
      )
      .bind(Uuid::new_v4())
      .bind(code)
      .bind(amount_cents)
      .fetch_one(&self.pool)
      .await?,
    )
  }
}
