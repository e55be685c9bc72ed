// storefront/src/store/mod.rs

//! Persistence seam. Handlers and pipelines talk to `dyn Store`; the server
//! picks `PgStore` or `MemoryStore` at startup.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{
  Address, AddressType, Category, Coupon, Item, ItemFilter, LineDecrement, NewAddress, Order, OrderItem, OrderLine,
  OrderSummary, Refund,
};

#[async_trait]
pub trait Store: Send + Sync {
  // --- Catalog ---
  async fn list_items(&self, filter: &ItemFilter, limit: i64, offset: i64) -> Result<Vec<Item>>;
  async fn count_items(&self, filter: &ItemFilter) -> Result<i64>;
  async fn item_by_slug(&self, slug: &str) -> Result<Option<Item>>;
  async fn items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Item>>;
  async fn category(&self, id: i32) -> Result<Option<Category>>;
  async fn insert_category(&self, title: &str, slug: &str) -> Result<Category>;
  async fn insert_item(&self, item: &Item) -> Result<()>;

  // --- Orders ---
  async fn active_order(&self, user_id: Uuid) -> Result<Option<Order>>;
  /// Returns the user's active order, creating it if needed. Concurrent
  /// callers for the same user all receive the same order.
  async fn get_or_create_active_order(&self, user_id: Uuid) -> Result<Order>;
  async fn order_by_ref_code(&self, ref_code: &str) -> Result<Option<Order>>;
  async fn set_order_shipping_address(&self, order_id: Uuid, address_id: Uuid) -> Result<()>;
  async fn set_order_billing_address(&self, order_id: Uuid, address_id: Uuid) -> Result<()>;
  async fn set_order_coupon(&self, order_id: Uuid, coupon_id: Uuid) -> Result<()>;
  /// Flags the order as refund-requested and records the request.
  async fn request_refund(&self, order_id: Uuid, reason: &str, email: &str) -> Result<Refund>;

  // --- Order lines ---
  async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>>;
  async fn find_order_item(&self, order_id: Uuid, item_id: Uuid) -> Result<Option<OrderItem>>;
  /// Adds one unit of `item_id` to the order: inserts a quantity-1 line or
  /// increments the existing one.
  async fn increment_order_item(&self, order_id: Uuid, user_id: Uuid, item_id: Uuid) -> Result<OrderItem>;
  /// Takes one unit off the order's line for `item_id`, deleting the line
  /// when its last unit goes. Atomic against concurrent removals.
  async fn decrement_order_item(&self, order_id: Uuid, item_id: Uuid) -> Result<LineDecrement>;
  async fn delete_order_item(&self, order_item_id: Uuid) -> Result<()>;

  // --- Addresses ---
  async fn address(&self, address_id: Uuid) -> Result<Option<Address>>;
  async fn addresses_for_user(&self, user_id: Uuid) -> Result<Vec<Address>>;
  async fn default_address(&self, user_id: Uuid, address_type: AddressType) -> Result<Option<Address>>;
  async fn insert_address(&self, new_address: &NewAddress) -> Result<Address>;
  /// Marks the address as the user's default of its type, clearing any other.
  async fn make_default_address(&self, user_id: Uuid, address_type: AddressType, address_id: Uuid) -> Result<()>;

  // --- Coupons ---
  async fn coupon(&self, coupon_id: Uuid) -> Result<Option<Coupon>>;
  async fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>>;
  async fn insert_coupon(&self, code: &str, amount_cents: i32) -> Result<Coupon>;
}

/// Loads lines, items, coupon and addresses for `order` and computes totals.
pub async fn load_order_summary(store: &dyn Store, order: Order) -> Result<OrderSummary> {
  let order_items = store.order_items(order.id).await?;
  let item_ids: Vec<Uuid> = order_items.iter().map(|oi| oi.item_id).collect();
  let items = store.items_by_ids(&item_ids).await?;

  let mut lines = Vec::with_capacity(order_items.len());
  for order_item in order_items {
    match items.iter().find(|i| i.id == order_item.item_id) {
      Some(item) => lines.push(OrderLine::new(order_item, item.clone())),
      None => tracing::warn!(order_item_id = %order_item.id, item_id = %order_item.item_id, "Order line references a missing item"),
    }
  }

  let coupon = match order.coupon_id {
    Some(id) => store.coupon(id).await?,
    None => None,
  };
  let shipping_address = match order.shipping_address_id {
    Some(id) => store.address(id).await?,
    None => None,
  };
  let billing_address = match order.billing_address_id {
    Some(id) => store.address(id).await?,
    None => None,
  };

  Ok(OrderSummary::new(order, lines, coupon, shipping_address, billing_address))
}
