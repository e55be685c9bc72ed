// storefront/src/store/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{
  Address, AddressType, Category, Coupon, Item, ItemFilter, LineDecrement, NewAddress, Order, OrderItem, Refund,
};
use crate::store::Store;

#[derive(Debug, Default)]
struct Tables {
  categories: Vec<Category>,
  items: Vec<Item>,
  orders: Vec<Order>,
  order_items: Vec<OrderItem>,
  addresses: Vec<Address>,
  coupons: Vec<Coupon>,
  refunds: Vec<Refund>,
}

/// Process-local store. Every operation runs under one lock, which gives the
/// same atomicity the Postgres constraints give `PgStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts an order as is; used to load fixtures such as completed orders.
  pub fn insert_order(&self, order: Order) {
    self.tables.lock().orders.push(order);
  }

  pub fn orders_for_user(&self, user_id: Uuid) -> Vec<Order> {
    self
      .tables
      .lock()
      .orders
      .iter()
      .filter(|o| o.user_id == user_id)
      .cloned()
      .collect()
  }

  pub fn refunds(&self) -> Vec<Refund> {
    self.tables.lock().refunds.clone()
  }
}

fn missing(what: &str, id: Uuid) -> AppError {
  AppError::NotFound(format!("{} {} not found", what, id))
}

impl Tables {
  fn order_mut(&mut self, order_id: Uuid) -> Result<&mut Order> {
    self
      .orders
      .iter_mut()
      .find(|o| o.id == order_id)
      .ok_or_else(|| missing("Order", order_id))
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn list_items(&self, filter: &ItemFilter, limit: i64, offset: i64) -> Result<Vec<Item>> {
    let tables = self.tables.lock();
    let mut matching: Vec<&Item> = tables.items.iter().filter(|i| filter.matches(i)).collect();
    matching.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
    Ok(
      matching
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(0))
        .take(usize::try_from(limit).unwrap_or(0))
        .cloned()
        .collect(),
    )
  }

  async fn count_items(&self, filter: &ItemFilter) -> Result<i64> {
    let count = self.tables.lock().items.iter().filter(|i| filter.matches(i)).count();
    Ok(i64::try_from(count).unwrap_or(i64::MAX))
  }

  async fn item_by_slug(&self, slug: &str) -> Result<Option<Item>> {
    Ok(self.tables.lock().items.iter().find(|i| i.slug == slug).cloned())
  }

  async fn items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Item>> {
    Ok(
      self
        .tables
        .lock()
        .items
        .iter()
        .filter(|i| ids.contains(&i.id))
        .cloned()
        .collect(),
    )
  }

  async fn category(&self, id: i32) -> Result<Option<Category>> {
    Ok(self.tables.lock().categories.iter().find(|c| c.id == id).cloned())
  }

  async fn insert_category(&self, title: &str, slug: &str) -> Result<Category> {
    let mut tables = self.tables.lock();
    if tables.categories.iter().any(|c| c.slug == slug) {
      return Err(AppError::Validation(format!("Category slug '{}' already exists", slug)));
    }
    let id = tables.categories.iter().map(|c| c.id).max().unwrap_or(0) + 1;
    let category = Category {
      id,
      title: title.to_string(),
      slug: slug.to_string(),
    };
    tables.categories.push(category.clone());
    Ok(category)
  }

  async fn insert_item(&self, item: &Item) -> Result<()> {
    let mut tables = self.tables.lock();
    if tables.items.iter().any(|i| i.slug == item.slug) {
      return Err(AppError::Validation(format!("Item slug '{}' already exists", item.slug)));
    }
    tables.items.push(item.clone());
    Ok(())
  }

  async fn active_order(&self, user_id: Uuid) -> Result<Option<Order>> {
    Ok(
      self
        .tables
        .lock()
        .orders
        .iter()
        .find(|o| o.user_id == user_id && !o.ordered)
        .cloned(),
    )
  }

  async fn get_or_create_active_order(&self, user_id: Uuid) -> Result<Order> {
    let mut tables = self.tables.lock();
    if let Some(existing) = tables.orders.iter().find(|o| o.user_id == user_id && !o.ordered) {
      return Ok(existing.clone());
    }
    let order = Order::new_active(user_id, Utc::now());
    tables.orders.push(order.clone());
    Ok(order)
  }

  async fn order_by_ref_code(&self, ref_code: &str) -> Result<Option<Order>> {
    Ok(
      self
        .tables
        .lock()
        .orders
        .iter()
        .find(|o| o.ref_code.as_deref() == Some(ref_code))
        .cloned(),
    )
  }

  async fn set_order_shipping_address(&self, order_id: Uuid, address_id: Uuid) -> Result<()> {
    self.tables.lock().order_mut(order_id)?.shipping_address_id = Some(address_id);
    Ok(())
  }

  async fn set_order_billing_address(&self, order_id: Uuid, address_id: Uuid) -> Result<()> {
    self.tables.lock().order_mut(order_id)?.billing_address_id = Some(address_id);
    Ok(())
  }

  async fn set_order_coupon(&self, order_id: Uuid, coupon_id: Uuid) -> Result<()> {
    self.tables.lock().order_mut(order_id)?.coupon_id = Some(coupon_id);
    Ok(())
  }

  async fn request_refund(&self, order_id: Uuid, reason: &str, email: &str) -> Result<Refund> {
    let mut tables = self.tables.lock();
    tables.order_mut(order_id)?.refund_requested = true;
    let refund = Refund {
      id: Uuid::new_v4(),
      order_id,
      reason: reason.to_string(),
      accepted: false,
      email: email.to_string(),
      created_at: Utc::now(),
    };
    tables.refunds.push(refund.clone());
    Ok(refund)
  }

  async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
    Ok(
      self
        .tables
        .lock()
        .order_items
        .iter()
        .filter(|oi| oi.order_id == order_id)
        .cloned()
        .collect(),
    )
  }

  async fn find_order_item(&self, order_id: Uuid, item_id: Uuid) -> Result<Option<OrderItem>> {
    Ok(
      self
        .tables
        .lock()
        .order_items
        .iter()
        .find(|oi| oi.order_id == order_id && oi.item_id == item_id)
        .cloned(),
    )
  }

  async fn increment_order_item(&self, order_id: Uuid, user_id: Uuid, item_id: Uuid) -> Result<OrderItem> {
    let mut tables = self.tables.lock();
    if let Some(existing) = tables
      .order_items
      .iter_mut()
      .find(|oi| oi.order_id == order_id && oi.item_id == item_id)
    {
      existing.quantity += 1;
      return Ok(existing.clone());
    }
    let order_item = OrderItem {
      id: Uuid::new_v4(),
      order_id,
      user_id,
      item_id,
      ordered: false,
      quantity: 1,
    };
    tables.order_items.push(order_item.clone());
    Ok(order_item)
  }

  async fn decrement_order_item(&self, order_id: Uuid, item_id: Uuid) -> Result<LineDecrement> {
    let mut tables = self.tables.lock();
    let Some(pos) = tables
      .order_items
      .iter()
      .position(|oi| oi.order_id == order_id && oi.item_id == item_id)
    else {
      return Ok(LineDecrement::Missing);
    };
    if tables.order_items[pos].quantity > 1 {
      tables.order_items[pos].quantity -= 1;
      Ok(LineDecrement::Decremented(tables.order_items[pos].clone()))
    } else {
      tables.order_items.remove(pos);
      Ok(LineDecrement::Deleted)
    }
  }

  async fn delete_order_item(&self, order_item_id: Uuid) -> Result<()> {
    self.tables.lock().order_items.retain(|oi| oi.id != order_item_id);
    Ok(())
  }

  async fn address(&self, address_id: Uuid) -> Result<Option<Address>> {
    Ok(self.tables.lock().addresses.iter().find(|a| a.id == address_id).cloned())
  }

  async fn addresses_for_user(&self, user_id: Uuid) -> Result<Vec<Address>> {
    Ok(
      self
        .tables
        .lock()
        .addresses
        .iter()
        .filter(|a| a.user_id == user_id)
        .cloned()
        .collect(),
    )
  }

  async fn default_address(&self, user_id: Uuid, address_type: AddressType) -> Result<Option<Address>> {
    Ok(
      self
        .tables
        .lock()
        .addresses
        .iter()
        .find(|a| a.user_id == user_id && a.address_type == address_type && a.is_default)
        .cloned(),
    )
  }

  async fn insert_address(&self, new_address: &NewAddress) -> Result<Address> {
    let address = Address {
      id: Uuid::new_v4(),
      user_id: new_address.user_id,
      street_address: new_address.street_address.clone(),
      apartment_address: new_address.apartment_address.clone(),
      country: new_address.country.clone(),
      zip: new_address.zip.clone(),
      address_type: new_address.address_type,
      is_default: false,
      created_at: Utc::now(),
    };
    self.tables.lock().addresses.push(address.clone());
    Ok(address)
  }

  async fn make_default_address(&self, user_id: Uuid, address_type: AddressType, address_id: Uuid) -> Result<()> {
    let mut tables = self.tables.lock();
    if !tables
      .addresses
      .iter()
      .any(|a| a.id == address_id && a.user_id == user_id && a.address_type == address_type)
    {
      return Err(missing("Address", address_id));
    }
    for address in tables
      .addresses
      .iter_mut()
      .filter(|a| a.user_id == user_id && a.address_type == address_type)
    {
      address.is_default = address.id == address_id;
    }
    Ok(())
  }

  async fn coupon(&self, coupon_id: Uuid) -> Result<Option<Coupon>> {
    Ok(self.tables.lock().coupons.iter().find(|c| c.id == coupon_id).cloned())
  }

  async fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>> {
    Ok(self.tables.lock().coupons.iter().find(|c| c.code == code).cloned())
  }

  async fn insert_coupon(&self, code: &str, amount_cents: i32) -> Result<Coupon> {
    let mut tables = self.tables.lock();
    if tables.coupons.iter().any(|c| c.code == code) {
      return Err(AppError::Validation(format!("Coupon code '{}' already exists", code)));
    }
    let coupon = Coupon {
      id: Uuid::new_v4(),
      code: code.to_string(),
      amount_cents,
    };
    tables.coupons.push(coupon.clone());
    Ok(coupon)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  #[tokio::test]
  async fn concurrent_get_or_create_yields_a_single_active_order() {
    let store = Arc::new(MemoryStore::new());
    let user = Uuid::new_v4();

    let mut tasks = Vec::new();
    for _ in 0..16 {
      let store = Arc::clone(&store);
      tasks.push(tokio::spawn(async move { store.get_or_create_active_order(user).await }));
    }
    let mut ids = Vec::new();
    for task in tasks {
      ids.push(task.await.unwrap().unwrap().id);
    }

    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(store.orders_for_user(user).len(), 1);
  }

  #[tokio::test]
  async fn increment_creates_then_bumps_a_single_line() {
    let store = MemoryStore::new();
    let user = Uuid::new_v4();
    let order = store.get_or_create_active_order(user).await.unwrap();
    let item_id = Uuid::new_v4();

    let first = store.increment_order_item(order.id, user, item_id).await.unwrap();
    let second = store.increment_order_item(order.id, user, item_id).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 2);
    assert_eq!(store.order_items(order.id).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn making_an_address_default_clears_the_previous_default() {
    let store = MemoryStore::new();
    let user = Uuid::new_v4();
    let new_address = |street: &str| NewAddress {
      user_id: user,
      street_address: street.to_string(),
      apartment_address: String::new(),
      country: "NL".to_string(),
      zip: "1011".to_string(),
      address_type: AddressType::Shipping,
    };
    let first = store.insert_address(&new_address("Damrak 1")).await.unwrap();
    let second = store.insert_address(&new_address("Rokin 2")).await.unwrap();

    store.make_default_address(user, AddressType::Shipping, first.id).await.unwrap();
    store.make_default_address(user, AddressType::Shipping, second.id).await.unwrap();

    let defaults: Vec<Address> = store
      .addresses_for_user(user)
      .await
      .unwrap()
      .into_iter()
      .filter(|a| a.is_default)
      .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, second.id);
    assert!(store.default_address(user, AddressType::Billing).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn interleaved_single_removals_take_the_line_to_zero() {
    let store = Arc::new(MemoryStore::new());
    let user = Uuid::new_v4();
    let order = store.get_or_create_active_order(user).await.unwrap();
    let item_id = Uuid::new_v4();
    store.increment_order_item(order.id, user, item_id).await.unwrap();
    store.increment_order_item(order.id, user, item_id).await.unwrap();

    let first = {
      let store = Arc::clone(&store);
      tokio::spawn(async move { store.decrement_order_item(order.id, item_id).await })
    };
    let second = {
      let store = Arc::clone(&store);
      tokio::spawn(async move { store.decrement_order_item(order.id, item_id).await })
    };
    let mut outcomes = vec![first.await.unwrap().unwrap(), second.await.unwrap().unwrap()];
    outcomes.sort_by_key(|o| matches!(o, LineDecrement::Deleted));

    assert!(matches!(&outcomes[0], LineDecrement::Decremented(line) if line.quantity == 1));
    assert_eq!(outcomes[1], LineDecrement::Deleted);
    assert!(store.find_order_item(order.id, item_id).await.unwrap().is_none());
    assert_eq!(
      store.decrement_order_item(order.id, item_id).await.unwrap(),
      LineDecrement::Missing
    );
  }
}
