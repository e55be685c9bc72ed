// storefront/src/pipelines/contexts.rs

//! Root context data for the storefront pipelines.
//! Handlers receive these wrapped in `shopflow::ContextData`.

use crate::forms::{CheckoutForm, RefundForm};
use crate::models::{Address, Coupon, Item, Order, OrderItem, Refund};
use crate::notices::Notice;
use crate::store::Store;
use std::sync::Arc;
use uuid::Uuid;

/// Where a finished action sends the user, and what it tells them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
  pub notice: Notice,
  pub redirect_to: String,
}

impl Outcome {
  pub fn new(notice: Notice, redirect_to: impl Into<String>) -> Self {
    Self {
      notice,
      redirect_to: redirect_to.into(),
    }
  }
}

pub fn product_path(slug: &str) -> String {
  format!("/product/{}/", slug)
}

pub const ORDER_SUMMARY_PATH: &str = "/order-summary/";
pub const CHECKOUT_PATH: &str = "/checkout/";
pub const HOME_PATH: &str = "/";
pub const REFUND_PATH: &str = "/request-refund/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
  Add,
  Remove,
  RemoveSingle,
}

#[derive(Clone)]
pub struct CartCtxData {
  pub store: Arc<dyn Store>,
  pub user_id: Uuid,
  pub slug: String,
  pub action: CartAction,
  pub item: Option<Item>,
  pub order: Option<Order>,
  pub line: Option<OrderItem>,
  pub outcome: Option<Outcome>,
}

impl CartCtxData {
  pub fn new(store: Arc<dyn Store>, user_id: Uuid, slug: impl Into<String>, action: CartAction) -> Self {
    Self {
      store,
      user_id,
      slug: slug.into(),
      action,
      item: None,
      order: None,
      line: None,
      outcome: None,
    }
  }
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub store: Arc<dyn Store>,
  pub user_id: Uuid,
  pub form: CheckoutForm,
  pub order: Option<Order>,
  pub shipping_address: Option<Address>,
  pub billing_address: Option<Address>,
  pub outcome: Option<Outcome>,
}

impl CheckoutCtxData {
  pub fn new(store: Arc<dyn Store>, user_id: Uuid, form: CheckoutForm) -> Self {
    Self {
      store,
      user_id,
      form,
      order: None,
      shipping_address: None,
      billing_address: None,
      outcome: None,
    }
  }
}

#[derive(Clone)]
pub struct CouponCtxData {
  pub store: Arc<dyn Store>,
  pub user_id: Uuid,
  pub code: String,
  pub order: Option<Order>,
  pub coupon: Option<Coupon>,
  pub outcome: Option<Outcome>,
}

impl CouponCtxData {
  pub fn new(store: Arc<dyn Store>, user_id: Uuid, code: impl Into<String>) -> Self {
    Self {
      store,
      user_id,
      code: code.into(),
      order: None,
      coupon: None,
      outcome: None,
    }
  }
}

#[derive(Clone)]
pub struct RefundCtxData {
  pub store: Arc<dyn Store>,
  pub form: RefundForm,
  pub order: Option<Order>,
  pub refund: Option<Refund>,
  pub outcome: Option<Outcome>,
}

impl RefundCtxData {
  pub fn new(store: Arc<dyn Store>, form: RefundForm) -> Self {
    Self {
      store,
      form,
      order: None,
      refund: None,
      outcome: None,
    }
  }
}
