// storefront/src/pipelines/checkout_pipeline.rs

use crate::errors::AppError;
use crate::models::{Address, AddressType, NewAddress};
use crate::notices::Notice;
use crate::pipelines::contexts::{CheckoutCtxData, Outcome, CHECKOUT_PATH, HOME_PATH};
use crate::store::Store;
use shopflow::{ContextData, FlowRegistry, Pipeline, PipelineControl, SkipCondition};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

fn skip_when(cond: fn(&CheckoutCtxData) -> bool) -> Option<SkipCondition<CheckoutCtxData>> {
  Some(Arc::new(move |ctx: &CheckoutCtxData| cond(ctx)))
}

fn uses_default_shipping(ctx: &CheckoutCtxData) -> bool {
  ctx.form.use_default_shipping
}

fn enters_new_shipping(ctx: &CheckoutCtxData) -> bool {
  !ctx.form.use_default_shipping
}

fn copies_shipping(ctx: &CheckoutCtxData) -> bool {
  ctx.form.same_billing_address
}

fn uses_default_billing(ctx: &CheckoutCtxData) -> bool {
  !ctx.form.same_billing_address && ctx.form.use_default_billing
}

fn enters_new_billing(ctx: &CheckoutCtxData) -> bool {
  !ctx.form.same_billing_address && !ctx.form.use_default_billing
}

/// Checkout POST. Every check runs before the first write, so a rejected
/// form leaves the order and the address book untouched.
pub fn build_checkout_pipeline() -> Pipeline<CheckoutCtxData, AppError> {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("load_active_order", false, None),
    ("validate_payment_option", false, None),
    ("find_default_shipping", false, skip_when(enters_new_shipping)),
    ("check_shipping_fields", false, skip_when(uses_default_shipping)),
    ("find_default_billing", false, skip_when(|ctx| !uses_default_billing(ctx))),
    ("check_billing_fields", false, skip_when(|ctx| !enters_new_billing(ctx))),
    ("save_new_shipping", false, skip_when(uses_default_shipping)),
    ("assign_shipping_address", false, None),
    ("copy_shipping_to_billing", false, skip_when(|ctx| !copies_shipping(ctx))),
    ("save_new_billing", false, skip_when(|ctx| !enters_new_billing(ctx))),
    ("assign_billing_address", false, None),
    ("confirm_checkout", false, None),
  ]);

  p.on_root("load_active_order", load_active_order);
  p.on_root("validate_payment_option", validate_payment_option);
  p.on_root("find_default_shipping", |ctx| find_default(ctx, AddressType::Shipping));
  p.on_root("check_shipping_fields", |ctx| check_fields(ctx, AddressType::Shipping));
  p.on_root("find_default_billing", |ctx| find_default(ctx, AddressType::Billing));
  p.on_root("check_billing_fields", |ctx| check_fields(ctx, AddressType::Billing));
  p.on_root("save_new_shipping", save_new_shipping);
  p.on_root("assign_shipping_address", assign_shipping_address);
  p.on_root("copy_shipping_to_billing", copy_shipping_to_billing);
  p.on_root("save_new_billing", save_new_billing);
  p.on_root("assign_billing_address", assign_billing_address);
  p.on_root("confirm_checkout", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      info!(user_id = %guard.user_id, "Checkout details saved.");
      guard.outcome = Some(Outcome::new(Notice::info("Success"), HOME_PATH));
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });
  p
}

pub fn register_checkout_pipeline(registry: &FlowRegistry<AppError>) {
  registry.register_pipeline(build_checkout_pipeline());
}

/// Queues `notice`, sends the user back to the checkout page and ends the run.
fn reject(ctx_data: &ContextData<CheckoutCtxData>, notice: Notice) -> Result<PipelineControl, AppError> {
  ctx_data.write().outcome = Some(Outcome::new(notice, CHECKOUT_PATH));
  Ok(PipelineControl::Stop)
}

fn order_id(ctx: &CheckoutCtxData) -> Result<Uuid, AppError> {
  ctx
    .order
    .as_ref()
    .map(|o| o.id)
    .ok_or_else(|| AppError::Internal("Checkout step ran before the active order was loaded".to_string()))
}

#[instrument(name = "checkout_step::load_active_order", skip_all, err(Display))]
async fn load_active_order(ctx_data: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (store, user_id) = {
    let guard = ctx_data.read();
    (guard.store.clone(), guard.user_id)
  };

  let order = store.active_order(user_id).await?;
  let mut guard = ctx_data.write();
  match order {
    Some(order) => {
      guard.order = Some(order);
      Ok(PipelineControl::Continue)
    }
    None => {
      guard.outcome = Some(Outcome::new(
        Notice::warning("You do not have an active order. Add a product to your cart first."),
        HOME_PATH,
      ));
      Ok(PipelineControl::Stop)
    }
  }
}

#[instrument(name = "checkout_step::validate_payment_option", skip_all, err(Display))]
async fn validate_payment_option(ctx_data: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let option = ctx_data.read().form.payment_option();
  match option {
    Some(option) => {
      info!(payment_option = option.path_segment(), "Payment option accepted.");
      Ok(PipelineControl::Continue)
    }
    None => reject(&ctx_data, Notice::warning("Invalid payment option selected")),
  }
}

#[instrument(name = "checkout_step::find_default", skip(ctx_data), err(Display))]
async fn find_default(
  ctx_data: ContextData<CheckoutCtxData>,
  address_type: AddressType,
) -> Result<PipelineControl, AppError> {
  let (store, user_id) = {
    let guard = ctx_data.read();
    (guard.store.clone(), guard.user_id)
  };

  let Some(address) = store.default_address(user_id, address_type).await? else {
    let message = match address_type {
      AddressType::Shipping => "No default shipping address available",
      AddressType::Billing => "No default billing address available",
    };
    return reject(&ctx_data, Notice::info(message));
  };

  let mut guard = ctx_data.write();
  match address_type {
    AddressType::Shipping => guard.shipping_address = Some(address),
    AddressType::Billing => guard.billing_address = Some(address),
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout_step::check_fields", skip(ctx_data), err(Display))]
async fn check_fields(
  ctx_data: ContextData<CheckoutCtxData>,
  address_type: AddressType,
) -> Result<PipelineControl, AppError> {
  let complete = {
    let guard = ctx_data.read();
    match address_type {
      AddressType::Shipping => guard.form.shipping_fields().is_complete(),
      AddressType::Billing => guard.form.billing_fields().is_complete(),
    }
  };
  if complete {
    return Ok(PipelineControl::Continue);
  }
  let message = match address_type {
    AddressType::Shipping => "Please fill in the required shipping address fields",
    AddressType::Billing => "Please fill in the required billing address fields",
  };
  reject(&ctx_data, Notice::info(message))
}

/// Inserts the address and, when asked, makes it the user's only default of its type.
async fn save_address(store: &dyn Store, new_address: NewAddress, make_default: bool) -> Result<Address, AppError> {
  let mut address = store.insert_address(&new_address).await?;
  if make_default {
    store
      .make_default_address(address.user_id, address.address_type, address.id)
      .await?;
    address.is_default = true;
  }
  info!(address_id = %address.id, address_type = ?address.address_type, is_default = address.is_default, "Address saved.");
  Ok(address)
}

#[instrument(name = "checkout_step::save_new_shipping", skip_all, err(Display))]
async fn save_new_shipping(ctx_data: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (store, new_address, make_default) = {
    let guard = ctx_data.read();
    (
      guard.store.clone(),
      guard
        .form
        .shipping_fields()
        .into_new_address(guard.user_id, AddressType::Shipping),
      guard.form.set_default_shipping,
    )
  };

  let address = save_address(store.as_ref(), new_address, make_default).await?;
  ctx_data.write().shipping_address = Some(address);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout_step::assign_shipping_address", skip_all, err(Display))]
async fn assign_shipping_address(ctx_data: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (store, order_id, address_id) = {
    let guard = ctx_data.read();
    let address_id = guard
      .shipping_address
      .as_ref()
      .map(|a| a.id)
      .ok_or_else(|| AppError::Internal("No shipping address resolved for checkout".to_string()))?;
    (guard.store.clone(), order_id(&guard)?, address_id)
  };

  store.set_order_shipping_address(order_id, address_id).await?;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout_step::copy_shipping_to_billing", skip_all, err(Display))]
async fn copy_shipping_to_billing(ctx_data: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (store, new_address, make_default) = {
    let guard = ctx_data.read();
    let shipping = guard
      .shipping_address
      .as_ref()
      .ok_or_else(|| AppError::Internal("No shipping address to copy into billing".to_string()))?;
    (
      guard.store.clone(),
      NewAddress::copy_of(shipping, AddressType::Billing),
      guard.form.set_default_billing,
    )
  };

  let address = save_address(store.as_ref(), new_address, make_default).await?;
  ctx_data.write().billing_address = Some(address);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout_step::save_new_billing", skip_all, err(Display))]
async fn save_new_billing(ctx_data: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (store, new_address, make_default) = {
    let guard = ctx_data.read();
    (
      guard.store.clone(),
      guard
        .form
        .billing_fields()
        .into_new_address(guard.user_id, AddressType::Billing),
      guard.form.set_default_billing,
    )
  };

  let address = save_address(store.as_ref(), new_address, make_default).await?;
  ctx_data.write().billing_address = Some(address);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout_step::assign_billing_address", skip_all, err(Display))]
async fn assign_billing_address(ctx_data: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (store, order_id, address_id) = {
    let guard = ctx_data.read();
    let address_id = guard
      .billing_address
      .as_ref()
      .map(|a| a.id)
      .ok_or_else(|| AppError::Internal("No billing address resolved for checkout".to_string()))?;
    (guard.store.clone(), order_id(&guard)?, address_id)
  };

  store.set_order_billing_address(order_id, address_id).await?;
  Ok(PipelineControl::Continue)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::forms::CheckoutForm;
  use crate::store::MemoryStore;
  use shopflow::PipelineResult;

  fn filled_form() -> CheckoutForm {
    CheckoutForm {
      shipping_address: "Damrak 1".to_string(),
      shipping_country: "NL".to_string(),
      shipping_zip: "1012".to_string(),
      billing_address: "Rokin 2".to_string(),
      billing_country: "NL".to_string(),
      billing_zip: "1012".to_string(),
      payment_option: "P".to_string(),
      ..CheckoutForm::default()
    }
  }

  #[tokio::test]
  async fn invalid_payment_option_writes_nothing() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let user = Uuid::new_v4();
    store.get_or_create_active_order(user).await.unwrap();

    let form = CheckoutForm {
      payment_option: "X".to_string(),
      ..filled_form()
    };
    let ctx = ContextData::new(CheckoutCtxData::new(store.clone(), user, form));
    let result = build_checkout_pipeline().run(ctx.clone()).await.unwrap();

    assert_eq!(result, PipelineResult::Stopped);
    let outcome = ctx.read().outcome.clone().unwrap();
    assert_eq!(outcome.notice, Notice::warning("Invalid payment option selected"));
    assert_eq!(outcome.redirect_to, CHECKOUT_PATH);
    assert!(store.addresses_for_user(user).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn missing_billing_fields_are_reported_before_shipping_is_saved() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let user = Uuid::new_v4();
    store.get_or_create_active_order(user).await.unwrap();

    let form = CheckoutForm {
      billing_zip: String::new(),
      ..filled_form()
    };
    let ctx = ContextData::new(CheckoutCtxData::new(store.clone(), user, form));
    build_checkout_pipeline().run(ctx.clone()).await.unwrap();

    assert_eq!(
      ctx.read().outcome.clone().unwrap().notice,
      Notice::info("Please fill in the required billing address fields")
    );
    assert!(store.addresses_for_user(user).await.unwrap().is_empty());
    let order = store.active_order(user).await.unwrap().unwrap();
    assert_eq!(order.shipping_address_id, None);
  }

  #[tokio::test]
  async fn new_addresses_are_saved_and_assigned() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let user = Uuid::new_v4();
    store.get_or_create_active_order(user).await.unwrap();

    let form = CheckoutForm {
      set_default_shipping: true,
      ..filled_form()
    };
    let ctx = ContextData::new(CheckoutCtxData::new(store.clone(), user, form));
    let result = build_checkout_pipeline().run(ctx.clone()).await.unwrap();
    assert_eq!(result, PipelineResult::Completed);

    let order = store.active_order(user).await.unwrap().unwrap();
    let shipping = store.address(order.shipping_address_id.unwrap()).await.unwrap().unwrap();
    let billing = store.address(order.billing_address_id.unwrap()).await.unwrap().unwrap();
    assert_eq!(shipping.street_address, "Damrak 1");
    assert!(shipping.is_default);
    assert_eq!(billing.street_address, "Rokin 2");
    assert_eq!(billing.address_type, AddressType::Billing);
    assert!(!billing.is_default);
  }
}
