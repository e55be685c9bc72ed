// storefront/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Serialize;
use shopflow::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::forms::{CheckoutForm, PaymentOption};
use crate::models::{Address, AddressType, OrderSummary};
use crate::notices::Notice;
use crate::pipelines::contexts::{CheckoutCtxData, HOME_PATH};
use crate::state::AppState;
use crate::store::load_order_summary;
use crate::web::extractors::AuthenticatedUser;
use crate::web::responses::{finish_outcome, notify_and_redirect, page};

#[derive(Serialize, Debug)]
struct CheckoutPage {
  order: OrderSummary,
  display_coupon_form: bool,
  default_shipping_address: Option<Address>,
  default_billing_address: Option<Address>,
  payment_options: [PaymentOption; 2],
}

#[instrument(name = "handler::checkout_page", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn checkout_page_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
  let user_id = auth_user.user_id;
  let Some(order) = app_state.store.active_order(user_id).await? else {
    info!("Checkout page requested without an active order.");
    return Ok(notify_and_redirect(
      &app_state,
      Some(user_id),
      Notice::warning("You do not have an active order. Add a product to your cart first."),
      HOME_PATH,
    ));
  };

  let summary = load_order_summary(app_state.store.as_ref(), order).await?;
  let default_shipping_address = app_state.store.default_address(user_id, AddressType::Shipping).await?;
  let default_billing_address = app_state.store.default_address(user_id, AddressType::Billing).await?;

  Ok(page(
    &app_state,
    Some(user_id),
    CheckoutPage {
      order: summary,
      display_coupon_form: true,
      default_shipping_address,
      default_billing_address,
      payment_options: [PaymentOption::Stripe, PaymentOption::Paypal],
    },
  ))
}

#[instrument(
  name = "handler::checkout_submit",
  skip(app_state, auth_user, form),
  fields(user_id = %auth_user.user_id, payment_option = %form.payment_option)
)]
pub async fn checkout_submit_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  form: web::Form<CheckoutForm>,
) -> Result<HttpResponse, AppError> {
  let ctx_data = ContextData::new(CheckoutCtxData::new(
    app_state.store.clone(),
    auth_user.user_id,
    form.into_inner(),
  ));

  match app_state.flows.run(ctx_data.clone()).await {
    Ok(result) => {
      let outcome = ctx_data.read().outcome.clone().ok_or_else(|| {
        AppError::Internal(format!("Checkout pipeline ended ({:?}) without an outcome", result))
      })?;
      if result == PipelineResult::Completed {
        info!("Checkout details accepted.");
      }
      Ok(finish_outcome(&app_state, Some(auth_user.user_id), outcome))
    }
    Err(app_err) => {
      warn!("Checkout pipeline failed for user {}: {:?}", auth_user.user_id, app_err);
      Err(app_err)
    }
  }
}
