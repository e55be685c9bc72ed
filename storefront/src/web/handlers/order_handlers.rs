// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use shopflow::ContextData;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::forms::{CouponForm, PaymentOption, RefundForm};
use crate::models::OrderSummary;
use crate::notices::Notice;
use crate::pipelines::contexts::{CouponCtxData, RefundCtxData, CHECKOUT_PATH, HOME_PATH};
use crate::state::AppState;
use crate::store::load_order_summary;
use crate::web::extractors::{AuthenticatedUser, MaybeUser};
use crate::web::responses::{finish_outcome, notify_and_redirect, page};

#[derive(Serialize, Debug)]
struct OrderSummaryPage {
  order: OrderSummary,
}

/// Read-only: a user without an active order is redirected and no order is created.
#[instrument(name = "handler::order_summary", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn order_summary_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
  let user_id = auth_user.user_id;
  match app_state.store.active_order(user_id).await? {
    Some(order) => {
      let summary = load_order_summary(app_state.store.as_ref(), order).await?;
      Ok(page(&app_state, Some(user_id), OrderSummaryPage { order: summary }))
    }
    None => Ok(notify_and_redirect(
      &app_state,
      Some(user_id),
      Notice::error("You do not have an active order"),
      HOME_PATH,
    )),
  }
}

#[derive(Serialize, Debug)]
struct PaymentPage {
  order: OrderSummary,
  payment_option: PaymentOption,
  display_coupon_form: bool,
}

#[instrument(name = "handler::payment", skip(app_state, auth_user), fields(user_id = %auth_user.user_id, option = %path.as_ref()))]
pub async fn payment_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let user_id = auth_user.user_id;
  let Some(payment_option) = PaymentOption::from_path(&path) else {
    return Ok(notify_and_redirect(
      &app_state,
      Some(user_id),
      Notice::warning("Invalid payment option selected"),
      CHECKOUT_PATH,
    ));
  };

  let Some(order) = app_state.store.active_order(user_id).await? else {
    return Ok(notify_and_redirect(
      &app_state,
      Some(user_id),
      Notice::warning("You do not have an active order"),
      HOME_PATH,
    ));
  };
  if order.billing_address_id.is_none() {
    return Ok(notify_and_redirect(
      &app_state,
      Some(user_id),
      Notice::warning("You have not added a billing address"),
      CHECKOUT_PATH,
    ));
  }

  let summary = load_order_summary(app_state.store.as_ref(), order).await?;
  info!(total_cents = summary.total_cents, "Payment page rendered.");
  Ok(page(
    &app_state,
    Some(user_id),
    PaymentPage {
      order: summary,
      payment_option,
      display_coupon_form: false,
    },
  ))
}

#[instrument(name = "handler::add_coupon", skip(app_state, auth_user, form), fields(user_id = %auth_user.user_id))]
pub async fn add_coupon_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  form: web::Form<CouponForm>,
) -> Result<HttpResponse, AppError> {
  let ctx_data = ContextData::new(CouponCtxData::new(
    app_state.store.clone(),
    auth_user.user_id,
    form.into_inner().code,
  ));

  let result = app_state.flows.run(ctx_data.clone()).await?;
  let outcome = ctx_data
    .read()
    .outcome
    .clone()
    .ok_or_else(|| AppError::Internal(format!("Coupon pipeline ended ({:?}) without an outcome", result)))?;
  Ok(finish_outcome(&app_state, Some(auth_user.user_id), outcome))
}

#[instrument(name = "handler::request_refund_page", skip(app_state, viewer))]
pub async fn request_refund_page_handler(
  app_state: web::Data<AppState>,
  viewer: MaybeUser,
) -> Result<HttpResponse, AppError> {
  Ok(page(
    &app_state,
    viewer.0,
    json!({ "form": { "ref_code": "", "message": "", "email": "" } }),
  ))
}

#[instrument(name = "handler::request_refund", skip(app_state, viewer, form))]
pub async fn request_refund_handler(
  app_state: web::Data<AppState>,
  viewer: MaybeUser,
  form: web::Form<RefundForm>,
) -> Result<HttpResponse, AppError> {
  let form = form.into_inner().validated().map_err(|e| {
    warn!(error = %e, "Rejected refund request form.");
    e
  })?;

  let ctx_data = ContextData::new(RefundCtxData::new(app_state.store.clone(), form));
  let result = app_state.flows.run(ctx_data.clone()).await?;
  let outcome = ctx_data
    .read()
    .outcome
    .clone()
    .ok_or_else(|| AppError::Internal(format!("Refund pipeline ended ({:?}) without an outcome", result)))?;
  Ok(finish_outcome(&app_state, viewer.0, outcome))
}
