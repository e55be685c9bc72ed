// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use shopflow::{ContextData, PipelineResult};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::{CartAction, CartCtxData};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::responses::finish_outcome;

async fn run_cart_action(
  app_state: &AppState,
  auth_user: AuthenticatedUser,
  slug: String,
  action: CartAction,
) -> Result<HttpResponse, AppError> {
  let ctx_data = ContextData::new(CartCtxData::new(app_state.store.clone(), auth_user.user_id, slug, action));

  let result = app_state.flows.run(ctx_data.clone()).await.map_err(|e| {
    warn!(user_id = %auth_user.user_id, ?action, error = %e, "Cart pipeline failed.");
    e
  })?;

  let outcome = ctx_data.read().outcome.clone().ok_or_else(|| {
    AppError::Internal(format!("Cart pipeline ended ({:?}) without an outcome", result))
  })?;
  if result == PipelineResult::Stopped {
    info!(user_id = %auth_user.user_id, ?action, "Cart action ended early.");
  }
  Ok(finish_outcome(app_state, Some(auth_user.user_id), outcome))
}

#[instrument(name = "handler::add_to_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id, slug = %path.as_ref()))]
pub async fn add_to_cart_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  run_cart_action(&app_state, auth_user, path.into_inner(), CartAction::Add).await
}

#[instrument(name = "handler::remove_from_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id, slug = %path.as_ref()))]
pub async fn remove_from_cart_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  run_cart_action(&app_state, auth_user, path.into_inner(), CartAction::Remove).await
}

#[instrument(name = "handler::remove_single_item_from_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id, slug = %path.as_ref()))]
pub async fn remove_single_item_from_cart_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  run_cart_action(&app_state, auth_user, path.into_inner(), CartAction::RemoveSingle).await
}
