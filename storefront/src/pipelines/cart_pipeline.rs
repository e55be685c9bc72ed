// storefront/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::models::LineDecrement;
use crate::notices::Notice;
use crate::pipelines::contexts::{product_path, CartAction, CartCtxData, Outcome, ORDER_SUMMARY_PATH};
use shopflow::{ContextData, FlowRegistry, Pipeline, PipelineControl, SkipCondition};
use std::sync::Arc;
use tracing::{info, instrument, warn};

fn only_for_add() -> Option<SkipCondition<CartCtxData>> {
  Some(Arc::new(|ctx: &CartCtxData| ctx.action != CartAction::Add))
}

fn only_for_removals() -> Option<SkipCondition<CartCtxData>> {
  Some(Arc::new(|ctx: &CartCtxData| ctx.action == CartAction::Add))
}

/// Add, remove and remove-single share one pipeline; `skip_if` picks the
/// order-resolution branch for the action.
pub fn build_cart_pipeline() -> Pipeline<CartCtxData, AppError> {
  let mut p = Pipeline::<CartCtxData, AppError>::new(&[
    ("fetch_item", false, None),
    ("resolve_order_for_add", false, only_for_add()),
    ("load_active_order", false, only_for_removals()),
    ("locate_order_line", false, only_for_removals()),
    ("apply_cart_change", false, None),
  ]);

  p.on_root("fetch_item", fetch_item);
  p.on_root("resolve_order_for_add", resolve_order_for_add);
  p.on_root("load_active_order", load_active_order);
  p.on_root("locate_order_line", locate_order_line);
  p.on_root("apply_cart_change", apply_cart_change);
  p
}

pub fn register_cart_pipeline(registry: &FlowRegistry<AppError>) {
  registry.register_pipeline(build_cart_pipeline());
}

#[instrument(name = "cart_step::fetch_item", skip_all, err(Display))]
async fn fetch_item(ctx_data: ContextData<CartCtxData>) -> Result<PipelineControl, AppError> {
  let (store, slug) = {
    let guard = ctx_data.read();
    (guard.store.clone(), guard.slug.clone())
  };

  let item = store
    .item_by_slug(&slug)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No item with slug '{}'", slug)))?;
  ctx_data.write().item = Some(item);
  Ok(PipelineControl::Continue)
}

/// Get-or-create; concurrent first adds by one user share the same order.
#[instrument(name = "cart_step::resolve_order_for_add", skip_all, err(Display))]
async fn resolve_order_for_add(ctx_data: ContextData<CartCtxData>) -> Result<PipelineControl, AppError> {
  let (store, user_id) = {
    let guard = ctx_data.read();
    (guard.store.clone(), guard.user_id)
  };

  let order = store.get_or_create_active_order(user_id).await?;
  ctx_data.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "cart_step::load_active_order", skip_all, err(Display))]
async fn load_active_order(ctx_data: ContextData<CartCtxData>) -> Result<PipelineControl, AppError> {
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
      info!(%user_id, "Cart removal without an active order.");
      guard.outcome = Some(Outcome::new(
        Notice::info("You do not have an active order"),
        product_path(&guard.slug),
      ));
      Ok(PipelineControl::Stop)
    }
  }
}

#[instrument(name = "cart_step::locate_order_line", skip_all, err(Display))]
async fn locate_order_line(ctx_data: ContextData<CartCtxData>) -> Result<PipelineControl, AppError> {
  let (store, order_id, item_id) = {
    let guard = ctx_data.read();
    match (&guard.order, &guard.item) {
      (Some(order), Some(item)) => (guard.store.clone(), order.id, item.id),
      _ => {
        return Err(AppError::Internal(
          "Cart line lookup ran before the order and item were loaded".to_string(),
        ))
      }
    }
  };

  let line = store.find_order_item(order_id, item_id).await?;
  let mut guard = ctx_data.write();
  match line {
    Some(line) => {
      guard.line = Some(line);
      Ok(PipelineControl::Continue)
    }
    None => {
      guard.outcome = Some(Outcome::new(
        Notice::info("This item was not in your cart"),
        product_path(&guard.slug),
      ));
      Ok(PipelineControl::Stop)
    }
  }
}

#[instrument(name = "cart_step::apply_cart_change", skip_all, err(Display))]
async fn apply_cart_change(ctx_data: ContextData<CartCtxData>) -> Result<PipelineControl, AppError> {
  let (store, user_id, action, order_id, item_id, line) = {
    let guard = ctx_data.read();
    let (Some(order), Some(item)) = (&guard.order, &guard.item) else {
      return Err(AppError::Internal(
        "Cart change ran before the order and item were loaded".to_string(),
      ));
    };
    (
      guard.store.clone(),
      guard.user_id,
      guard.action,
      order.id,
      item.id,
      guard.line.clone(),
    )
  };

  let notice = match (action, line) {
    (CartAction::Add, _) => {
      let line = store.increment_order_item(order_id, user_id, item_id).await?;
      info!(order_item_id = %line.id, quantity = line.quantity, "Item added to cart.");
      let notice = if line.quantity > 1 {
        Notice::info("This item quantity was updated.")
      } else {
        Notice::info("This item was added to your cart.")
      };
      ctx_data.write().line = Some(line);
      notice
    }
    (CartAction::Remove, Some(line)) => {
      store.delete_order_item(line.id).await?;
      info!(order_item_id = %line.id, "Line removed from cart.");
      ctx_data.write().line = None;
      Notice::info("This item was removed from your cart.")
    }
    (CartAction::RemoveSingle, Some(_)) => match store.decrement_order_item(order_id, item_id).await? {
      LineDecrement::Decremented(updated) => {
        info!(order_item_id = %updated.id, quantity = updated.quantity, "Line quantity decremented.");
        ctx_data.write().line = Some(updated);
        Notice::info("This item quantity was updated.")
      }
      LineDecrement::Deleted => {
        info!(%order_id, %item_id, "Last unit removed, line deleted.");
        ctx_data.write().line = None;
        Notice::info("This item quantity was updated.")
      }
      LineDecrement::Missing => {
        info!(%order_id, %item_id, "Line vanished before the single-unit removal.");
        let mut guard = ctx_data.write();
        guard.line = None;
        guard.outcome = Some(Outcome::new(
          Notice::info("This item was not in your cart"),
          product_path(&guard.slug),
        ));
        return Ok(PipelineControl::Stop);
      }
    },
    (CartAction::Remove | CartAction::RemoveSingle, None) => {
      warn!(%order_id, %item_id, "Removal reached apply step without a located line.");
      return Err(AppError::Internal("Cart line missing for removal".to_string()));
    }
  };

  ctx_data.write().outcome = Some(Outcome::new(notice, ORDER_SUMMARY_PATH));
  Ok(PipelineControl::Continue)
}
