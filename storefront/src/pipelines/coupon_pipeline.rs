// storefront/src/pipelines/coupon_pipeline.rs

use crate::errors::AppError;
use crate::notices::Notice;
use crate::pipelines::contexts::{CouponCtxData, Outcome, CHECKOUT_PATH};
use shopflow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use tracing::{info, instrument};

pub fn build_coupon_pipeline() -> Pipeline<CouponCtxData, AppError> {
  let mut p = Pipeline::<CouponCtxData, AppError>::new(&[
    ("load_active_order", false, None),
    ("lookup_coupon", false, None),
    ("attach_coupon", false, None),
  ]);

  p.on_root("load_active_order", load_active_order);
  p.on_root("lookup_coupon", lookup_coupon);
  p.on_root("attach_coupon", attach_coupon);
  p
}

pub fn register_coupon_pipeline(registry: &FlowRegistry<AppError>) {
  registry.register_pipeline(build_coupon_pipeline());
}

fn stop_with(ctx_data: &ContextData<CouponCtxData>, notice: Notice) -> Result<PipelineControl, AppError> {
  ctx_data.write().outcome = Some(Outcome::new(notice, CHECKOUT_PATH));
  Ok(PipelineControl::Stop)
}

#[instrument(name = "coupon_step::load_active_order", skip_all, err(Display))]
async fn load_active_order(ctx_data: ContextData<CouponCtxData>) -> Result<PipelineControl, AppError> {
  let (store, user_id) = {
    let guard = ctx_data.read();
    (guard.store.clone(), guard.user_id)
  };

  match store.active_order(user_id).await? {
    Some(order) => {
      ctx_data.write().order = Some(order);
      Ok(PipelineControl::Continue)
    }
    None => stop_with(&ctx_data, Notice::info("You do not have an active order")),
  }
}

#[instrument(name = "coupon_step::lookup_coupon", skip_all, err(Display))]
async fn lookup_coupon(ctx_data: ContextData<CouponCtxData>) -> Result<PipelineControl, AppError> {
  let (store, code) = {
    let guard = ctx_data.read();
    (guard.store.clone(), guard.code.trim().to_string())
  };

  match store.coupon_by_code(&code).await? {
    Some(coupon) => {
      ctx_data.write().coupon = Some(coupon);
      Ok(PipelineControl::Continue)
    }
    None => {
      info!(%code, "Unknown coupon code.");
      stop_with(&ctx_data, Notice::info("This coupon does not exist"))
    }
  }
}

#[instrument(name = "coupon_step::attach_coupon", skip_all, err(Display))]
async fn attach_coupon(ctx_data: ContextData<CouponCtxData>) -> Result<PipelineControl, AppError> {
  let (store, order_id, coupon_id) = {
    let guard = ctx_data.read();
    match (&guard.order, &guard.coupon) {
      (Some(order), Some(coupon)) => (guard.store.clone(), order.id, coupon.id),
      _ => return Err(AppError::Internal("Coupon attach ran before lookup".to_string())),
    }
  };

  store.set_order_coupon(order_id, coupon_id).await?;
  info!(%order_id, %coupon_id, "Coupon attached to order.");
  let mut guard = ctx_data.write();
  if let Some(order) = guard.order.as_mut() {
    order.coupon_id = Some(coupon_id);
  }
  guard.outcome = Some(Outcome::new(Notice::success("Successfully added coupon"), CHECKOUT_PATH));
  Ok(PipelineControl::Continue)
}
