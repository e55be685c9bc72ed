// storefront/src/pipelines/refund_pipeline.rs

use crate::errors::AppError;
use crate::notices::Notice;
use crate::pipelines::contexts::{Outcome, RefundCtxData, REFUND_PATH};
use shopflow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use tracing::{info, instrument};

pub fn build_refund_pipeline() -> Pipeline<RefundCtxData, AppError> {
  let mut p = Pipeline::<RefundCtxData, AppError>::new(&[
    ("find_order_by_ref_code", false, None),
    ("record_refund_request", false, None),
  ]);

  p.on_root("find_order_by_ref_code", find_order_by_ref_code);
  p.on_root("record_refund_request", record_refund_request);
  p
}

pub fn register_refund_pipeline(registry: &FlowRegistry<AppError>) {
  registry.register_pipeline(build_refund_pipeline());
}

#[instrument(name = "refund_step::find_order_by_ref_code", skip_all, err(Display))]
async fn find_order_by_ref_code(ctx_data: ContextData<RefundCtxData>) -> Result<PipelineControl, AppError> {
  let (store, ref_code) = {
    let guard = ctx_data.read();
    (guard.store.clone(), guard.form.ref_code.clone())
  };

  let order = store.order_by_ref_code(&ref_code).await?;
  let mut guard = ctx_data.write();
  match order {
    Some(order) => {
      guard.order = Some(order);
      Ok(PipelineControl::Continue)
    }
    None => {
      info!(%ref_code, "Refund requested for an unknown order.");
      guard.outcome = Some(Outcome::new(Notice::info("This order does not exist."), REFUND_PATH));
      Ok(PipelineControl::Stop)
    }
  }
}

#[instrument(name = "refund_step::record_refund_request", skip_all, err(Display))]
async fn record_refund_request(ctx_data: ContextData<RefundCtxData>) -> Result<PipelineControl, AppError> {
  let (store, order_id, reason, email) = {
    let guard = ctx_data.read();
    let order_id = guard
      .order
      .as_ref()
      .map(|o| o.id)
      .ok_or_else(|| AppError::Internal("Refund recorded before the order was found".to_string()))?;
    (guard.store.clone(), order_id, guard.form.message.clone(), guard.form.email.clone())
  };

  let refund = store.request_refund(order_id, &reason, &email).await?;
  info!(%order_id, refund_id = %refund.id, "Refund request recorded.");
  let mut guard = ctx_data.write();
  guard.refund = Some(refund);
  guard.outcome = Some(Outcome::new(Notice::info("Your request was received."), REFUND_PATH));
  Ok(PipelineControl::Continue)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::forms::RefundForm;
  use crate::models::Order;
  use crate::store::{MemoryStore, Store};
  use chrono::Utc;
  use std::sync::Arc;
  use uuid::Uuid;

  fn form(ref_code: &str) -> RefundForm {
    RefundForm {
      ref_code: ref_code.to_string(),
      message: "Wrong size".to_string(),
      email: "kim@example.com".to_string(),
    }
  }

  #[tokio::test]
  async fn refund_is_recorded_for_a_known_order() {
    let memory = Arc::new(MemoryStore::new());
    let mut order = Order::new_active(Uuid::new_v4(), Utc::now());
    order.ordered = true;
    order.ref_code = Some("r3f-001".to_string());
    memory.insert_order(order.clone());
    let store: Arc<dyn Store> = memory.clone();

    let ctx = ContextData::new(RefundCtxData::new(store.clone(), form("r3f-001")));
    build_refund_pipeline().run(ctx.clone()).await.unwrap();

    assert_eq!(
      ctx.read().outcome.clone().unwrap().notice,
      Notice::info("Your request was received.")
    );
    let stored = store.order_by_ref_code("r3f-001").await.unwrap().unwrap();
    assert!(stored.refund_requested);
    let refunds = memory.refunds();
    assert_eq!(refunds.len(), 1);
    assert_eq!(refunds[0].order_id, order.id);
    assert_eq!(refunds[0].reason, "Wrong size");
  }

  #[tokio::test]
  async fn unknown_ref_code_records_nothing() {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn Store> = memory.clone();

    let ctx = ContextData::new(RefundCtxData::new(store, form("missing")));
    build_refund_pipeline().run(ctx.clone()).await.unwrap();

    let outcome = ctx.read().outcome.clone().unwrap();
    assert_eq!(outcome.notice, Notice::info("This order does not exist."));
    assert_eq!(outcome.redirect_to, REFUND_PATH);
    assert!(memory.refunds().is_empty());
  }
}
