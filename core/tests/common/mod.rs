// core/tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use shopflow::{ContextData, FlowError, Handler, PipelineControl};
use tracing::Level;

/// A running tally of cart lines, used as the root context in engine tests.
#[derive(Clone, Debug, Default)]
pub struct TallyCtx {
  pub total_cents: i64,
  pub trail: Vec<String>,
  pub stop_at: Option<String>,
  pub coupon_applied: bool,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TallyError {
  #[error("engine: {0}")]
  Flow(String),

  #[error("line rejected: {0}")]
  Rejected(String),
}

impl From<FlowError> for TallyError {
  fn from(err: FlowError) -> Self {
    TallyError::Flow(format!("{:?}", err))
  }
}

/// Adds `cents` to the tally and records `label` in the trail.
pub fn add_line(label: &'static str, cents: i64) -> Handler<TallyCtx, TallyError> {
  Box::new(move |ctx: ContextData<TallyCtx>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.total_cents += cents;
      guard.trail.push(label.to_string());
      if guard.stop_at.as_deref() == Some(label) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn reject_line(label: &'static str) -> Handler<TallyCtx, TallyError> {
  Box::new(move |ctx: ContextData<TallyCtx>| {
    Box::pin(async move {
      ctx.write().trail.push(label.to_string());
      Err(TallyError::Rejected(label.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
