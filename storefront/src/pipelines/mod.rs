// storefront/src/pipelines/mod.rs

//! Step pipelines behind every mutating storefront action.

use crate::errors::AppError;
use shopflow::FlowRegistry;

pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod coupon_pipeline;
pub mod refund_pipeline;

/// Registers every storefront pipeline. Called once while building `AppState`.
pub fn register_all_pipelines(registry: &FlowRegistry<AppError>) {
  tracing::info!("Registering storefront pipelines...");

  cart_pipeline::register_cart_pipeline(registry);
  checkout_pipeline::register_checkout_pipeline(registry);
  coupon_pipeline::register_coupon_pipeline(registry);
  refund_pipeline::register_refund_pipeline(registry);

  tracing::info!("All storefront pipelines registered.");
}
