// core/src/lib.rs

//! Shopflow: named-step async pipelines for storefront request workflows.
//!
//! A request handler that mutates shop state (cart, checkout, coupons, refunds)
//! is written as a `Pipeline<T, E>` over a shared context `T`:
//!  - Steps run in declaration order, each with `before` / `on` / `after` handlers.
//!  - A step may be optional, or skipped by a predicate over the context.
//!  - Any handler may end the run early with `PipelineControl::Stop`.
//!  - The first handler error aborts the run and is returned as `E`.
//!
//! Pipelines are registered once in a `FlowRegistry<E>`, keyed by their context
//! type, and dispatched per request with `FlowRegistry::run`.

pub mod context;
pub mod control;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod step;

pub use crate::context::ContextData;
pub use crate::control::{PipelineControl, PipelineResult};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::{Handler, Pipeline};
pub use crate::registry::FlowRegistry;
pub use crate::step::{SkipCondition, StepDef};
