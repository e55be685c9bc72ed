// storefront/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::notices::NoticeBoard;
use crate::pipelines;
use crate::store::Store;
use shopflow::FlowRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
  pub notices: NoticeBoard,
}

impl AppState {
  /// Builds the state and registers every storefront pipeline.
  pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    pipelines::register_all_pipelines(&flows);
    Self {
      store,
      flows,
      config,
      notices: NoticeBoard::new(),
    }
  }
}
