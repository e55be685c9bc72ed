// storefront/tests/common/mod.rs
#![allow(dead_code)]

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test::{self, TestRequest};
use serde_json::Value;
use uuid::Uuid;

use storefront::config::{AppConfig, StoreBackend};
use storefront::seed::seed_demo_catalog;
use storefront::state::AppState;
use storefront::store::{MemoryStore, Store};
use storefront::web::extractors::USER_ID_HEADER;

/// Builds the storefront service over `$shop.state`.
#[allow(unused_macros)]
macro_rules! shop_app {
  ($shop:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($shop.state.clone()))
        .configure(storefront::web::configure_app_routes),
    )
    .await
  };
}

pub struct TestShop {
  pub state: AppState,
  pub memory: Arc<MemoryStore>,
}

impl TestShop {
  pub fn store(&self) -> &dyn Store {
    self.memory.as_ref()
  }
}

/// In-memory shop with the demo catalog and three items per page.
pub async fn seeded_shop() -> TestShop {
  let memory = Arc::new(MemoryStore::new());
  seed_demo_catalog(memory.as_ref()).await.expect("seed demo catalog");
  let config = AppConfig {
    store_backend: StoreBackend::Memory,
    items_per_page: 3,
    ..AppConfig::default()
  };
  let store: Arc<dyn Store> = memory.clone();
  TestShop {
    state: AppState::new(store, Arc::new(config)),
    memory,
  }
}

pub fn get(uri: &str, user: Option<Uuid>) -> TestRequest {
  let req = TestRequest::get().uri(uri);
  match user {
    Some(id) => req.insert_header((USER_ID_HEADER, id.to_string())),
    None => req,
  }
}

pub fn post_form(uri: &str, user: Option<Uuid>, fields: &[(&str, &str)]) -> TestRequest {
  let req = TestRequest::post().uri(uri).set_form(fields);
  match user {
    Some(id) => req.insert_header((USER_ID_HEADER, id.to_string())),
    None => req,
  }
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
  resp
    .headers()
    .get(header::LOCATION)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
    .to_string()
}

pub async fn json_body<B: actix_web::body::MessageBody>(resp: ServiceResponse<B>) -> Value {
  let bytes = test::read_body(resp).await;
  serde_json::from_slice(&bytes).expect("response body is JSON")
}

/// `(level, message)` pairs of a page's `messages` array.
pub fn messages(page: &Value) -> Vec<(String, String)> {
  page["messages"]
    .as_array()
    .map(|list| {
      list
        .iter()
        .map(|m| {
          (
            m["level"].as_str().unwrap_or_default().to_string(),
            m["message"].as_str().unwrap_or_default().to_string(),
          )
        })
        .collect()
    })
    .unwrap_or_default()
}

pub fn notice(level: &str, message: &str) -> (String, String) {
  (level.to_string(), message.to_string())
}
