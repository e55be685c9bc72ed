// storefront/src/main.rs

use std::sync::Arc;

use actix_web::{web as actix_data, App, HttpServer};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use storefront::config::{AppConfig, LogFormat, StoreBackend};
use storefront::errors::AppError;
use storefront::seed::seed_demo_catalog;
use storefront::state::AppState;
use storefront::store::{MemoryStore, PgStore, Store};
use storefront::web::configure_app_routes;

fn init_tracing(format: LogFormat) {
  // RUST_LOG overrides the default level.
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Pretty => builder.init(),
    LogFormat::Json => builder.json().init(),
  }
}

fn to_io_error(err: AppError) -> std::io::Error {
  std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>, AppError> {
  match config.store_backend {
    StoreBackend::Postgres => {
      let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;
      let store = PgStore::connect(url).await?;
      store.apply_schema().await?;
      Ok(Arc::new(store))
    }
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on restart.");
      Ok(Arc::new(MemoryStore::new()))
    }
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Config decides the log format, so a config error is reported on stderr
  // before any subscriber exists.
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      eprintln!("Failed to load application configuration: {}", e);
      return Err(to_io_error(e));
    }
  };
  init_tracing(app_config.log_format);
  tracing::info!(backend = ?app_config.store_backend, "Starting storefront server...");

  let store = open_store(&app_config).await.map_err(|e| {
    tracing::error!(error = %e, "Failed to open the store.");
    to_io_error(e)
  })?;

  if app_config.seed_db {
    seed_demo_catalog(store.as_ref()).await.map_err(|e| {
      tracing::error!(error = %e, "Failed to seed the catalog.");
      to_io_error(e)
    })?;
  }

  let app_state = AppState::new(store, app_config.clone());

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .configure(configure_app_routes)
      .wrap(tracing_actix_web::TracingLogger::default())
  })
  .bind(&server_address)?
  .run()
  .await
}
