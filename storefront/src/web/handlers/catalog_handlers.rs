// storefront/src/web/handlers/catalog_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::{Category, Item, ItemFilter};
use crate::state::AppState;
use crate::web::extractors::MaybeUser;
use crate::web::responses::page;

#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
  pub page: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchQuery {
  #[serde(default)]
  pub q: String,
  pub page: Option<u32>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
  pub page: u32,
  pub num_pages: u32,
  pub per_page: u32,
  pub total_items: i64,
  pub has_next: bool,
  pub has_previous: bool,
}

impl Pagination {
  /// An empty catalog still has one (empty) page. Pages outside
  /// `1..=num_pages` are `NotFound`.
  pub fn new(requested: Option<u32>, per_page: u32, total_items: i64) -> Result<Self, AppError> {
    let per_page = per_page.max(1);
    let num_pages = u32::try_from(total_items.max(0))
      .unwrap_or(u32::MAX)
      .div_ceil(per_page)
      .max(1);
    let page = requested.unwrap_or(1);
    if page == 0 || page > num_pages {
      return Err(AppError::NotFound(format!("Page {} does not exist", page)));
    }
    Ok(Self {
      page,
      num_pages,
      per_page,
      total_items,
      has_next: page < num_pages,
      has_previous: page > 1,
    })
  }

  pub fn limit(&self) -> i64 {
    i64::from(self.per_page)
  }

  pub fn offset(&self) -> i64 {
    i64::from(self.page - 1) * i64::from(self.per_page)
  }
}

#[derive(Serialize, Debug)]
struct ItemListPage {
  items: Vec<Item>,
  pagination: Pagination,
  #[serde(skip_serializing_if = "Option::is_none")]
  category: Option<Category>,
  #[serde(skip_serializing_if = "Option::is_none")]
  query: Option<String>,
}

async fn paginated_items(
  state: &AppState,
  filter: &ItemFilter,
  requested_page: Option<u32>,
) -> Result<(Vec<Item>, Pagination), AppError> {
  let total = state.store.count_items(filter).await?;
  let pagination = Pagination::new(requested_page, state.config.items_per_page, total)?;
  let items = state
    .store
    .list_items(filter, pagination.limit(), pagination.offset())
    .await?;
  Ok((items, pagination))
}

#[instrument(name = "handler::home", skip(app_state, query, viewer))]
pub async fn home_handler(
  app_state: web::Data<AppState>,
  query: web::Query<PageQuery>,
  viewer: MaybeUser,
) -> Result<HttpResponse, AppError> {
  let (items, pagination) = paginated_items(&app_state, &ItemFilter::default(), query.page).await?;
  info!(page = pagination.page, shown = items.len(), "Catalog page listed.");
  Ok(page(
    &app_state,
    viewer.0,
    ItemListPage {
      items,
      pagination,
      category: None,
      query: None,
    },
  ))
}

#[instrument(name = "handler::category", skip(app_state, query, viewer), fields(category_id = %path.as_ref()))]
pub async fn category_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i32>,
  query: web::Query<PageQuery>,
  viewer: MaybeUser,
) -> Result<HttpResponse, AppError> {
  let category_id = path.into_inner();
  let category = app_state.store.category(category_id).await?.ok_or_else(|| {
    warn!(category_id, "Category not found.");
    AppError::NotFound(format!("Category {} not found", category_id))
  })?;

  let filter = ItemFilter {
    category_id: Some(category.id),
    ..ItemFilter::default()
  };
  let (items, pagination) = paginated_items(&app_state, &filter, query.page).await?;
  Ok(page(
    &app_state,
    viewer.0,
    ItemListPage {
      items,
      pagination,
      category: Some(category),
      query: None,
    },
  ))
}

#[instrument(name = "handler::search", skip(app_state, query, viewer), fields(q = %query.q))]
pub async fn search_handler(
  app_state: web::Data<AppState>,
  query: web::Query<SearchQuery>,
  viewer: MaybeUser,
) -> Result<HttpResponse, AppError> {
  let needle = query.q.trim().to_string();
  let filter = ItemFilter {
    title_contains: (!needle.is_empty()).then(|| needle.clone()),
    ..ItemFilter::default()
  };
  let (items, pagination) = paginated_items(&app_state, &filter, query.page).await?;
  info!(matches = pagination.total_items, "Search finished.");
  Ok(page(
    &app_state,
    viewer.0,
    ItemListPage {
      items,
      pagination,
      category: None,
      query: Some(needle),
    },
  ))
}

#[derive(Serialize, Debug)]
struct ItemDetailPage {
  item: Item,
}

#[instrument(name = "handler::product", skip(app_state, viewer), fields(slug = %path.as_ref()))]
pub async fn product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  viewer: MaybeUser,
) -> Result<HttpResponse, AppError> {
  let slug = path.into_inner();
  let item = app_state
    .store
    .item_by_slug(&slug)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No item with slug '{}'", slug)))?;
  Ok(page(&app_state, viewer.0, ItemDetailPage { item }))
}
