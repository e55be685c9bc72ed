// storefront/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{cart_handlers, catalog_handlers, checkout_handlers, order_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts every storefront route. Paths keep their trailing slashes.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    // Catalog
    .route("/", web::get().to(catalog_handlers::home_handler))
    .route("/category/{id}", web::get().to(catalog_handlers::category_handler))
    .route("/search/", web::get().to(catalog_handlers::search_handler))
    .route("/product/{slug}/", web::get().to(catalog_handlers::product_handler))
    // Cart
    .route("/add-to-cart/{slug}/", web::get().to(cart_handlers::add_to_cart_handler))
    .route(
      "/remove-from-cart/{slug}/",
      web::get().to(cart_handlers::remove_from_cart_handler),
    )
    .route(
      "/remove-single-item-from-cart/{slug}/",
      web::get().to(cart_handlers::remove_single_item_from_cart_handler),
    )
    // Orders
    .route("/order-summary/", web::get().to(order_handlers::order_summary_handler))
    .service(
      web::resource("/checkout/")
        .route(web::get().to(checkout_handlers::checkout_page_handler))
        .route(web::post().to(checkout_handlers::checkout_submit_handler)),
    )
    .route("/payment/{option}/", web::get().to(order_handlers::payment_handler))
    .route("/add-coupon/", web::post().to(order_handlers::add_coupon_handler))
    .service(
      web::resource("/request-refund/")
        .route(web::get().to(order_handlers::request_refund_page_handler))
        .route(web::post().to(order_handlers::request_refund_handler)),
    );
}
