// storefront/tests/cart_flow_tests.rs

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{get, json_body, location, messages, notice, seeded_shop};
use uuid::Uuid;

#[actix_web::test]
async fn adding_the_same_product_twice_keeps_one_line_with_quantity_two() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();

  for _ in 0..2 {
    let resp = test::call_service(&app, get("/add-to-cart/linen-shirt/", Some(user)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/order-summary/");
  }

  let resp = test::call_service(&app, get("/order-summary/", Some(user)).to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let page = json_body(resp).await;

  let lines = page["order"]["lines"].as_array().unwrap();
  assert_eq!(lines.len(), 1);
  assert_eq!(lines[0]["quantity"], 2);
  assert_eq!(lines[0]["item"]["slug"], "linen-shirt");
  assert_eq!(
    messages(&page),
    vec![
      notice("info", "This item was added to your cart."),
      notice("info", "This item quantity was updated."),
    ]
  );
  assert_eq!(shop.memory.orders_for_user(user).len(), 1);
}

#[actix_web::test]
async fn removing_a_product_not_in_the_cart_changes_nothing() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();
  test::call_service(&app, get("/add-to-cart/rain-shell/", Some(user)).to_request()).await;
  test::call_service(&app, get("/order-summary/", Some(user)).to_request()).await;

  let resp = test::call_service(&app, get("/remove-from-cart/linen-shirt/", Some(user)).to_request()).await;
  assert_eq!(resp.status(), StatusCode::FOUND);
  assert_eq!(location(&resp), "/product/linen-shirt/");

  let product_page = json_body(test::call_service(&app, get("/product/linen-shirt/", Some(user)).to_request()).await).await;
  assert_eq!(messages(&product_page), vec![notice("info", "This item was not in your cart")]);

  let summary = json_body(test::call_service(&app, get("/order-summary/", Some(user)).to_request()).await).await;
  let lines = summary["order"]["lines"].as_array().unwrap();
  assert_eq!(lines.len(), 1);
  assert_eq!(lines[0]["item"]["slug"], "rain-shell");
  assert_eq!(lines[0]["quantity"], 1);
}

#[actix_web::test]
async fn removing_without_an_active_order_creates_no_order() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();

  let resp = test::call_service(&app, get("/remove-from-cart/linen-shirt/", Some(user)).to_request()).await;
  assert_eq!(location(&resp), "/product/linen-shirt/");
  let resp = test::call_service(&app, get("/remove-single-item-from-cart/linen-shirt/", Some(user)).to_request()).await;
  assert_eq!(location(&resp), "/product/linen-shirt/");

  let product_page = json_body(test::call_service(&app, get("/product/linen-shirt/", Some(user)).to_request()).await).await;
  assert_eq!(
    messages(&product_page),
    vec![
      notice("info", "You do not have an active order"),
      notice("info", "You do not have an active order"),
    ]
  );
  assert!(shop.memory.orders_for_user(user).is_empty());
}

#[actix_web::test]
async fn remove_deletes_the_whole_line() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();
  for _ in 0..3 {
    test::call_service(&app, get("/add-to-cart/wool-coat/", Some(user)).to_request()).await;
  }

  let resp = test::call_service(&app, get("/remove-from-cart/wool-coat/", Some(user)).to_request()).await;
  assert_eq!(location(&resp), "/order-summary/");

  let summary = json_body(test::call_service(&app, get("/order-summary/", Some(user)).to_request()).await).await;
  assert!(summary["order"]["lines"].as_array().unwrap().is_empty());
  assert_eq!(summary["order"]["total_cents"], 0);
  assert_eq!(
    messages(&summary).last().cloned(),
    Some(notice("info", "This item was removed from your cart."))
  );
}

#[actix_web::test]
async fn remove_single_decrements_then_deletes() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();
  test::call_service(&app, get("/add-to-cart/running-tee/", Some(user)).to_request()).await;
  test::call_service(&app, get("/add-to-cart/running-tee/", Some(user)).to_request()).await;

  let resp = test::call_service(&app, get("/remove-single-item-from-cart/running-tee/", Some(user)).to_request()).await;
  assert_eq!(location(&resp), "/order-summary/");
  let summary = json_body(test::call_service(&app, get("/order-summary/", Some(user)).to_request()).await).await;
  assert_eq!(summary["order"]["lines"][0]["quantity"], 1);

  test::call_service(&app, get("/remove-single-item-from-cart/running-tee/", Some(user)).to_request()).await;
  let summary = json_body(test::call_service(&app, get("/order-summary/", Some(user)).to_request()).await).await;
  assert!(summary["order"]["lines"].as_array().unwrap().is_empty());
  assert_eq!(
    messages(&summary),
    vec![notice("info", "This item quantity was updated.")]
  );
}

#[actix_web::test]
async fn unknown_slug_is_404_for_every_cart_action() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();

  for uri in [
    "/add-to-cart/ghost/",
    "/remove-from-cart/ghost/",
    "/remove-single-item-from-cart/ghost/",
  ] {
    let resp = test::call_service(&app, get(uri, Some(user)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
  }
  assert!(shop.memory.orders_for_user(user).is_empty());
}

#[actix_web::test]
async fn anonymous_cart_actions_redirect_to_login() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);

  let resp = test::call_service(&app, get("/add-to-cart/linen-shirt/", None).to_request()).await;
  assert_eq!(resp.status(), StatusCode::FOUND);
  assert_eq!(location(&resp), "/accounts/login/?next=%2Fadd-to-cart%2Flinen-shirt%2F");
}

#[actix_web::test]
async fn discounted_lines_use_the_discount_price_in_the_total() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();
  // linen-shirt: 4500, discounted 3900. oxford-shirt: 5500, no discount.
  test::call_service(&app, get("/add-to-cart/linen-shirt/", Some(user)).to_request()).await;
  test::call_service(&app, get("/add-to-cart/linen-shirt/", Some(user)).to_request()).await;
  test::call_service(&app, get("/add-to-cart/oxford-shirt/", Some(user)).to_request()).await;

  let summary = json_body(test::call_service(&app, get("/order-summary/", Some(user)).to_request()).await).await;
  let lines = summary["order"]["lines"].as_array().unwrap();
  let linen = lines.iter().find(|l| l["item"]["slug"] == "linen-shirt").unwrap();
  assert_eq!(linen["total_price_cents"], 9000);
  assert_eq!(linen["amount_saved_cents"], 1200);
  assert_eq!(linen["final_price_cents"], 7800);
  assert_eq!(summary["order"]["total_cents"], 7800 + 5500);
}
