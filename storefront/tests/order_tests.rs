// storefront/tests/order_tests.rs

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::Utc;
use common::{get, json_body, location, messages, notice, post_form, seeded_shop};
use storefront::models::Order;
use uuid::Uuid;

#[actix_web::test]
async fn order_summary_without_an_order_redirects_and_creates_nothing() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();

  let resp = test::call_service(&app, get("/order-summary/", Some(user)).to_request()).await;
  assert_eq!(resp.status(), StatusCode::FOUND);
  assert_eq!(location(&resp), "/");
  assert!(shop.memory.orders_for_user(user).is_empty());

  let home = json_body(test::call_service(&app, get("/", Some(user)).to_request()).await).await;
  assert_eq!(messages(&home), vec![notice("error", "You do not have an active order")]);
}

#[actix_web::test]
async fn coupon_is_subtracted_and_total_never_goes_negative() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();
  shop.store().insert_coupon("BIGSPENDER", 50_000).await.unwrap();
  test::call_service(&app, get("/add-to-cart/running-tee/", Some(user)).to_request()).await;

  let resp = test::call_service(&app, post_form("/add-coupon/", Some(user), &[("code", "WELCOME10")]).to_request()).await;
  assert_eq!(location(&resp), "/checkout/");
  let summary = json_body(test::call_service(&app, get("/order-summary/", Some(user)).to_request()).await).await;
  assert_eq!(summary["order"]["coupon"]["code"], "WELCOME10");
  assert_eq!(summary["order"]["total_cents"], 2500 - 1000);
  assert_eq!(
    messages(&summary).last().cloned(),
    Some(notice("success", "Successfully added coupon"))
  );

  test::call_service(&app, post_form("/add-coupon/", Some(user), &[("code", "BIGSPENDER")]).to_request()).await;
  let summary = json_body(test::call_service(&app, get("/order-summary/", Some(user)).to_request()).await).await;
  assert_eq!(summary["order"]["total_cents"], 0);
}

#[actix_web::test]
async fn unknown_coupon_and_missing_order_are_notices() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();

  let resp = test::call_service(&app, post_form("/add-coupon/", Some(user), &[("code", "WELCOME10")]).to_request()).await;
  assert_eq!(location(&resp), "/checkout/");
  assert!(shop.memory.orders_for_user(user).is_empty());

  test::call_service(&app, get("/add-to-cart/running-tee/", Some(user)).to_request()).await;
  test::call_service(&app, post_form("/add-coupon/", Some(user), &[("code", "NOPE")]).to_request()).await;

  let summary = json_body(test::call_service(&app, get("/order-summary/", Some(user)).to_request()).await).await;
  assert_eq!(
    messages(&summary),
    vec![
      notice("info", "You do not have an active order"),
      notice("info", "This item was added to your cart."),
      notice("info", "This coupon does not exist"),
    ]
  );
  assert!(summary["order"]["coupon"].is_null());
}

#[actix_web::test]
async fn payment_page_checks_option_order_and_billing_address() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();

  let resp = test::call_service(&app, get("/payment/bitcoin/", Some(user)).to_request()).await;
  assert_eq!(location(&resp), "/checkout/");
  let resp = test::call_service(&app, get("/payment/stripe/", Some(user)).to_request()).await;
  assert_eq!(location(&resp), "/");

  test::call_service(&app, get("/add-to-cart/wool-coat/", Some(user)).to_request()).await;
  let resp = test::call_service(&app, get("/payment/stripe/", Some(user)).to_request()).await;
  assert_eq!(location(&resp), "/checkout/");

  let home = json_body(test::call_service(&app, get("/", Some(user)).to_request()).await).await;
  assert_eq!(
    messages(&home),
    vec![
      notice("warning", "Invalid payment option selected"),
      notice("warning", "You do not have an active order"),
      notice("info", "This item was added to your cart."),
      notice("warning", "You have not added a billing address"),
    ]
  );

  test::call_service(
    &app,
    post_form(
      "/checkout/",
      Some(user),
      &[
        ("shipping_address", "Damrak 1"),
        ("shipping_country", "NL"),
        ("shipping_zip", "1012"),
        ("same_billing_address", "on"),
        ("payment_option", "P"),
      ],
    )
    .to_request(),
  )
  .await;

  let resp = test::call_service(&app, get("/payment/paypal/", Some(user)).to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let page = json_body(resp).await;
  assert_eq!(page["payment_option"], "paypal");
  assert_eq!(page["display_coupon_form"], false);
  assert_eq!(page["order"]["total_cents"], 24900);
  assert_eq!(page["order"]["billing_address"]["street_address"], "Damrak 1");
}

#[actix_web::test]
async fn refund_request_flags_a_known_order() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();
  let mut order = Order::new_active(user, Utc::now());
  order.ordered = true;
  order.ref_code = Some("ab12cd34".to_string());
  shop.memory.insert_order(order.clone());

  let page = json_body(test::call_service(&app, get("/request-refund/", None).to_request()).await).await;
  assert_eq!(page["form"]["ref_code"], "");

  let resp = test::call_service(
    &app,
    post_form(
      "/request-refund/",
      Some(user),
      &[("ref_code", "ab12cd34"), ("message", "Zip is broken"), ("email", "kim@example.com")],
    )
    .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::FOUND);
  assert_eq!(location(&resp), "/request-refund/");

  let stored = shop.store().order_by_ref_code("ab12cd34").await.unwrap().unwrap();
  assert!(stored.refund_requested);
  let refunds = shop.memory.refunds();
  assert_eq!(refunds.len(), 1);
  assert_eq!(refunds[0].email, "kim@example.com");
  assert!(!refunds[0].accepted);

  let page = json_body(test::call_service(&app, get("/request-refund/", Some(user)).to_request()).await).await;
  assert_eq!(messages(&page), vec![notice("info", "Your request was received.")]);
}

#[actix_web::test]
async fn refund_request_for_unknown_order_or_bad_form() {
  let shop = seeded_shop().await;
  let app = shop_app!(shop);
  let user = Uuid::new_v4();

  let resp = test::call_service(
    &app,
    post_form(
      "/request-refund/",
      Some(user),
      &[("ref_code", "nope"), ("message", "Late"), ("email", "kim@example.com")],
    )
    .to_request(),
  )
  .await;
  assert_eq!(location(&resp), "/request-refund/");
  let page = json_body(test::call_service(&app, get("/request-refund/", Some(user)).to_request()).await).await;
  assert_eq!(messages(&page), vec![notice("info", "This order does not exist.")]);

  let resp = test::call_service(
    &app,
    post_form("/request-refund/", Some(user), &[("ref_code", "nope"), ("message", ""), ("email", "kim")]).to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(shop.memory.refunds().is_empty());
}
