// storefront/src/web/extractors.rs

//! Request identity. The user id arrives in the trusted `X-User-ID` header.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "X-User-ID";

fn user_id_from(req: &HttpRequest) -> Option<Uuid> {
  req
    .headers()
    .get(USER_ID_HEADER)
    .and_then(|value| value.to_str().ok())
    .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
}

/// `{login_url}?next={path}` for the request being refused.
pub fn login_redirect_target(req: &HttpRequest) -> String {
  let login_url = req
    .app_data::<web::Data<AppState>>()
    .map(|state| state.config.login_url.clone())
    .unwrap_or_else(|| "/accounts/login/".to_string());
  let next = req
    .uri()
    .path_and_query()
    .map(|pq| pq.as_str())
    .unwrap_or_else(|| req.path());
  format!("{}?next={}", login_url, urlencoding::encode(next))
}

/// A signed-in user. Extraction fails with `AppError::LoginRequired`, which
/// answers with a redirect to the login page.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    match user_id_from(req) {
      Some(user_id) => ready(Ok(AuthenticatedUser { user_id })),
      None => {
        debug!(path = req.path(), "Anonymous request to a login-only route.");
        ready(Err(AppError::LoginRequired(login_redirect_target(req))))
      }
    }
  }
}

/// The signed-in user if there is one. Public pages use it to show that
/// user's queued notices.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<Uuid>);

impl FromRequest for MaybeUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(Ok(MaybeUser(user_id_from(req))))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  #[test]
  fn next_carries_the_encoded_path_and_query() {
    let req = TestRequest::get().uri("/payment/stripe/?a=1&b=2").to_http_request();
    assert_eq!(
      login_redirect_target(&req),
      "/accounts/login/?next=%2Fpayment%2Fstripe%2F%3Fa%3D1%26b%3D2"
    );
  }

  #[actix_web::test]
  async fn missing_header_is_login_required() {
    let req = TestRequest::get().uri("/order-summary/").to_http_request();
    let err = AuthenticatedUser::extract(&req).await.unwrap_err();
    assert!(matches!(err, AppError::LoginRequired(t) if t == "/accounts/login/?next=%2Forder-summary%2F"));
  }

  #[actix_web::test]
  async fn valid_header_yields_the_user() {
    let user = Uuid::new_v4();
    let req = TestRequest::get()
      .uri("/checkout/")
      .insert_header((USER_ID_HEADER, user.to_string()))
      .to_http_request();
    assert_eq!(AuthenticatedUser::extract(&req).await.unwrap().user_id, user);

    let anon = TestRequest::get()
      .insert_header((USER_ID_HEADER, "not-a-uuid"))
      .to_http_request();
    assert_eq!(MaybeUser::extract(&anon).await.unwrap().0, None);
  }
}
