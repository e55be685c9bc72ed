// storefront/src/web/responses.rs

use actix_web::http::header;
use actix_web::HttpResponse;
use serde::Serialize;
use uuid::Uuid;

use crate::notices::Notice;
use crate::pipelines::contexts::Outcome;
use crate::state::AppState;

/// A rendered page: the view's data plus the notices queued for the viewer.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
  #[serde(flatten)]
  pub body: T,
  pub messages: Vec<Notice>,
}

pub fn redirect(location: &str) -> HttpResponse {
  HttpResponse::Found()
    .insert_header((header::LOCATION, location))
    .finish()
}

/// Renders `body` for `user`, draining their queued notices into `messages`.
pub fn page<T: Serialize>(state: &AppState, user: Option<Uuid>, body: T) -> HttpResponse {
  let messages = user.map(|id| state.notices.drain(id)).unwrap_or_default();
  HttpResponse::Ok().json(Page { body, messages })
}

/// Queues `notice` for `user` and redirects to `location`.
pub fn notify_and_redirect(state: &AppState, user: Option<Uuid>, notice: Notice, location: &str) -> HttpResponse {
  match user {
    Some(user_id) => state.notices.push(user_id, notice),
    None => tracing::debug!(notice = %notice.message, "Dropping notice for anonymous visitor."),
  }
  redirect(location)
}

pub fn finish_outcome(state: &AppState, user: Option<Uuid>, outcome: Outcome) -> HttpResponse {
  notify_and_redirect(state, user, outcome.notice, &outcome.redirect_to)
}
