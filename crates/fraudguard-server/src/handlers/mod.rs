pub mod analyze;
pub mod health;
pub mod login;
pub mod logout;
pub mod pages;
pub mod register;

use axum::{
  http::StatusCode,
  response::{Html, IntoResponse, Response},
};

/// An HTML page with a non-default status, used for form failures.
pub(super) fn html_with_status(status: StatusCode, body: String) -> Response {
  (status, Html(body)).into_response()
}
