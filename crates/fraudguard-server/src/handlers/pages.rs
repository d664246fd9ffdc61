//! Form pages: `GET /`, `GET /login`, `GET /register`.

use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::{session::CurrentSession, views};

/// `GET /`. Anonymous callers are sent to the login page.
pub async fn index(session: CurrentSession) -> Response {
  match session.context.require_authenticated() {
    Ok(s) => Html(views::index_page(&s.username)).into_response(),
    Err(_) => Redirect::to("/login").into_response(),
  }
}

/// `GET /login`
pub async fn login() -> Html<String> { Html(views::login_page(None)) }

/// `GET /register`
pub async fn register() -> Html<String> { Html(views::register_page(None)) }
