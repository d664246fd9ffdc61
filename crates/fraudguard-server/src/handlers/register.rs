//! `POST /register`: create a user and send them to the login page.

use axum::{
  Form,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
};
use fraudguard_core::{Error as CoreError, store::CredentialStore};
use tracing::info;

use crate::{
  AppState, auth,
  error::Error,
  handlers::{html_with_status, login::CredentialsForm},
  views,
};

pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<CredentialsForm>,
) -> Result<Response, Error>
where
  S: CredentialStore + Clone + 'static,
{
  match auth::register(&*state.store, &form.username, &form.password).await {
    Ok(user) => {
      info!(username = %user.username, user_id = %user.user_id, "user registered");
      Ok(Redirect::to("/login").into_response())
    }
    Err(Error::Core(CoreError::DuplicateUsername(_))) => Ok(html_with_status(
      StatusCode::CONFLICT,
      views::register_page(Some("Username already exists")),
    )),
    Err(Error::BadRequest(msg)) => Ok(html_with_status(
      StatusCode::BAD_REQUEST,
      views::register_page(Some(&msg)),
    )),
    Err(e) => Err(e),
  }
}
