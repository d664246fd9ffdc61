//! `POST /login`: form login.
//!
//! Success replaces any session the client already held, sets the session
//! cookie, and redirects to `/`. Failure re-renders the login page with a
//! 401 and establishes nothing.

use axum::{
  Form,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use fraudguard_core::{Error as CoreError, store::CredentialStore};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
  AppState, auth,
  error::Error,
  handlers::html_with_status,
  session::{CurrentSession, session_cookie},
  views,
};

/// Form body shared by login and registration. Missing fields read as empty.
#[derive(Deserialize)]
pub struct CredentialsForm {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

pub async fn submit<S>(
  State(state): State<AppState<S>>,
  session: CurrentSession,
  jar: CookieJar,
  Form(form): Form<CredentialsForm>,
) -> Result<Response, Error>
where
  S: CredentialStore + Clone + 'static,
{
  match auth::authenticate(&*state.store, &form.username, &form.password).await {
    Ok(user) => {
      if let Some(old) = &session.token {
        state.sessions.invalidate(old).await;
      }
      let (token, _) = state.sessions.issue(&user).await;
      info!(username = %user.username, "login succeeded");

      let jar = jar.add(session_cookie(token, state.config.cookie_secure));
      Ok((jar, Redirect::to("/")).into_response())
    }
    Err(Error::Core(CoreError::AuthenticationFailed)) => {
      warn!(username = %form.username.trim(), "login failed");
      Ok(html_with_status(
        StatusCode::UNAUTHORIZED,
        views::login_page(Some("Invalid username or password")),
      ))
    }
    Err(e) => Err(e),
  }
}
