//! `GET /logout`: always succeeds and always lands on `/login`.

use axum::{
  extract::State,
  response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use fraudguard_core::{session::SessionContext, store::CredentialStore};
use tracing::info;

use crate::{
  AppState,
  session::{CurrentSession, removal_cookie},
};

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  session: CurrentSession,
  jar: CookieJar,
) -> Response
where
  S: CredentialStore + Clone + 'static,
{
  if let Some(token) = &session.token {
    state.sessions.invalidate(token).await;
  }
  if let SessionContext::Authenticated(s) = &session.context {
    info!(username = %s.username, "logged out");
  }
  (jar.remove(removal_cookie()), Redirect::to("/login")).into_response()
}
