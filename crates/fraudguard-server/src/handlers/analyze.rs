//! `POST /analyze`: the JSON broker endpoint.
//!
//! The request body is only buffered once the session guard has passed, so
//! an anonymous caller gets 401 whatever it sends, oversized bodies included.
//! The buffered read still honours the router's `DefaultBodyLimit`.

use axum::{
  Json,
  extract::{FromRequest, Request, State},
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use fraudguard_core::{broker, store::CredentialStore};
use serde_json::Value;

use crate::{AppState, error::Error, session::CurrentSession};

/// Pull `data` out of a `{"data": "<text>"}` body.
///
/// Anything else (not JSON, no `data`, `data` not a string) counts as no
/// data at all.
fn extract_payload(body: &[u8]) -> Option<String> {
  let value: Value = serde_json::from_slice(body).ok()?;
  value.get("data")?.as_str().map(str::to_owned)
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  session: CurrentSession,
  request: Request,
) -> Response
where
  S: CredentialStore + Clone + 'static,
{
  if let Err(e) = session.context.require_authenticated() {
    return Error::from(e).into_response();
  }

  let body = match Bytes::from_request(request, &state).await {
    Ok(body) => body,
    Err(rejection) => return rejection.into_response(),
  };

  let payload = extract_payload(&body);
  match broker::analyze(&session.context, payload.as_deref(), &*state.scorer).await {
    Ok(verdict) => Json(verdict).into_response(),
    Err(e) => Error::from(e).into_response(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn payload_extraction() {
    assert_eq!(extract_payload(br#"{"data": "T1,5.00"}"#).as_deref(), Some("T1,5.00"));
    assert_eq!(extract_payload(br#"{"data": ""}"#).as_deref(), Some(""));
    assert_eq!(extract_payload(br#"{"data": 42}"#), None);
    assert_eq!(extract_payload(br#"{"other": "x"}"#), None);
    assert_eq!(extract_payload(b"data=x"), None);
    assert_eq!(extract_payload(b""), None);
  }
}
