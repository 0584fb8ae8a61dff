//! Waitlist signup route handler.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::rate_limit::client_identifier;
use crate::state::AppState;

/// Response body for an accepted signup.
#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub already: bool,
}

/// Join the waitlist.
///
/// The body is read raw so that the rate limit is applied before any
/// parsing. Responds `{"ok":true}`, or `{"ok":true,"already":true}` when the
/// email was already registered.
#[instrument(skip(state, headers, body))]
pub async fn join(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<JoinResponse>> {
    let client = client_identifier(&headers);
    let outcome = state.gateway().submit(&client, &body).await?;

    Ok(Json(JoinResponse {
        ok: true,
        already: outcome.already(),
    }))
}
