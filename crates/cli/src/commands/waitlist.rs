//! Waitlist client command.
//!
//! Submits a signup to a running storefront and reports the outcome the way
//! the site's signup form does.

use serde_json::{Value, json};
use url::Url;

use soirn_core::{SubmissionFailure, SubmissionState, SubmissionSuccess};

/// Submit a waitlist signup and return the final submission state.
///
/// # Errors
///
/// Returns an error only if `base_url` cannot be joined with the API path.
/// Request failures are reported through the returned state.
pub async fn join(
    base_url: &Url,
    email: &str,
    source: Option<&str>,
) -> Result<SubmissionState, url::ParseError> {
    let endpoint = base_url.join("/api/waitlist")?;

    let mut state = SubmissionState::default();
    state.dispatch();

    let mut body = json!({ "email": email });
    if let Some(source) = source {
        body["source"] = Value::String(source.to_owned());
    }

    let outcome = submit(&endpoint, &body).await;
    state.settle(outcome);
    Ok(state)
}

async fn submit(endpoint: &Url, body: &Value) -> Result<SubmissionSuccess, SubmissionFailure> {
    let response = reqwest::Client::new()
        .post(endpoint.clone())
        .json(body)
        .send()
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Waitlist request failed");
            SubmissionFailure::Network
        })?;

    let status = response.status();
    let payload: Value = response.json().await.unwrap_or(Value::Null);
    interpret(status, &payload)
}

/// Map a response to a submission outcome.
fn interpret(
    status: reqwest::StatusCode,
    payload: &Value,
) -> Result<SubmissionSuccess, SubmissionFailure> {
    if status.is_success() {
        if payload.get("already").and_then(Value::as_bool) == Some(true) {
            return Ok(SubmissionSuccess::AlreadyRegistered);
        }
        return Ok(SubmissionSuccess::Created);
    }

    if status.is_client_error()
        && let Some(message) = payload.get("error").and_then(Value::as_str)
    {
        return Err(SubmissionFailure::Rejected(message.to_owned()));
    }

    Err(SubmissionFailure::Server)
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_interpret_success() {
        assert_eq!(
            interpret(StatusCode::OK, &json!({"ok": true})),
            Ok(SubmissionSuccess::Created)
        );
        assert_eq!(
            interpret(StatusCode::OK, &json!({"ok": true, "already": true})),
            Ok(SubmissionSuccess::AlreadyRegistered)
        );
    }

    #[test]
    fn test_interpret_rejections() {
        assert_eq!(
            interpret(StatusCode::BAD_REQUEST, &json!({"error": "Invalid email"})),
            Err(SubmissionFailure::Rejected("Invalid email".to_string()))
        );
        assert_eq!(
            interpret(
                StatusCode::TOO_MANY_REQUESTS,
                &json!({"error": "Too many requests. Try again soon."})
            ),
            Err(SubmissionFailure::Rejected(
                "Too many requests. Try again soon.".to_string()
            ))
        );
    }

    #[test]
    fn test_interpret_server_errors_are_generic() {
        assert_eq!(
            interpret(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({"error": "Failed to join waitlist. Try again."})
            ),
            Err(SubmissionFailure::Server)
        );
        assert_eq!(
            interpret(StatusCode::BAD_REQUEST, &Value::Null),
            Err(SubmissionFailure::Server)
        );
    }
}
