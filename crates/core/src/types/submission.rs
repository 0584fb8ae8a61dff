//! Request state for form submissions such as a waitlist signup.
//!
//! A submission moves `Idle -> InFlight -> Succeeded | Failed`. Transitions
//! happen synchronously when the request is dispatched and when it settles,
//! so a caller can disable its submit control while the state is
//! [`SubmissionState::InFlight`].

use serde::{Deserialize, Serialize};

/// What a successful submission reported back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionSuccess {
    /// A new record was created.
    Created,
    /// The record already existed; treated as success.
    AlreadyRegistered,
}

/// Why a submission failed, as far as the user is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionFailure {
    /// The server rejected the input (validation or rate limit).
    Rejected(String),
    /// The server failed while processing the request.
    Server,
    /// The request never reached the server.
    Network,
}

impl SubmissionFailure {
    /// Message to show the user.
    ///
    /// Server-side rejections are shown verbatim. Server failures never leak
    /// internal details, and network failures are worded differently so users
    /// can tell connectivity problems apart from rejections.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Rejected(message) => message,
            Self::Server => "Something went wrong. Try again.",
            Self::Network => "Network error. Try again.",
        }
    }
}

/// State of a single submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    Succeeded(SubmissionSuccess),
    Failed(SubmissionFailure),
}

impl SubmissionState {
    /// Mark the request as dispatched.
    ///
    /// Returns `false` (and leaves the state alone) if a request is already
    /// in flight, so a double submit is never sent.
    pub fn dispatch(&mut self) -> bool {
        if self.is_in_flight() {
            return false;
        }
        *self = Self::InFlight;
        true
    }

    /// Record the outcome of the in-flight request.
    ///
    /// Ignored unless a request is in flight.
    pub fn settle(&mut self, outcome: Result<SubmissionSuccess, SubmissionFailure>) {
        if !self.is_in_flight() {
            return;
        }
        *self = match outcome {
            Ok(success) => Self::Succeeded(success),
            Err(failure) => Self::Failed(failure),
        };
    }

    /// Whether a request is currently in flight.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    /// Message for the current state, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Idle | Self::InFlight => None,
            Self::Succeeded(SubmissionSuccess::Created) => Some("Thanks! You're in."),
            Self::Succeeded(SubmissionSuccess::AlreadyRegistered) => {
                Some("You're already on the list.")
            }
            Self::Failed(failure) => Some(failure.user_message()),
        }
    }
}
