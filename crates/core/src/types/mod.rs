//! Core types for Soirn.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod status;
pub mod submission;

pub use email::{Email, EmailError};
pub use id::SignupId;
pub use price::{CurrencyCode, Price};
pub use status::ProductStatus;
pub use submission::{SubmissionFailure, SubmissionState, SubmissionSuccess};
