//! Business logic services for storefront.
//!
//! # Services
//!
//! - `waitlist` - Waitlist signup gateway (rate limiting, validation, idempotent insert)

pub mod waitlist;

pub use waitlist::{SignupError, SignupGateway, SignupOutcome, SignupRequest};
