//! Soirn Core - Shared types and cart logic.
//!
//! This crate provides the pieces shared by every Soirn component:
//! - `storefront` - HTTP service (waitlist, checkout, cart and catalog APIs)
//! - `cli` - Command-line tools for migrations, catalog checks and signups
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no network, no database
//! access, no HTTP clients. Persistence of the cart goes through the
//! [`cart::CartSlot`] trait so callers decide where the durable slot lives.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for emails, prices, IDs, statuses and
//!   submission request state
//! - [`cart`] - The shopping cart store and its persistence contract

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use types::*;
