//! CLI subcommand implementations.

pub mod catalog;
pub mod migrate;
pub mod waitlist;
