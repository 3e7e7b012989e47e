//! Ship Restrict Core - Shared types library.
//!
//! This crate provides common types used across all Ship Restrict components:
//! - `engine` - Rule store, restriction evaluator, and license client
//! - `cli` - Command-line tools for managing rules and checking carts
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Addresses, restriction specs, rules, license state, verdicts
//! - [`us_states`] - Canonical US state and territory code table

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod us_states;

pub use types::*;
