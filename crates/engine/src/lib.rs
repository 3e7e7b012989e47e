//! Ship Restrict Engine - restriction rules and licensing.
//!
//! The engine decides, per cart item, whether the shipping destination is
//! disallowed for that item, and gates premium rule capacity behind a
//! remote license check.
//!
//! # Architecture
//!
//! - [`store`] - Gateway traits to the host platform's key-value storage
//!   (settings record, per-entity metadata, catalog), plus in-memory and
//!   JSON-file implementations
//! - [`restriction`] - Pure location matching and the per-item evaluator
//! - [`rules`] - Rule store: validated add, delete, display views, ceilings
//! - [`license`] - Remote license client, call budget, and cache manager
//! - [`admin`] - Command structs and handlers for the admin surface
//! - [`hooks`] - Cart/checkout validation entry points for the host
//!
//! Everything is an explicitly constructed service carrying injected
//! dependencies (stores, HTTP client, clock); there is no global state.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod clock;
pub mod config;
pub mod hooks;
pub mod license;
pub mod restriction;
pub mod rules;
pub mod settings;
pub mod store;

pub use admin::{AdminService, Notice, NoticeKind};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{EngineConfig, SiteConfig};
pub use hooks::CheckoutHooks;
pub use license::{CallBudget, LicenseApi, LicenseClient, LicenseManager};
pub use restriction::Evaluator;
pub use rules::RuleStore;
pub use settings::SettingsRecord;
