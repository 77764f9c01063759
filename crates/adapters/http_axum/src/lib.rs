//! # harmony-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **read facade**: hub list, per-hub activity catalog, and the
//!   last known state snapshot, straight from the registry caches
//! - Serve the **action routes** (`off`, `start_activity`) that trigger the
//!   same hub actions as the bus command bridge
//! - Gate every route except `/_ping` behind hub availability
//! - Map application results into HTTP responses
//!
//! ## Dependency rule
//! Depends on `harmony-app` (registry and command service) and
//! `harmony-domain` (types used in response mapping). Never leaks axum types
//! into the core.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
