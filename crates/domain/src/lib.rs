//! # harmony-domain
//!
//! Pure domain model for the harmony bridge.
//!
//! ## Responsibilities
//! - Foundational types: slugs, activity identifiers, error conventions
//! - Define **Activities** (named operating modes a hub can be switched into)
//! - Define **State snapshots** (the last known true device state per hub)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod activity;
pub mod error;
pub mod slug;
pub mod snapshot;
