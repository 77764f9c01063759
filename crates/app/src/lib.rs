//! # harmony-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - [`HubClient`](ports::HubClient) — the hub capability (list activities,
//!     read current activity, start activity, power off)
//!   - [`MessagePublisher`](ports::MessagePublisher) — retained publishes to
//!     the message bus
//! - Own the **hub lifecycle registry**: one connection record per hub slug,
//!   created when a hub becomes reachable and torn down when it is lost
//! - Run the per-hub **catalog poller** and **state synchronization engine**
//!   as a single cooperative task per hub
//! - Provide the **command service** shared by the bus command bridge and
//!   the HTTP action routes
//!
//! ## Dependency rule
//! Depends on `harmony-domain` only (plus `tokio::sync`/`tokio::time` for
//! channels and timers). Never imports adapter crates. Adapters depend on
//! *this* crate, not the reverse.

pub mod gateway;
pub mod ports;
pub mod registry;
pub mod services;
mod sync;
