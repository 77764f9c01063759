//! Application services — use-cases shared by the driving adapters.

pub mod commands;

pub use commands::HubCommandService;
