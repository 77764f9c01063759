//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HarmonyError`] at the port boundary. Capability and bus failures carry
//! their adapter-specific source boxed, so the domain stays free of IO crate
//! dependencies.

/// Workspace-wide error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum HarmonyError {
    /// A hub capability call failed (network or device error).
    #[error("hub capability error")]
    Hub(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A message bus operation failed.
    #[error("message bus error")]
    Bus(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Addressing did not resolve (unknown hub slug or activity slug).
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

impl HarmonyError {
    /// Wrap an adapter error as a hub capability failure.
    pub fn hub(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Hub(Box::new(source))
    }

    /// Wrap an adapter error as a bus failure.
    pub fn bus(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Bus(Box::new(source))
    }
}

/// A named thing could not be resolved.
#[derive(Debug, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Kind of thing looked up (e.g. `"Hub"`, `"Activity"`).
    pub entity: &'static str,
    /// The identifier that failed to resolve.
    pub id: String,
}
