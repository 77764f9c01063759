//! Slug — a normalized, URL- and topic-safe identifier derived from a
//! human-readable name.
//!
//! Slugs are the sole key for hubs and activities across the whole system:
//! registry entries, bus topics, and HTTP paths all address by slug.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized identifier derived from a human-readable label.
///
/// Normalization lowercases the label, keeps alphanumeric runs, collapses
/// every other run of characters into a single `-`, and trims leading and
/// trailing dashes: `"Watch TV"` becomes `watch-tv`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Build a slug by normalizing a human-readable label.
    #[must_use]
    pub fn normalize(label: &str) -> Self {
        let mut out = String::with_capacity(label.len());
        let mut pending_dash = false;
        for ch in label.chars() {
            if ch.is_alphanumeric() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.extend(ch.to_lowercase());
            } else {
                pending_dash = true;
            }
        }
        Self(out)
    }

    /// Access the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Wrap an already-normalized value taken from an inbound topic or URL path.
///
/// No normalization is applied: lookups must match the registered slug
/// byte-for-byte, so a caller sending `Watch-TV` simply finds nothing.
impl From<&str> for Slug {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Slug {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
