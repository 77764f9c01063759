//! Activity — a named, device-defined operating mode a hub can be switched
//! into (e.g. "Watch TV").

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::slug::Slug;

/// Opaque device-assigned activity identifier.
///
/// The hub reserves `-1` as a sentinel meaning "no activity running"; that
/// value never appears in an activity catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(i64);

impl ActivityId {
    /// The sentinel id reported by a hub when no activity is running.
    pub const OFF: Self = Self(-1);

    /// Wrap a raw device-assigned identifier.
    #[must_use]
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Whether this is the "no activity running" sentinel.
    #[must_use]
    pub fn is_off(self) -> bool {
        self == Self::OFF
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A hub activity. Immutable once constructed; catalogs are rebuilt
/// wholesale on each successful poll, never patched incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Device-assigned identifier.
    pub id: ActivityId,
    /// Normalized label, used in bus topics and HTTP paths.
    pub slug: Slug,
    /// Human-readable display name.
    pub label: String,
    /// Whether the hub classifies this as an audio/video activity.
    #[serde(rename = "isAVActivity")]
    pub is_av_activity: bool,
}

impl Activity {
    /// Build an activity from a device-reported id and label, deriving the
    /// slug from the label.
    #[must_use]
    pub fn new(id: ActivityId, label: impl Into<String>, is_av_activity: bool) -> Self {
        let label = label.into();
        Self {
            id,
            slug: Slug::normalize(&label),
            label,
            is_av_activity,
        }
    }
}
