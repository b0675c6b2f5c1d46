//! Theme projections and the live-theme swap plan.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::RemoteError;

/// Read-only view of one theme hosted by the remote Help Center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeInfo {
    pub id: String,
    pub name: String,
    /// Whether this theme is the one currently served to visitors.
    #[serde(rename = "live", default)]
    pub is_live: bool,
}

/// Return the id of the theme flagged live.
///
/// # Errors
///
/// Returns [`RemoteError::NoLiveTheme`] when no entry is live.
pub fn live_theme_id(themes: &[ThemeInfo]) -> Result<&str> {
    themes
        .iter()
        .find(|t| t.is_live)
        .map(|t| t.id.as_str())
        .ok_or_else(|| RemoteError::NoLiveTheme.into())
}

/// Transient plan computed before a theme is made live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPlan {
    /// Theme created by the import job.
    pub new_theme_id: String,
    /// Theme that was live before publishing, archived afterwards. `None` when persisting.
    pub previous_live_theme_id: Option<String>,
    /// Keep the previous live theme instead of archiving it.
    pub persist: bool,
}

impl SwapPlan {
    /// Plan that publishes `new_theme_id` and keeps every other theme.
    #[must_use]
    pub fn persisting(new_theme_id: String) -> Self {
        Self {
            new_theme_id,
            previous_live_theme_id: None,
            persist: true,
        }
    }

    /// Plan that publishes `new_theme_id` and archives `previous`.
    #[must_use]
    pub fn replacing(new_theme_id: String, previous: String) -> Self {
        Self {
            new_theme_id,
            previous_live_theme_id: Some(previous),
            persist: false,
        }
    }

    /// Theme to archive once the new one is live.
    ///
    /// Never the new theme itself, even if the remote listed it as live already.
    #[must_use]
    pub fn theme_to_archive(&self) -> Option<&str> {
        self.previous_live_theme_id
            .as_deref()
            .filter(|id| *id != self.new_theme_id)
    }
}
