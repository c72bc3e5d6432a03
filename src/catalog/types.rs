/*!
 * Catalog Types
 * Lifecycle state and snapshot views of application records
 */

use crate::core::types::Pid;
use serde::{Deserialize, Serialize};

/// Application lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    /// No process associated with the application
    Inactive,
    /// Launched, waiting for its window to map
    Loading,
    /// Service activated in the background, not yet shown
    Prestarted,
    /// Window mapped and visible to the user
    Shown,
    /// Suspended with identity preserved for later wake-up
    Hibernating,
}

impl AppState {
    /// Does this state correspond to a live process?
    ///
    /// Hibernating apps keep their identity but no running process.
    #[inline]
    #[must_use]
    pub const fn is_executing(&self) -> bool {
        matches!(self, AppState::Loading | AppState::Prestarted | AppState::Shown)
    }
}

/// Whether an application asks to be pre-launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrestartHint {
    /// Only started on user request
    #[default]
    Never,
    /// Kept running in the background whenever memory allows
    Always,
}

/// Serializable point-in-time view of an application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppSnapshot {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub state: AppState,
    pub pid: Pid,
}
