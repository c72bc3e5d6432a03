/*!
 * Memory Policy
 * Decides whether the system can afford to launch or prestart applications
 */

use super::probe::{Counter, MemoryProbe};
use crate::core::types::Pages;
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable holding the prestart opt-in.
///
/// not set|"no"|"false" - never prestart.
/// "yes"|"auto"|"0"     - prestart while free pages stay above the low
///                        watermark plus the decay margin.
/// number               - prestart while free pages stay above the low
///                        watermark plus this reserve.
/// Any other value on a system without lowmem counters forces prestarting
/// unconditionally (development sandboxes have no memory limits).
pub const PRESTART_ENV_VAR: &str = "APPMGR_APPS_PRESTART";

/// Prestart admission mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrestartMode {
    /// Never prestart apps
    Never,
    /// Prestart while enough pages are free
    Auto,
    /// Prestart unconditionally (no memory limits present)
    Always,
}

/// Admission policy for launching and prestarting.
///
/// Thresholds are computed once at construction; only the current free-page
/// count is re-read on each decision. A `None` threshold or free count means
/// the lowmem subsystem is absent and the check passes permissively.
#[derive(Debug)]
pub struct MemoryPolicy {
    probe: MemoryProbe,
    mode: PrestartMode,
    prestart_required: Option<Pages>,
    launch_required: Option<Pages>,
}

impl MemoryPolicy {
    /// Build the policy from the probe and an explicit configuration value.
    pub fn new(probe: MemoryProbe, prestart_config: Option<&str>) -> Self {
        let low = probe.read(Counter::LowWatermark);
        let high = probe.read(Counter::HighWatermark);
        let decay = probe.read(Counter::DecayMargin);

        let (mode, prestart_required) = Self::setup_prestart(&probe, low, decay, prestart_config);
        let launch_required = Self::setup_launch(high, decay);

        debug!(
            "Memory policy: prestart {:?} (required pages {:?}), launch required pages {:?}",
            mode, prestart_required, launch_required
        );

        Self {
            probe,
            mode,
            prestart_required,
            launch_required,
        }
    }

    /// Build the policy reading the opt-in from the environment.
    pub fn from_env(probe: MemoryProbe) -> Self {
        let config = env::var(PRESTART_ENV_VAR).ok();
        Self::new(probe, config.as_deref())
    }

    fn prestart_enabled(config: Option<&str>) -> bool {
        match config {
            Some(v) => !v.is_empty() && v != "no" && v != "false",
            None => false,
        }
    }

    fn setup_prestart(
        probe: &MemoryProbe,
        low: Option<Pages>,
        decay: Option<Pages>,
        config: Option<&str>,
    ) -> (PrestartMode, Option<Pages>) {
        let enabled = Self::prestart_enabled(config);

        let (low, _decay) = match (low, decay) {
            (Some(low), Some(decay)) => (low, decay),
            _ => {
                // No lowmem counters: assume a sandbox without memory limits
                // and honor an explicit opt-in unconditionally.
                debug!("No memory limits found, assuming sandbox environment");
                let mode = if enabled {
                    PrestartMode::Always
                } else {
                    PrestartMode::Never
                };
                return (mode, None);
            }
        };

        if !enabled {
            return (PrestartMode::Never, None);
        }

        // Lenient parse: "yes"/"auto" and other non-numeric values mean a
        // zero reserve, which falls back to the decay margin.
        let reserved = config
            .map(|v| v.trim().parse::<Pages>().unwrap_or(0))
            .unwrap_or(0);
        let required = if reserved == 0 {
            probe.read(Counter::DecayMargin).map(|d| low + d)
        } else {
            Some(low + reserved)
        };

        (PrestartMode::Auto, required)
    }

    fn setup_launch(high: Option<Pages>, decay: Option<Pages>) -> Option<Pages> {
        match (high, decay) {
            (Some(high), Some(decay)) => Some(high + decay),
            _ => {
                debug!("No memory limits found, launches are unrestricted");
                None
            }
        }
    }

    pub fn mode(&self) -> PrestartMode {
        self.mode
    }

    pub fn prestart_required_pages(&self) -> Option<Pages> {
        self.prestart_required
    }

    pub fn launch_required_pages(&self) -> Option<Pages> {
        self.launch_required
    }

    /// Is there enough free memory to launch an application right now?
    pub fn can_launch(&self) -> bool {
        let required = match self.launch_required {
            Some(required) => required,
            // Not checking.
            None => return true,
        };

        match self.probe.read(Counter::FreePages) {
            Some(free) => free >= required,
            None => true,
        }
    }

    /// Is there enough free memory to prestart an application right now?
    pub fn can_prestart(&self) -> bool {
        match self.mode {
            PrestartMode::Always => return true,
            PrestartMode::Never => return false,
            PrestartMode::Auto => {}
        }

        match (self.probe.read(Counter::FreePages), self.prestart_required) {
            (Some(free), Some(required)) => free >= required,
            _ => true,
        }
    }
}
