/*!
 * Signal Intake
 * System notifications driving the memory status flags and self-healing
 */

use super::manager::AppManager;
use super::queues::QueueId;
use crate::catalog::{AppState, PrestartHint};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// The asynchronous system notifications the manager reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// Free memory dropped below the low watermark
    LowMemoryOn,
    /// Free memory recovered above the low watermark
    LowMemoryOff,
    /// The system wants background processes terminated
    BgKillOn,
    /// Background killing pressure ended
    BgKillOff,
    /// System boot finished
    InitDone,
}

impl AppManager {
    /// Apply one notification and re-check state.
    ///
    /// Each notice updates exactly one flag; `InitDone` sets a latch that
    /// never resets.
    pub fn handle_notice(&self, notice: Notice) {
        debug!("Notice received: {:?}", notice);
        match notice {
            Notice::LowMemoryOn => self.status.set_lowmem(true),
            Notice::LowMemoryOff => self.status.set_lowmem(false),
            Notice::BgKillOn => self.status.set_bg_killing(true),
            Notice::BgKillOff => self.status.set_bg_killing(false),
            Notice::InitDone => self.status.set_init_done(),
        }
        self.request_check();
    }

    /// A tracked service lost its owner: the process exited or disconnected.
    ///
    /// Always-on applications re-enter the prestartable queue, which is what
    /// makes them come back after a crash.
    pub fn handle_service_lost(&self, service: &str) {
        let app = match self.catalog.find_by_service(service) {
            Some(app) => app,
            None => return,
        };

        // Unless it was hibernated on purpose, the app is simply gone: it no
        // longer belongs in any queue that assumes a live process.
        if app.state() != AppState::Hibernating {
            app.set_state(AppState::Inactive);
            let mut queues = self.queues.lock();
            queues.remove(QueueId::Prestarted, &app);
            queues.remove(QueueId::Hibernatable, &app);
        }

        if app.prestart_hint() == PrestartHint::Always {
            info!("Always-on service {} lost, requeueing {}", service, app.id());
            self.queues.lock().add(QueueId::Prestartable, &app);
            self.request_check();
        }
    }
}
