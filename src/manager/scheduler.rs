/*!
 * State Check Loop
 * One bounded action per tick: kill, hibernate, or prestart
 */

use super::manager::AppManager;
use super::queues::QueueId;
use log::{debug, trace};
use std::sync::atomic::Ordering;
use tokio::time::MissedTickBehavior;

impl AppManager {
    /// Run a state check now.
    ///
    /// The sole external trigger: called after every notification, launcher
    /// visibility flip, and catalog population. While the timer loop is
    /// armed this is a no-op; the next tick will reassess anyway.
    pub fn request_check(&self) {
        if self.looping.load(Ordering::Acquire) {
            return;
        }
        self.state_check_tick();
    }

    /// One pass of the state machine. Returns whether another pass is needed.
    ///
    /// Each step acts on at most one application, spreading kills and
    /// prestarts over the timer interval instead of storming through the
    /// queues while memory conditions are still settling.
    pub(super) fn state_check_tick(&self) -> bool {
        self.children.reap();

        let mut loop_needed = false;

        // Really low on memory: take down one prestarted app.
        if self.status.lowmem() {
            let head = self.queues.lock().head(QueueId::Prestarted);
            if let Some(app) = head {
                if let Err(e) = self.kill(&app) {
                    debug!("State check: could not kill {}: {}", app.id(), e);
                }
                if !self.queues.lock().is_empty(QueueId::Prestarted) {
                    loop_needed = true;
                }
            }
        }

        // Background killing requested: hibernate one app.
        if self.status.bg_killing() {
            let head = self.queues.lock().head(QueueId::Hibernatable);
            if let Some(app) = head {
                if self.hibernator.is_some() {
                    if let Err(e) = self.hibernate(&app) {
                        debug!("State check: could not hibernate {}: {}", app.id(), e);
                    }
                }
                if !self.queues.lock().is_empty(QueueId::Hibernatable) {
                    loop_needed = true;
                }
            }
        }

        // Memory is fine and nothing demands it: prestart one app.
        if self.status.init_done()
            && !self.status.lowmem()
            && !self.status.bg_killing()
            && !self.launcher_shown()
            && !self.queues.lock().is_empty(QueueId::Prestartable)
            && self.policy.can_prestart()
        {
            let head = self.queues.lock().head(QueueId::Prestartable);
            if let Some(app) = head {
                if let Err(e) = self.prestart(&app) {
                    debug!("State check: could not prestart {}: {}", app.id(), e);
                }
            }
            if !self.queues.lock().is_empty(QueueId::Prestartable) {
                loop_needed = true;
            }
        }

        // This runs from a timer tick or a direct request. Arm the timer if
        // work remains and nothing is armed yet; disarm when there is none.
        let was_looping = self.looping.load(Ordering::Acquire);
        if !was_looping && loop_needed {
            self.looping.store(true, Ordering::Release);
            self.arm_state_check();
        } else if !loop_needed {
            self.looping.store(false, Ordering::Release);
        }

        trace!("State check tick: loop_needed={}", loop_needed);
        loop_needed
    }

    /// Spawn the repeating timer task driving `state_check_tick`.
    ///
    /// Holds only a weak reference: dropping the manager stops the loop.
    fn arm_state_check(&self) {
        let manager = self.weak_self.clone();
        let interval = self.check_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the armed check already ran.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(manager) = manager.upgrade() else { break };
                if !manager.state_check_tick() {
                    break;
                }
            }
        });
    }
}
