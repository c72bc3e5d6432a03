/*!
 * Application Record
 * One launchable application: identity plus mutable lifecycle fields
 */

use super::types::{AppSnapshot, AppState, PrestartHint};
use crate::core::types::Pid;
use log::debug;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};

/// A launchable application from the catalog.
///
/// Identity fields are fixed at construction; the manager mutates only the
/// lifecycle state and the recorded process id. Records are shared as
/// `Arc<AppRecord>` between the catalog and the scheduling queues.
#[derive(Debug)]
pub struct AppRecord {
    id: String,
    service: Option<String>,
    exec: Option<String>,
    wm_class: Option<String>,
    prestart_hint: PrestartHint,
    state: RwLock<AppState>,
    pid: AtomicU32,
}

impl AppRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            service: None,
            exec: None,
            wm_class: None,
            prestart_hint: PrestartHint::Never,
            state: RwLock::new(AppState::Inactive),
            pid: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    #[must_use]
    pub fn with_exec(mut self, exec: impl Into<String>) -> Self {
        self.exec = Some(exec.into());
        self
    }

    #[must_use]
    pub fn with_wm_class(mut self, wm_class: impl Into<String>) -> Self {
        self.wm_class = Some(wm_class.into());
        self
    }

    #[must_use]
    pub fn with_prestart_hint(mut self, hint: PrestartHint) -> Self {
        self.prestart_hint = hint;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn exec(&self) -> Option<&str> {
        self.exec.as_deref()
    }

    pub fn wm_class(&self) -> Option<&str> {
        self.wm_class.as_deref()
    }

    pub fn prestart_hint(&self) -> PrestartHint {
        self.prestart_hint
    }

    pub fn state(&self) -> AppState {
        *self.state.read()
    }

    pub fn set_state(&self, state: AppState) {
        let mut current = self.state.write();
        if *current != state {
            debug!("App {}: {:?} -> {:?}", self.id, *current, state);
            *current = state;
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid.load(Ordering::Acquire)
    }

    pub fn set_pid(&self, pid: Pid) {
        self.pid.store(pid, Ordering::Release);
    }

    /// Does the record currently have a live process?
    pub fn is_executing(&self) -> bool {
        self.state().is_executing()
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            id: self.id.clone(),
            service: self.service.clone(),
            state: self.state(),
            pid: self.pid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_defaults() {
        let app = AppRecord::new("browser");
        assert_eq!(app.id(), "browser");
        assert_eq!(app.state(), AppState::Inactive);
        assert_eq!(app.pid(), 0);
        assert_eq!(app.prestart_hint(), PrestartHint::Never);
        assert!(!app.is_executing());
    }

    #[test]
    fn test_builder_fields() {
        let app = AppRecord::new("mail")
            .with_service("org.shell.mail")
            .with_exec("mailer --daemon")
            .with_wm_class("Mailer")
            .with_prestart_hint(PrestartHint::Always);

        assert_eq!(app.service(), Some("org.shell.mail"));
        assert_eq!(app.exec(), Some("mailer --daemon"));
        assert_eq!(app.wm_class(), Some("Mailer"));
        assert_eq!(app.prestart_hint(), PrestartHint::Always);
    }

    #[test]
    fn test_state_and_pid_mutation() {
        let app = AppRecord::new("clock");
        app.set_pid(4321);
        app.set_state(AppState::Loading);

        assert_eq!(app.pid(), 4321);
        assert_eq!(app.state(), AppState::Loading);
        assert!(app.is_executing());
    }

    #[test]
    fn test_snapshot() {
        let app = AppRecord::new("clock").with_service("org.shell.clock");
        app.set_pid(7);
        app.set_state(AppState::Shown);

        let snap = app.snapshot();
        assert_eq!(snap.id, "clock");
        assert_eq!(snap.service.as_deref(), Some("org.shell.clock"));
        assert_eq!(snap.state, AppState::Shown);
        assert_eq!(snap.pid, 7);
    }
}
