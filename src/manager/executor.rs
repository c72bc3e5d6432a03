/*!
 * Launch Execution
 * Launch, prestart, wake-up, hibernation, and termination of applications
 */

use super::manager::AppManager;
use super::queues::QueueId;
use super::spawn;
use super::types::{ManagerError, ManagerResult};
use crate::catalog::{AppRecord, AppState};
use crate::core::types::Pid;
use crate::events::AppEvent;
use log::{debug, info, warn};
use nix::sys::signal::{kill as send_signal, Signal};
use nix::unistd::Pid as NixPid;
use std::sync::Arc;

/// Activation parameter asking a service to restore from hibernation.
const RESTORE_PARAM: &str = "RESTORE";

impl AppManager {
    /// Launch an application on user request.
    ///
    /// Service apps are activated by name; plain apps are spawned from their
    /// command line. A manually launched service app is withdrawn from
    /// prestart consideration for the rest of its life.
    pub fn launch(&self, app: &Arc<AppRecord>) -> ManagerResult<()> {
        if !self.policy.can_launch() {
            debug!("Not enough memory to launch {}", app.id());
            return Err(ManagerError::InsufficientMemory);
        }

        let pid = if let Some(service) = app.service() {
            let activated = self.activate_service(service, None);
            self.queues.lock().remove(QueueId::Prestartable, app);
            activated?;
            self.service_pid(service)
        } else if let Some(exec) = app.exec() {
            let (pid, child) = spawn::spawn_executable(exec)?;
            self.children.insert(pid, child);
            pid
        } else {
            return Err(ManagerError::NothingToLaunch);
        };

        app.set_pid(pid);
        app.set_state(AppState::Loading);
        info!("Launched {} (pid {})", app.id(), pid);
        self.events.emit(&AppEvent::Launched(Arc::clone(app)));
        Ok(())
    }

    /// Tell an already-running application it has been launched again.
    /// Service apps get a fresh activation to come to the foreground; plain
    /// executables have nothing to raise.
    pub fn relaunch(&self, app: &Arc<AppRecord>) -> ManagerResult<()> {
        match app.service() {
            Some(service) => self.activate_service(service, None),
            None => Ok(()),
        }
    }

    /// Activate an application's service in the background.
    pub fn prestart(&self, app: &Arc<AppRecord>) -> ManagerResult<()> {
        if app.is_executing() {
            return Ok(());
        }

        let service = match app.service() {
            Some(service) => service,
            None => {
                warn!("Cannot prestart {} without a service", app.id());
                return Err(ManagerError::NoService);
            }
        };

        match self.activate_service(service, None) {
            Ok(()) => {
                self.queues
                    .lock()
                    .move_to(QueueId::Prestartable, QueueId::Prestarted, app);
                app.set_pid(self.service_pid(service));
                app.set_state(AppState::Prestarted);
                info!("Prestarted {} (pid {})", app.id(), app.pid());
                Ok(())
            }
            Err(e) => {
                // Rotate to the back so one persistently failing app does
                // not block the rest of the queue.
                let mut queues = self.queues.lock();
                queues.remove(QueueId::Prestartable, app);
                queues.add(QueueId::Prestartable, app);
                Err(e)
            }
        }
    }

    /// Wake a hibernated application back up.
    pub fn wakeup(&self, app: &Arc<AppRecord>) -> ManagerResult<()> {
        if app.state() != AppState::Hibernating {
            return Ok(());
        }

        let service = match app.service() {
            Some(service) => service,
            None => {
                warn!("Cannot wake {} without a service", app.id());
                return Err(ManagerError::NoService);
            }
        };

        if !self.policy.can_launch() {
            debug!("Not enough memory to wake {}", app.id());
            return Err(ManagerError::InsufficientMemory);
        }

        self.activate_service(service, Some(RESTORE_PARAM))?;
        self.queues.lock().remove(QueueId::Hibernated, app);
        app.set_pid(self.service_pid(service));
        app.set_state(AppState::Loading);
        info!("Woke {} (pid {})", app.id(), app.pid());
        Ok(())
    }

    /// Hibernate a running application through the collaborator.
    pub fn hibernate(&self, app: &Arc<AppRecord>) -> ManagerResult<()> {
        let hibernator = self
            .hibernator
            .as_ref()
            .ok_or(ManagerError::NoHibernator)?;

        if !app.is_executing() {
            return Ok(());
        }

        hibernator.hibernate(app)?;
        self.queues
            .lock()
            .move_to(QueueId::Hibernatable, QueueId::Hibernated, app);
        app.set_state(AppState::Hibernating);
        info!("Hibernated {}", app.id());
        Ok(())
    }

    /// Terminate an application's process.
    ///
    /// Best effort: the process may be gone by the time the signal lands, in
    /// which case the caller gets a soft failure and the bookkeeping corrects
    /// itself through the service-lost notification.
    pub fn kill(&self, app: &Arc<AppRecord>) -> ManagerResult<()> {
        if !app.is_executing() {
            return Err(ManagerError::NotExecuting);
        }

        let pid = app.pid();
        if pid == 0 {
            // An app believed running with no pid: bookkeeping went wrong
            // somewhere; the next successful launch repairs it.
            warn!("App {} is marked executing but has no pid", app.id());
            return Err(ManagerError::MissingPid);
        }

        send_signal(NixPid::from_raw(pid as i32), Signal::SIGTERM)
            .map_err(|e| ManagerError::SignalFailed(e.to_string()))?;

        {
            let mut queues = self.queues.lock();
            queues.remove(QueueId::Prestarted, app);
            queues.remove(QueueId::Hibernatable, app);
        }
        app.set_state(AppState::Inactive);
        info!("Killed {} (pid {})", app.id(), pid);
        Ok(())
    }

    pub(super) fn activate_service(
        &self,
        service: &str,
        param: Option<&str>,
    ) -> ManagerResult<()> {
        let transport = self.transport.as_ref().ok_or(ManagerError::NoTransport)?;
        transport.activate(service, param)?;
        Ok(())
    }

    pub(super) fn service_pid(&self, service: &str) -> Pid {
        match self.transport.as_ref().and_then(|t| t.service_pid(service)) {
            Some(pid) => pid,
            None => {
                debug!("No pid for service {}", service);
                0
            }
        }
    }
}
