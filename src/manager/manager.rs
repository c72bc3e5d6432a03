/*!
 * Application Manager
 * The explicitly-constructed facade owning queues, status, and policy
 */

use super::queues::{AppQueues, QueueId};
use super::spawn::ChildTable;
use super::status::MemoryStatus;
use super::traits::{Hibernator, ServiceTransport};
use crate::catalog::{AppRecord, AppSnapshot, AppState, Catalog, PrestartHint};
use crate::events::EventBus;
use crate::memory::{MemoryPolicy, MemoryProbe, PrestartMode};
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Default re-check interval while the state-check loop is armed.
pub(super) const STATE_CHECK_INTERVAL: Duration = Duration::from_secs(3);

/// The application lifecycle manager.
///
/// One instance per shell process, created at startup and torn down at
/// shutdown; there is no hidden global. All queue mutation is serialized
/// behind a single mutex, so notification delivery from any thread preserves
/// the cooperative single-threaded invariants.
pub struct AppManager {
    pub(super) catalog: Arc<Catalog>,
    pub(super) queues: Mutex<AppQueues>,
    pub(super) status: MemoryStatus,
    pub(super) launcher_shown: AtomicBool,
    pub(super) looping: AtomicBool,
    pub(super) policy: MemoryPolicy,
    pub(super) transport: Option<Arc<dyn ServiceTransport>>,
    pub(super) hibernator: Option<Arc<dyn Hibernator>>,
    pub(super) events: EventBus,
    pub(super) children: ChildTable,
    pub(super) check_interval: Duration,
    // Handed to the timer task; a dropped manager stops its own loop.
    pub(super) weak_self: Weak<AppManager>,
}

/// Builder for AppManager
pub struct AppManagerBuilder {
    catalog: Option<Arc<Catalog>>,
    transport: Option<Arc<dyn ServiceTransport>>,
    hibernator: Option<Arc<dyn Hibernator>>,
    probe: Option<MemoryProbe>,
    prestart_config: Option<Option<String>>,
    check_interval: Duration,
}

impl AppManagerBuilder {
    pub fn new() -> Self {
        Self {
            catalog: None,
            transport: None,
            hibernator: None,
            probe: None,
            prestart_config: None,
            check_interval: STATE_CHECK_INTERVAL,
        }
    }

    /// Use an existing catalog instead of an empty one.
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Add the service activation transport.
    pub fn with_transport(mut self, transport: Arc<dyn ServiceTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Add the hibernation collaborator.
    pub fn with_hibernator(mut self, hibernator: Arc<dyn Hibernator>) -> Self {
        self.hibernator = Some(hibernator);
        self
    }

    /// Read memory counters from an alternate probe.
    pub fn with_probe(mut self, probe: MemoryProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Inject the prestart opt-in instead of reading the environment.
    pub fn with_prestart_config(mut self, config: Option<&str>) -> Self {
        self.prestart_config = Some(config.map(str::to_string));
        self
    }

    /// Override the state-check interval.
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Build the AppManager
    pub fn build(self) -> Arc<AppManager> {
        let probe = self.probe.unwrap_or_default();
        let policy = match self.prestart_config {
            Some(config) => MemoryPolicy::new(probe, config.as_deref()),
            None => MemoryPolicy::from_env(probe),
        };

        let mut features = Vec::new();
        if self.transport.is_some() {
            features.push("transport");
        }
        if self.hibernator.is_some() {
            features.push("hibernator");
        }
        features.push(match policy.mode() {
            PrestartMode::Never => "prestart:never",
            PrestartMode::Auto => "prestart:auto",
            PrestartMode::Always => "prestart:always",
        });

        info!("App manager initialized with: {}", features.join(", "));

        Arc::new_cyclic(|weak| AppManager {
            catalog: self.catalog.unwrap_or_else(|| Arc::new(Catalog::new())),
            queues: Mutex::new(AppQueues::new()),
            status: MemoryStatus::new(),
            launcher_shown: AtomicBool::new(false),
            looping: AtomicBool::new(false),
            policy,
            transport: self.transport,
            hibernator: self.hibernator,
            events: EventBus::new(),
            children: ChildTable::new(),
            check_interval: self.check_interval,
            weak_self: weak.clone(),
        })
    }
}

impl Default for AppManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppManager {
    /// Create a builder for constructing an AppManager
    pub fn builder() -> AppManagerBuilder {
        AppManagerBuilder::new()
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn policy(&self) -> &MemoryPolicy {
        &self.policy
    }

    /// The catalog finished its initial population: seed the prestartable
    /// queue with every always-on application and run a state check.
    pub fn catalog_populated(&self) {
        let mut seeded = 0;
        {
            let mut queues = self.queues.lock();
            for app in self.catalog.apps() {
                if app.prestart_hint() == PrestartHint::Always {
                    queues.add(QueueId::Prestartable, &app);
                    seeded += 1;
                }
            }
        }
        if seeded > 0 {
            info!("{} applications queued for prestart", seeded);
        }
        self.request_check();
    }

    /// The window manager reports whether the launcher UI is visible.
    /// Re-checks state on every flip; prestarting pauses while it is shown.
    pub fn notify_launcher_state(&self, shown: bool) {
        if self.launcher_shown.swap(shown, Ordering::AcqRel) != shown {
            self.request_check();
        }
    }

    pub fn launcher_shown(&self) -> bool {
        self.launcher_shown.load(Ordering::Acquire)
    }

    /// Is the state-check timer currently armed?
    pub fn is_looping(&self) -> bool {
        self.looping.load(Ordering::Acquire)
    }

    /// Mark an application as a prestart candidate.
    pub fn prestartable(&self, app: &Arc<AppRecord>) {
        self.queues.lock().add(QueueId::Prestartable, app);
    }

    /// Withdraw an application from prestart consideration.
    pub fn not_prestartable(&self, app: &Arc<AppRecord>) {
        self.queues.lock().remove(QueueId::Prestartable, app);
    }

    /// Mark a running application as eligible for hibernation.
    pub fn hibernatable(&self, app: &Arc<AppRecord>) {
        self.queues.lock().add(QueueId::Hibernatable, app);
    }

    /// Withdraw an application from hibernation consideration.
    pub fn not_hibernatable(&self, app: &Arc<AppRecord>) {
        self.queues.lock().remove(QueueId::Hibernatable, app);
    }

    pub fn queue_len(&self, queue: QueueId) -> usize {
        self.queues.lock().len(queue)
    }

    pub fn queue_contains(&self, queue: QueueId, app: &Arc<AppRecord>) -> bool {
        self.queues.lock().contains(queue, app)
    }

    pub fn queue_membership(&self, app: &Arc<AppRecord>) -> Option<QueueId> {
        self.queues.lock().membership(app)
    }

    /// Point-in-time view of every application, in catalog order.
    pub fn snapshot(&self) -> Vec<AppSnapshot> {
        self.catalog.apps().iter().map(|app| app.snapshot()).collect()
    }

    /// Log the application table at debug level.
    pub fn dump_app_list(&self, only_running: bool) {
        debug!("List of launched applications:");
        for app in self.catalog.apps() {
            if only_running && app.state() != AppState::Shown {
                continue;
            }
            debug!(
                "app={} wm_class={:?} service={:?} state={:?} pid={}",
                app.id(),
                app.wm_class(),
                app.service(),
                app.state(),
                app.pid()
            );
        }
    }

    /// Release all queue references. Records stay alive in the catalog.
    pub fn shutdown(&self) {
        self.queues.lock().clear();
        info!("App manager shut down");
    }
}

impl std::fmt::Debug for AppManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppManager")
            .field("catalog_len", &self.catalog.len())
            .field("looping", &self.is_looping())
            .field("children", &self.children.len())
            .finish()
    }
}
