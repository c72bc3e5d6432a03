/*!
 * Lifecycle Events
 * Named events the manager emits for the rest of the shell to observe
 */

use crate::catalog::AppRecord;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Event kind tag, useful for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// An application was launched on user request
    Launched,
    /// An application's window appeared
    Appeared,
}

/// An observable lifecycle event carrying the affected record.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Launched(Arc<AppRecord>),
    Appeared(Arc<AppRecord>),
}

impl AppEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AppEvent::Launched(_) => EventKind::Launched,
            AppEvent::Appeared(_) => EventKind::Appeared,
        }
    }

    pub fn app(&self) -> &Arc<AppRecord> {
        match self {
            AppEvent::Launched(app) | AppEvent::Appeared(app) => app,
        }
    }
}

type EventHandler = Box<dyn Fn(&AppEvent) + Send + Sync>;

/// Subscriber registry with synchronous, in-order delivery.
///
/// Delivery order equals emission order; handlers run on the emitting thread.
/// Handlers must not block for unbounded time.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<EventHandler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        self.handlers.write().push(Box::new(handler));
    }

    pub fn emit(&self, event: &AppEvent) {
        for handler in self.handlers.read().iter() {
            handler(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_delivery_in_emission_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        bus.subscribe(move |event| sink.lock().push(event.kind()));

        let app = Arc::new(AppRecord::new("term"));
        bus.emit(&AppEvent::Launched(Arc::clone(&app)));
        bus.emit(&AppEvent::Appeared(app));

        assert_eq!(*seen.lock(), [EventKind::Launched, EventKind::Appeared]);
    }

    #[test]
    fn test_all_subscribers_receive() {
        let bus = EventBus::new();
        let first = Arc::new(Mutex::new(0u32));
        let second = Arc::new(Mutex::new(0u32));

        let sink = Arc::clone(&first);
        bus.subscribe(move |_| *sink.lock() += 1);
        let sink = Arc::clone(&second);
        bus.subscribe(move |_| *sink.lock() += 1);

        bus.emit(&AppEvent::Launched(Arc::new(AppRecord::new("a"))));

        assert_eq!(*first.lock(), 1);
        assert_eq!(*second.lock(), 1);
    }
}
