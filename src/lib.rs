/*!
 * appmgr
 * Memory-pressure-aware application lifecycle management for the desktop shell
 *
 * Decides which applications to pre-launch, keep running, hibernate, or kill
 * while the system moves in and out of memory pressure. The launcher catalog,
 * the compositor, and the service-activation transport are external
 * collaborators reached through narrow contracts.
 */

pub mod catalog;
pub mod core;
pub mod events;
pub mod manager;
pub mod memory;

// Re-exports
pub use crate::core::types::{Pages, Pid};
pub use catalog::{AppRecord, AppSnapshot, AppState, Catalog, PrestartHint};
pub use events::{AppEvent, EventBus, EventKind};
pub use manager::{
    AppManager, AppManagerBuilder, Hibernator, ManagerError, ManagerResult, Notice, QueueId,
    ServiceTransport, TransportError,
};
pub use memory::{Counter, MemoryPolicy, MemoryProbe, PrestartMode, PRESTART_ENV_VAR};
