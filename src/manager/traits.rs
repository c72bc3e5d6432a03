/*!
 * Collaborator Contracts
 * Narrow seams to the service-activation transport and the hibernation agent
 */

use crate::catalog::AppRecord;
use crate::core::types::Pid;
use thiserror::Error;

/// Errors surfaced by the external collaborators.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("service bus unavailable: {0}")]
    BusUnavailable(String),

    #[error("activation of {service} failed: {reason}")]
    ActivationFailed { service: String, reason: String },

    #[error("hibernation of {app} failed: {reason}")]
    HibernationFailed { app: String, reason: String },
}

/// Service activation transport.
///
/// The manager requests activations and pid lookups; the concrete transport
/// (a session bus in the full shell) lives outside this crate.
pub trait ServiceTransport: Send + Sync {
    /// Activate the named service, optionally passing a parameter
    /// (e.g. "RESTORE" when waking a hibernated application).
    /// Fire-and-forget: success means the request was accepted, not that the
    /// application finished starting.
    fn activate(&self, service: &str, param: Option<&str>) -> Result<(), TransportError>;

    /// Resolve the service name to the owning process id, if any.
    fn service_pid(&self, service: &str) -> Option<Pid>;
}

/// Hibernation agent.
///
/// Suspends a running application while preserving its identity for a later
/// wake-up. The mechanism is external; the manager only sequences requests
/// and keeps the queues consistent.
#[cfg_attr(test, mockall::automock)]
pub trait Hibernator: Send + Sync {
    fn hibernate(&self, app: &AppRecord) -> Result<(), TransportError>;
}
