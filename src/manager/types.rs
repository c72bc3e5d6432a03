/*!
 * Manager Types
 * Error taxonomy for lifecycle operations
 */

use super::traits::TransportError;
use thiserror::Error;

/// Lifecycle operation result
///
/// # Must Use
/// Launch failures are non-fatal and require compensating action by the caller
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Lifecycle operation errors
///
/// All variants are recoverable: the manager logs and carries on, and callers
/// are free to retry on a later state check.
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("not enough free memory")]
    InsufficientMemory,

    #[error("application has no activatable service")]
    NoService,

    #[error("application has neither service nor command line")]
    NothingToLaunch,

    #[error("no service transport configured")]
    NoTransport,

    #[error("no hibernation collaborator configured")]
    NoHibernator,

    #[error(transparent)]
    Activation(#[from] TransportError),

    #[error("spawn failed: {0}")]
    SpawnFailed(String),

    #[error("application is not executing")]
    NotExecuting,

    #[error("application has no recorded process id")]
    MissingPid,

    #[error("signal delivery failed: {0}")]
    SignalFailed(String),
}
