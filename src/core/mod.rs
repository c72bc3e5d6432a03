/*!
 * Core Module
 * Shared primitives used across the manager
 */

pub mod types;

pub use types::{Pages, Pid};
