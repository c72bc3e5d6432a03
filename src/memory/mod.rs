/*!
 * Memory Pressure
 * Lowmem counter probing and the prestart/launch admission policy
 */

pub mod policy;
pub mod probe;

pub use policy::{MemoryPolicy, PrestartMode, PRESTART_ENV_VAR};
pub use probe::{Counter, MemoryProbe};
