/*!
 * Core Types
 * Common types used across the manager
 */

/// OS process ID type (0 = no process recorded)
pub type Pid = u32;

/// Memory accounting unit: number of pages
pub type Pages = u64;
