/*!
 * Application Catalog
 * Launchable application descriptors and the insertion-ordered registry
 */

pub mod record;
pub mod registry;
pub mod types;

pub use record::AppRecord;
pub use registry::Catalog;
pub use types::{AppSnapshot, AppState, PrestartHint};
