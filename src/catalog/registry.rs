/*!
 * Catalog Registry
 * Insertion-ordered collection of application records
 */

use super::record::AppRecord;
use log::info;
use parking_lot::RwLock;
use std::sync::Arc;

/// The set of launchable applications known to the shell.
///
/// Order is the insertion order and is significant: window matching walks the
/// catalog front to back. Records live for the catalog's lifetime; the
/// manager and its queues hold additional `Arc` references but never create
/// or destroy records.
#[derive(Debug, Default)]
pub struct Catalog {
    items: RwLock<Vec<Arc<AppRecord>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    /// Append a record to the catalog.
    pub fn insert(&self, app: Arc<AppRecord>) {
        self.items.write().push(app);
    }

    /// All records in catalog order.
    pub fn apps(&self) -> Vec<Arc<AppRecord>> {
        self.items.read().clone()
    }

    pub fn find_by_id(&self, id: &str) -> Option<Arc<AppRecord>> {
        self.items
            .read()
            .iter()
            .find(|app| app.id() == id)
            .cloned()
    }

    pub fn find_by_service(&self, service: &str) -> Option<Arc<AppRecord>> {
        self.items
            .read()
            .iter()
            .find(|app| app.service() == Some(service))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Populate from a batch of records, logging the final count.
    pub fn populate<I>(&self, apps: I)
    where
        I: IntoIterator<Item = Arc<AppRecord>>,
    {
        let mut items = self.items.write();
        items.extend(apps);
        info!("Catalog populated: {} applications", items.len());
    }
}
