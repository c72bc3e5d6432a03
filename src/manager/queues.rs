/*!
 * Application Queues
 * Four FIFO membership lists driving the state-check decisions
 */

use crate::catalog::AppRecord;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// The four scheduling queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueId {
    /// Waiting to be pre-launched
    Prestartable,
    /// Pre-launched and running in the background
    Prestarted,
    /// Running but eligible for hibernation
    Hibernatable,
    /// Hibernated, waiting for wake-up
    Hibernated,
}

const QUEUE_COUNT: usize = 4;

const ALL_QUEUES: [QueueId; QUEUE_COUNT] = [
    QueueId::Prestartable,
    QueueId::Prestarted,
    QueueId::Hibernatable,
    QueueId::Hibernated,
];

/// Ordered membership lists over shared application records.
///
/// Identity is `Arc` pointer identity. Invariant: a record is a member of at
/// most one queue at any time; `add` enforces this by refusing (as a logged
/// no-op) a record that is already queued anywhere. Insertion order is
/// preserved and the head is always the next record acted on.
#[derive(Debug, Default)]
pub struct AppQueues {
    queues: [VecDeque<Arc<AppRecord>>; QUEUE_COUNT],
}

impl AppQueues {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, queue: QueueId) -> &VecDeque<Arc<AppRecord>> {
        &self.queues[queue as usize]
    }

    fn slot_mut(&mut self, queue: QueueId) -> &mut VecDeque<Arc<AppRecord>> {
        &mut self.queues[queue as usize]
    }

    /// Append the record at the tail, unless it is already queued somewhere.
    pub fn add(&mut self, queue: QueueId, app: &Arc<AppRecord>) {
        if let Some(present) = self.membership(app) {
            debug!("App {} already queued in {:?}", app.id(), present);
            return;
        }
        self.slot_mut(queue).push_back(Arc::clone(app));
    }

    /// Remove the first matching record; no-op if absent.
    pub fn remove(&mut self, queue: QueueId, app: &Arc<AppRecord>) {
        let slot = self.slot_mut(queue);
        if let Some(index) = slot.iter().position(|member| Arc::ptr_eq(member, app)) {
            slot.remove(index);
        }
    }

    /// Detach from `from` and append to the tail of `to`.
    ///
    /// The same reference moves in one step; an observer can never see the
    /// record in neither queue or in both. When the record is not a member of
    /// `from` this degenerates to `add(to, app)`.
    pub fn move_to(&mut self, from: QueueId, to: QueueId, app: &Arc<AppRecord>) {
        let slot = self.slot_mut(from);
        match slot.iter().position(|member| Arc::ptr_eq(member, app)) {
            Some(index) => {
                if let Some(detached) = slot.remove(index) {
                    self.slot_mut(to).push_back(detached);
                }
            }
            None => self.add(to, app),
        }
    }

    /// The record at the head of the queue, if any.
    pub fn head(&self, queue: QueueId) -> Option<Arc<AppRecord>> {
        self.slot(queue).front().cloned()
    }

    pub fn len(&self, queue: QueueId) -> usize {
        self.slot(queue).len()
    }

    pub fn is_empty(&self, queue: QueueId) -> bool {
        self.slot(queue).is_empty()
    }

    pub fn contains(&self, queue: QueueId, app: &Arc<AppRecord>) -> bool {
        self.slot(queue).iter().any(|member| Arc::ptr_eq(member, app))
    }

    /// Which queue the record currently belongs to, if any.
    pub fn membership(&self, app: &Arc<AppRecord>) -> Option<QueueId> {
        ALL_QUEUES
            .into_iter()
            .find(|&queue| self.contains(queue, app))
    }

    /// Drop all held references (manager teardown).
    pub fn clear(&mut self) {
        for slot in &mut self.queues {
            slot.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str) -> Arc<AppRecord> {
        Arc::new(AppRecord::new(id))
    }

    #[test]
    fn test_fifo_order() {
        let mut queues = AppQueues::new();
        let (a, b) = (app("a"), app("b"));
        queues.add(QueueId::Prestartable, &a);
        queues.add(QueueId::Prestartable, &b);

        assert!(Arc::ptr_eq(&queues.head(QueueId::Prestartable).unwrap(), &a));
        queues.remove(QueueId::Prestartable, &a);
        assert!(Arc::ptr_eq(&queues.head(QueueId::Prestartable).unwrap(), &b));
    }

    #[test]
    fn test_add_then_remove_round_trips() {
        let mut queues = AppQueues::new();
        let (a, b) = (app("a"), app("b"));
        queues.add(QueueId::Hibernatable, &a);

        queues.add(QueueId::Hibernatable, &b);
        queues.remove(QueueId::Hibernatable, &b);

        assert_eq!(queues.len(QueueId::Hibernatable), 1);
        assert!(queues.contains(QueueId::Hibernatable, &a));
        assert!(queues.membership(&b).is_none());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut queues = AppQueues::new();
        let a = app("a");
        queues.remove(QueueId::Prestarted, &a);
        assert!(queues.is_empty(QueueId::Prestarted));
    }

    #[test]
    fn test_single_membership_invariant() {
        let mut queues = AppQueues::new();
        let a = app("a");
        queues.add(QueueId::Prestartable, &a);
        // A second add anywhere is refused.
        queues.add(QueueId::Prestarted, &a);
        queues.add(QueueId::Prestartable, &a);

        assert_eq!(queues.membership(&a), Some(QueueId::Prestartable));
        assert_eq!(queues.len(QueueId::Prestartable), 1);
        assert!(queues.is_empty(QueueId::Prestarted));
    }

    #[test]
    fn test_move_preserves_single_membership() {
        let mut queues = AppQueues::new();
        let a = app("a");
        queues.add(QueueId::Prestartable, &a);
        queues.move_to(QueueId::Prestartable, QueueId::Prestarted, &a);

        assert_eq!(queues.membership(&a), Some(QueueId::Prestarted));
        assert!(queues.is_empty(QueueId::Prestartable));
    }

    #[test]
    fn test_move_of_non_member_is_add() {
        let mut queues = AppQueues::new();
        let a = app("a");
        queues.move_to(QueueId::Prestartable, QueueId::Prestarted, &a);

        assert_eq!(queues.membership(&a), Some(QueueId::Prestarted));
    }

    #[test]
    fn test_move_appends_at_tail() {
        let mut queues = AppQueues::new();
        let (a, b) = (app("a"), app("b"));
        queues.add(QueueId::Prestarted, &a);
        queues.add(QueueId::Prestartable, &b);
        queues.move_to(QueueId::Prestartable, QueueId::Prestarted, &b);

        assert!(Arc::ptr_eq(&queues.head(QueueId::Prestarted).unwrap(), &a));
        assert_eq!(queues.len(QueueId::Prestarted), 2);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut queues = AppQueues::new();
        let a = app("a");
        queues.add(QueueId::Hibernated, &a);
        queues.clear();

        assert!(queues.membership(&a).is_none());
        assert_eq!(Arc::strong_count(&a), 1);
    }
}
