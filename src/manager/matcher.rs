/*!
 * Window Matching
 * Associates newly mapped windows with catalog records
 */

use super::manager::AppManager;
use super::queues::QueueId;
use crate::catalog::AppRecord;
use crate::events::AppEvent;
use log::warn;
use std::sync::Arc;

impl AppManager {
    /// Find the application a newly mapped window belongs to.
    ///
    /// Matching walks the catalog in order; per record the class hint is
    /// tried against the declared window class, then case-insensitively as a
    /// prefix of the catalog id, and finally the name hint against the exec
    /// line. A match is announced as `Appeared` and the record leaves the
    /// prestart queues: the window proves it is running, whatever the
    /// launch-time bookkeeping assumed.
    pub fn match_window(
        &self,
        name_hint: Option<&str>,
        class_hint: Option<&str>,
    ) -> Option<Arc<AppRecord>> {
        let name = name_hint.filter(|hint| !hint.is_empty());
        let class = class_hint.filter(|hint| !hint.is_empty());

        if name.is_none() && class.is_none() {
            warn!("Cannot match a window without hints");
            return None;
        }

        let matched = self
            .catalog
            .apps()
            .into_iter()
            .find(|app| Self::hints_match(app, name, class))?;

        self.events.emit(&AppEvent::Appeared(Arc::clone(&matched)));

        let mut queues = self.queues.lock();
        queues.remove(QueueId::Prestarted, &matched);
        queues.remove(QueueId::Prestartable, &matched);
        drop(queues);

        Some(matched)
    }

    fn hints_match(app: &AppRecord, name: Option<&str>, class: Option<&str>) -> bool {
        if let Some(class) = class {
            if app.wm_class() == Some(class) {
                return true;
            }
            if app
                .id()
                .get(..class.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(class))
            {
                return true;
            }
        }

        if let Some(name) = name {
            if app.exec() == Some(name) {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AppState, Catalog};
    use crate::events::EventKind;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn manager_with_apps(apps: Vec<Arc<AppRecord>>) -> Arc<AppManager> {
        let catalog = Arc::new(Catalog::new());
        for app in apps {
            catalog.insert(app);
        }
        AppManager::builder()
            .with_catalog(catalog)
            .with_prestart_config(None)
            .build()
    }

    #[test]
    fn test_no_hints_no_match() {
        let manager = manager_with_apps(vec![Arc::new(AppRecord::new("term"))]);
        assert!(manager.match_window(None, None).is_none());
        assert!(manager.match_window(Some(""), Some("")).is_none());
    }

    #[test]
    fn test_class_matches_declared_wm_class() {
        let app = Arc::new(AppRecord::new("term").with_wm_class("XTerminal"));
        let manager = manager_with_apps(vec![Arc::clone(&app)]);

        let matched = manager.match_window(None, Some("XTerminal")).unwrap();
        assert!(Arc::ptr_eq(&matched, &app));
    }

    #[test]
    fn test_class_matches_id_prefix_case_insensitive() {
        let app = Arc::new(AppRecord::new("terminal-emulator"));
        let manager = manager_with_apps(vec![Arc::clone(&app)]);

        let matched = manager.match_window(None, Some("Terminal")).unwrap();
        assert!(Arc::ptr_eq(&matched, &app));
    }

    #[test]
    fn test_name_matches_exec() {
        let app = Arc::new(AppRecord::new("term").with_exec("xterm"));
        let manager = manager_with_apps(vec![Arc::clone(&app)]);

        let matched = manager.match_window(Some("xterm"), None).unwrap();
        assert!(Arc::ptr_eq(&matched, &app));
    }

    #[test]
    fn test_catalog_order_breaks_ties() {
        let first = Arc::new(AppRecord::new("editor-basic"));
        let second = Arc::new(AppRecord::new("editor-pro"));
        let manager = manager_with_apps(vec![Arc::clone(&first), Arc::clone(&second)]);

        let matched = manager.match_window(None, Some("editor")).unwrap();
        assert!(Arc::ptr_eq(&matched, &first));
    }

    #[test]
    fn test_catalog_order_beats_hint_tier() {
        let by_exec = Arc::new(AppRecord::new("aaa").with_exec("viewer"));
        let by_class = Arc::new(AppRecord::new("zzz").with_wm_class("Viewer"));
        let manager = manager_with_apps(vec![Arc::clone(&by_exec), Arc::clone(&by_class)]);

        // Catalog order wins across records, whatever the hint tier.
        let matched = manager.match_window(Some("viewer"), Some("Viewer")).unwrap();
        assert!(Arc::ptr_eq(&matched, &by_exec));
    }

    #[test]
    fn test_match_emits_appeared_and_scrubs_queues() {
        let app = Arc::new(AppRecord::new("mail").with_wm_class("Mailer"));
        let manager = manager_with_apps(vec![Arc::clone(&app)]);
        manager.prestartable(&app);
        app.set_state(AppState::Loading);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        manager
            .events()
            .subscribe(move |event| sink.lock().push(event.kind()));

        let matched = manager.match_window(None, Some("Mailer")).unwrap();

        assert!(Arc::ptr_eq(&matched, &app));
        assert_eq!(*seen.lock(), [EventKind::Appeared]);
        assert!(manager.queue_membership(&app).is_none());
    }

    #[test]
    fn test_no_match_for_unknown_window() {
        let manager = manager_with_apps(vec![Arc::new(AppRecord::new("term"))]);
        assert!(manager.match_window(Some("unknown"), Some("Unknown")).is_none());
    }
}
