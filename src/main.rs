/*!
 * appmgrd - Standalone Lifecycle Daemon
 *
 * Wires the application lifecycle manager for operation outside the full
 * shell: catalog from a JSON manifest, no activation transport (plain
 * executables only), notifications injected by the embedder.
 */

use std::env;
use std::error::Error;
use std::fs;
use std::sync::Arc;

use appmgr::{AppManager, AppRecord, Catalog, Notice, PrestartHint};
use log::{info, warn};
use serde::Deserialize;

/// One catalog entry in the manifest file.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: String,
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    exec: Option<String>,
    #[serde(default)]
    wm_class: Option<String>,
    #[serde(default)]
    prestart: PrestartHint,
}

fn build_record(entry: ManifestEntry) -> Arc<AppRecord> {
    let mut record = AppRecord::new(entry.id).with_prestart_hint(entry.prestart);
    if let Some(service) = entry.service {
        record = record.with_service(service);
    }
    if let Some(exec) = entry.exec {
        record = record.with_exec(exec);
    }
    if let Some(wm_class) = entry.wm_class {
        record = record.with_wm_class(wm_class);
    }
    Arc::new(record)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    info!("appmgrd starting...");

    let catalog = Arc::new(Catalog::new());
    match env::var("APPMGR_MANIFEST") {
        Ok(path) => {
            info!("Loading catalog manifest from {}", path);
            let raw = fs::read_to_string(&path)?;
            let entries: Vec<ManifestEntry> = serde_json::from_str(&raw)?;
            catalog.populate(entries.into_iter().map(build_record));
        }
        Err(_) => warn!("APPMGR_MANIFEST not set, starting with an empty catalog"),
    }

    let manager = AppManager::builder().with_catalog(catalog).build();

    manager.events().subscribe(|event| {
        info!("Event: {:?} for {}", event.kind(), event.app().id());
    });

    manager.catalog_populated();
    // No boot notification source in standalone mode; startup is init-done.
    manager.handle_notice(Notice::InitDone);

    info!("appmgrd ready");
    tokio::signal::ctrl_c().await?;

    manager.dump_app_list(false);
    manager.shutdown();
    Ok(())
}
