/*!
 * Memory Probe
 * Fresh reads of the kernel lowmem accounting counters
 */

use crate::core::types::Pages;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the lowmem counters.
const LOWMEM_PROC_ROOT: &str = "/proc/sys/vm";

/// The five lowmem counters the manager cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Total pages the system allows userspace to consume
    AllowedPages,
    /// Pages currently free
    FreePages,
    /// Free-page level at which the low-memory notification fires
    LowWatermark,
    /// Free-page level at which the system is considered recovered
    HighWatermark,
    /// Slack margin the kernel keeps while the counters decay
    DecayMargin,
}

impl Counter {
    /// File name of the counter under the probe root.
    pub const fn file_name(&self) -> &'static str {
        match self {
            Counter::AllowedPages => "lowmem_allowed_pages",
            Counter::FreePages => "lowmem_free_pages",
            Counter::LowWatermark => "lowmem_notify_low_pages",
            Counter::HighWatermark => "lowmem_notify_high_pages",
            Counter::DecayMargin => "lowmem_nr_decay_pages",
        }
    }
}

/// Reads lowmem counters from procfs.
///
/// Every read hits the filesystem: the counters change continuously, so no
/// value is ever cached. A missing or unreadable counter is the normal case
/// on systems without the lowmem subsystem (development sandboxes) and is
/// reported as `None`, not as an error.
#[derive(Debug, Clone)]
pub struct MemoryProbe {
    root: PathBuf,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self::with_root(LOWMEM_PROC_ROOT)
    }

    /// Probe reading from an alternate root directory.
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Read one counter. `None` if the file is missing, empty, or unparsable.
    pub fn read(&self, counter: Counter) -> Option<Pages> {
        let path = self.root.join(counter.file_name());
        match fs::read_to_string(&path) {
            Ok(raw) => {
                let value = raw.trim().parse::<Pages>().ok();
                if value.is_none() {
                    debug!("Counter {} unreadable: {:?}", counter.file_name(), raw.trim());
                }
                value
            }
            Err(e) => {
                debug!("Counter {} unavailable: {}", counter.file_name(), e);
                None
            }
        }
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn probe_with(counter: Counter, contents: &str) -> (TempDir, MemoryProbe) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(counter.file_name()), contents).unwrap();
        let probe = MemoryProbe::with_root(dir.path());
        (dir, probe)
    }

    #[test]
    fn test_read_counter() {
        let (_dir, probe) = probe_with(Counter::FreePages, "12345\n");
        assert_eq!(probe.read(Counter::FreePages), Some(12345));
    }

    #[test]
    fn test_missing_counter_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let probe = MemoryProbe::with_root(dir.path());
        assert_eq!(probe.read(Counter::LowWatermark), None);
    }

    #[test]
    fn test_garbage_counter_is_unavailable() {
        let (_dir, probe) = probe_with(Counter::DecayMargin, "not-a-number");
        assert_eq!(probe.read(Counter::DecayMargin), None);
    }

    #[test]
    fn test_empty_counter_is_unavailable() {
        let (_dir, probe) = probe_with(Counter::HighWatermark, "");
        assert_eq!(probe.read(Counter::HighWatermark), None);
    }

    #[test]
    fn test_reads_are_fresh() {
        let (dir, probe) = probe_with(Counter::FreePages, "100");
        assert_eq!(probe.read(Counter::FreePages), Some(100));

        fs::write(dir.path().join(Counter::FreePages.file_name()), "50").unwrap();
        assert_eq!(probe.read(Counter::FreePages), Some(50));
    }
}
