/*!
 * Memory Status
 * Flags fed by system notifications and read by the state-check loop
 */

use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide memory condition flags.
///
/// `lowmem` and `bg_killing` follow the paired on/off notifications;
/// `init_done` is a one-way latch that never resets once the system finished
/// booting. Mutated only by signal intake, read only by the scheduler.
#[derive(Debug, Default)]
pub struct MemoryStatus {
    lowmem: AtomicBool,
    bg_killing: AtomicBool,
    init_done: AtomicBool,
}

impl MemoryStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lowmem(&self) -> bool {
        self.lowmem.load(Ordering::Acquire)
    }

    pub fn set_lowmem(&self, value: bool) {
        self.lowmem.store(value, Ordering::Release);
    }

    pub fn bg_killing(&self) -> bool {
        self.bg_killing.load(Ordering::Acquire)
    }

    pub fn set_bg_killing(&self, value: bool) {
        self.bg_killing.store(value, Ordering::Release);
    }

    pub fn init_done(&self) -> bool {
        self.init_done.load(Ordering::Acquire)
    }

    /// Latch: there is intentionally no way to clear this.
    pub fn set_init_done(&self) {
        self.init_done.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_toggle() {
        let status = MemoryStatus::new();
        assert!(!status.lowmem());
        status.set_lowmem(true);
        assert!(status.lowmem());
        status.set_lowmem(false);
        assert!(!status.lowmem());

        status.set_bg_killing(true);
        assert!(status.bg_killing());
    }

    #[test]
    fn test_init_done_latches() {
        let status = MemoryStatus::new();
        assert!(!status.init_done());
        status.set_init_done();
        assert!(status.init_done());
    }
}
