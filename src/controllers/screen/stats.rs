use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by a render pump and readable from any thread.
#[derive(Debug, Default)]
pub struct RenderStats {
    frames_drawn: AtomicU64,
    frames_dropped: AtomicU64,
    swap_failures: AtomicU64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RenderStatsSnapshot {
    pub frames_drawn: u64,
    pub frames_dropped: u64,
    pub swap_failures: u64,
}

impl RenderStats {
    pub(crate) fn record_drawn(&self) {
        self.frames_drawn.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_swap_failure(&self) {
        self.swap_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> RenderStatsSnapshot {
        RenderStatsSnapshot {
            frames_drawn: self.frames_drawn.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            swap_failures: self.swap_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_recorded_frames() {
        let stats = RenderStats::default();

        stats.record_drawn();
        stats.record_drawn();
        stats.record_dropped();

        assert_eq!(
            stats.snapshot(),
            RenderStatsSnapshot {
                frames_drawn: 2,
                frames_dropped: 1,
                swap_failures: 0,
            }
        );
    }
}
