//! Pipeline runner: background fusion and tracking loops over shared snapshots.
//!
//! Each stage owns its state and is the only writer of its output cell.
//! Producers publish fully-formed immutable records; consumers clone the
//! latest `Arc` without blocking the writer, so a reader sees either the old
//! record or the new one, never a torn mix. Shutdown is cooperative through a
//! shared cancellation token checked every loop iteration.

use crate::constants::{FUSION_TICK_PERIOD, TRACKER_TICK_PERIOD};
use crate::cursor_tracking::{CursorTracker, MiceSnapshot};
use crate::detection::DetectionSource;
use crate::fusion::{FusionEngine, ScreenCursorCandidate};
use crate::{Error, Result};
use log::info;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Cooperative shutdown flag shared by the pipeline loops
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request every holder of this token to stop
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Single-writer latest-value cell.
///
/// The writer swaps in a complete record; readers clone the `Arc`. There is
/// no backpressure: a slow reader simply observes the same record twice and
/// a fast writer overwrites unread records.
#[derive(Debug, Default)]
pub struct Latest<T> {
    cell: RwLock<Option<Arc<T>>>,
}

impl<T> Latest<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { cell: RwLock::new(None) }
    }

    /// Publish a new record, replacing any unread one
    pub fn publish(&self, value: T) {
        *self.cell.write() = Some(Arc::new(value));
    }

    /// Latest published record, or `None` before the first publish
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<T>> {
        self.cell.read().clone()
    }
}

/// Handle to the running fusion and tracking loops
pub struct Pipeline {
    token: CancellationToken,
    fusion_handle: Option<JoinHandle<()>>,
    tracker_handle: Option<JoinHandle<()>>,
    candidates: Arc<Latest<Vec<ScreenCursorCandidate>>>,
    mice: Arc<Latest<MiceSnapshot>>,
}

impl Pipeline {
    /// Spawn the fusion loop (~33 ms period) and the tracker loop (~10 ms
    /// period) over the two per-view detection sources.
    #[must_use]
    pub fn start(
        engine: FusionEngine,
        left_source: Arc<dyn DetectionSource>,
        right_source: Arc<dyn DetectionSource>,
        tracker: CursorTracker,
    ) -> Self {
        let token = CancellationToken::new();
        let candidates = Arc::new(Latest::new());
        let mice = Arc::new(Latest::new());

        info!("Starting fusion and tracker loops ({} cursor slots)", tracker.mice_count());

        let fusion_handle = {
            let token = token.clone();
            let candidates = Arc::clone(&candidates);
            thread::spawn(move || {
                fusion_loop(&engine, &*left_source, &*right_source, &candidates, &token);
            })
        };

        let tracker_handle = {
            let token = token.clone();
            let candidates = Arc::clone(&candidates);
            let mice = Arc::clone(&mice);
            thread::spawn(move || {
                tracker_loop(tracker, &candidates, &mice, &token);
            })
        };

        Self {
            token,
            fusion_handle: Some(fusion_handle),
            tracker_handle: Some(tracker_handle),
            candidates,
            mice,
        }
    }

    /// Latest fused cursor candidates, or `None` before the first fusion tick
    #[must_use]
    pub fn candidates(&self) -> Option<Arc<Vec<ScreenCursorCandidate>>> {
        self.candidates.snapshot()
    }

    /// Latest cursor slot snapshot, or `None` before the first tracker tick
    #[must_use]
    pub fn mice(&self) -> Option<Arc<MiceSnapshot>> {
        self.mice.snapshot()
    }

    /// Token observed by both loops
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel both loops and join their threads.
    ///
    /// # Errors
    ///
    /// Returns an error if either loop thread panicked.
    pub fn stop(mut self) -> Result<()> {
        self.token.cancel();
        for handle in [self.fusion_handle.take(), self.tracker_handle.take()].into_iter().flatten() {
            handle
                .join()
                .map_err(|_| Error::Pipeline("pipeline thread panicked".to_string()))?;
        }
        info!("Pipeline stopped");
        Ok(())
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Fixed-period fusion loop: snapshot both views at tick start, fuse, publish
fn fusion_loop(
    engine: &FusionEngine,
    left_source: &dyn DetectionSource,
    right_source: &dyn DetectionSource,
    candidates: &Latest<Vec<ScreenCursorCandidate>>,
    token: &CancellationToken,
) {
    while !token.is_cancelled() {
        thread::sleep(FUSION_TICK_PERIOD);
        if token.is_cancelled() {
            break;
        }

        // Snapshot copies taken up front; a producer update mid-tick cannot
        // tear the computation
        let (Some(left), Some(right)) = (left_source.latest(), right_source.latest()) else {
            continue;
        };

        candidates.publish(engine.process(&left, &right));
    }
}

/// Fixed-period tracker loop over the latest fused candidates.
///
/// A stale or absent fusion snapshot yields an empty tick, never a wait.
fn tracker_loop(
    mut tracker: CursorTracker,
    candidates: &Latest<Vec<ScreenCursorCandidate>>,
    mice: &Latest<MiceSnapshot>,
    token: &CancellationToken,
) {
    while !token.is_cancelled() {
        thread::sleep(TRACKER_TICK_PERIOD);
        if token.is_cancelled() {
            break;
        }

        let now = Instant::now();
        match candidates.snapshot() {
            Some(current) => tracker.tick(&current, now),
            None => tracker.tick(&[], now),
        }
        mice.publish(tracker.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_token() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());

        let observer = token.clone();
        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn test_latest_publish_snapshot() {
        let latest: Latest<Vec<u32>> = Latest::new();
        assert!(latest.snapshot().is_none());

        latest.publish(vec![1, 2, 3]);
        let first = latest.snapshot().unwrap();
        assert_eq!(*first, vec![1, 2, 3]);

        // A reader holding the old record keeps it after a new publish
        latest.publish(vec![4]);
        assert_eq!(*first, vec![1, 2, 3]);
        assert_eq!(*latest.snapshot().unwrap(), vec![4]);
    }
}
