//! Persistent cursor slot tracking.
//!
//! Maintains a fixed set of virtual mouse slots across noisy, intermittent
//! per-frame candidates. Bound slots follow the nearest in-range candidate
//! and hold still when nothing qualifies; free slots claim any unclaimed
//! candidate outright. Press state runs on a dual-threshold pinch hysteresis
//! so a hand hovering near a single threshold cannot flicker the button.
//!
//! The per-tick assignment order is deliberately asymmetric: a bound slot
//! never jumps to an out-of-range candidate even when it is globally closest,
//! while a freshly appearing hand is claimed instantly by a free slot at any
//! distance.

use crate::config::{PinchConfig, TrackingConfig};
use crate::fusion::ScreenCursorCandidate;
use crate::geometry::Point2D;
use crate::{Error, Result};
use log::{debug, info};
use std::time::{Duration, Instant};

/// One persistent virtual mouse slot.
///
/// Slots are created once and recycled, never destroyed. A slot is bound
/// while `position` is set and free otherwise.
#[derive(Debug, Clone)]
struct CursorSlot {
    position: Option<Point2D>,
    pressed: bool,
    last_update: Option<Instant>,
    unpress_counter: u32,
    pinch_distance: Option<f64>,
}

impl CursorSlot {
    const fn unbound() -> Self {
        Self {
            position: None,
            pressed: false,
            last_update: None,
            unpress_counter: 0,
            pinch_distance: None,
        }
    }

    fn bind(&mut self, candidate: &ScreenCursorCandidate, now: Instant) {
        self.position = Some(candidate.pixel_position);
        self.pinch_distance = Some(candidate.pinch_distance);
        self.last_update = Some(now);
    }

    fn free(&mut self, now: Instant) {
        self.position = None;
        self.pressed = false;
        self.pinch_distance = None;
        self.unpress_counter = 0;
        // Restart the window so a freshly freed slot is not re-expired
        self.last_update = Some(now);
    }
}

/// Read-only view of one cursor slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorState {
    /// Stable slot identifier for the lifetime of the process
    pub id: usize,
    /// Current screen-pixel position, `None` while free
    pub position: Option<Point2D>,
    /// Pinch press state
    pub pressed: bool,
    /// Last observed pinch distance in meters
    pub pinch_distance: Option<f64>,
}

/// Snapshot of every cursor slot at one tracker tick
pub type MiceSnapshot = Vec<CursorState>;

/// Tracks N persistent cursor slots over per-frame candidates
pub struct CursorTracker {
    slots: Vec<CursorSlot>,
    max_x_dist: f64,
    max_y_dist: f64,
    timeout: Duration,
    press_threshold: f64,
    unpress_threshold: f64,
    unpress_frames: u32,
}

impl CursorTracker {
    /// Create a tracker with `tracking.mice_count` unbound slots.
    ///
    /// # Errors
    ///
    /// Rejects configurations that violate the tracking invariants before
    /// any loop starts: `mice_count < 1`, non-positive ranges or timeout,
    /// `unpress_threshold <= press_threshold`, `unpress_frames < 1`.
    pub fn new(tracking: &TrackingConfig, pinch: &PinchConfig) -> Result<Self> {
        if tracking.mice_count < 1 {
            return Err(Error::Config("Mice count must be at least 1".to_string()));
        }
        if tracking.max_x_dist <= 0.0 || tracking.max_y_dist <= 0.0 {
            return Err(Error::Config("Tracking ranges must be positive".to_string()));
        }
        if tracking.timeout <= 0.0 {
            return Err(Error::Config("Timeout must be positive".to_string()));
        }
        if pinch.unpress_threshold <= pinch.press_threshold {
            return Err(Error::Config(
                "Unpress threshold must be greater than press threshold".to_string(),
            ));
        }
        if pinch.unpress_frames < 1 {
            return Err(Error::Config("Unpress frames must be at least 1".to_string()));
        }

        info!(
            "Initializing cursor tracker: {} slots, range {}x{} px, timeout {:.1}s",
            tracking.mice_count, tracking.max_x_dist, tracking.max_y_dist, tracking.timeout
        );

        Ok(Self {
            slots: vec![CursorSlot::unbound(); tracking.mice_count],
            max_x_dist: tracking.max_x_dist,
            max_y_dist: tracking.max_y_dist,
            timeout: Duration::from_secs_f64(tracking.timeout),
            press_threshold: pinch.press_threshold,
            unpress_threshold: pinch.unpress_threshold,
            unpress_frames: pinch.unpress_frames,
        })
    }

    /// Number of cursor slots
    #[must_use]
    pub fn mice_count(&self) -> usize {
        self.slots.len()
    }

    /// Advance the tracker one tick over the current candidate list.
    ///
    /// `now` is injected rather than read from the clock so lifecycle timing
    /// is deterministic under test.
    pub fn tick(&mut self, candidates: &[ScreenCursorCandidate], now: Instant) {
        self.sweep_timeouts(now);

        let mut claimed = vec![false; candidates.len()];
        self.reacquire_bound_slots(candidates, &mut claimed, now);
        self.claim_free_slots(candidates, &mut claimed, now);

        self.update_pressed();
    }

    /// Immutable per-slot view for a renderer or OS-input consumer
    #[must_use]
    pub fn snapshot(&self) -> MiceSnapshot {
        self.slots
            .iter()
            .enumerate()
            .map(|(id, slot)| CursorState {
                id,
                position: slot.position,
                pressed: slot.pressed,
                pinch_distance: slot.pinch_distance,
            })
            .collect()
    }

    /// Free bound slots that have gone unmatched longer than the timeout
    fn sweep_timeouts(&mut self, now: Instant) {
        for (id, slot) in self.slots.iter_mut().enumerate() {
            if slot.position.is_none() {
                continue;
            }
            let expired = slot
                .last_update
                .is_some_and(|last| now.duration_since(last) > self.timeout);
            if expired {
                debug!("cursor {id} timed out, freeing slot");
                slot.free(now);
            }
        }
    }

    /// Bound slots move to the nearest unclaimed candidate inside the
    /// per-axis range box; with none in range, a slot holds its position.
    fn reacquire_bound_slots(&mut self, candidates: &[ScreenCursorCandidate], claimed: &mut [bool], now: Instant) {
        for slot in self.slots.iter_mut().filter(|s| s.position.is_some()) {
            let Some(position) = slot.position else { continue };

            let mut closest_idx = None;
            let mut closest_distance = f64::INFINITY;
            for (idx, candidate) in candidates.iter().enumerate() {
                if claimed[idx] {
                    continue;
                }
                let offset = position - candidate.pixel_position;
                if offset.x.abs() > self.max_x_dist || offset.y.abs() > self.max_y_dist {
                    continue;
                }
                let distance = position.distance_to(candidate.pixel_position);
                if distance < closest_distance {
                    closest_distance = distance;
                    closest_idx = Some(idx);
                }
            }

            if let Some(idx) = closest_idx {
                slot.bind(&candidates[idx], now);
                claimed[idx] = true;
            }
        }
    }

    /// Free slots claim the first unclaimed candidate in order, no distance
    /// filter applied.
    fn claim_free_slots(&mut self, candidates: &[ScreenCursorCandidate], claimed: &mut [bool], now: Instant) {
        for (id, slot) in self.slots.iter_mut().enumerate() {
            if slot.position.is_some() {
                continue;
            }
            let next = candidates.iter().enumerate().find(|(idx, _)| !claimed[*idx]);
            if let Some((idx, candidate)) = next {
                debug!("cursor {id} claimed new candidate at {:?}", candidate.pixel_position);
                slot.bind(candidate, now);
                claimed[idx] = true;
            }
        }
    }

    /// Dual-threshold press debouncing.
    ///
    /// Below `press_threshold` the slot presses immediately. At or above
    /// `unpress_threshold` for `unpress_frames` consecutive ticks it
    /// unpresses. The band in between resets the counter without changing
    /// state.
    fn update_pressed(&mut self) {
        for (id, slot) in self.slots.iter_mut().enumerate() {
            let Some(pinch_distance) = slot.pinch_distance else {
                continue;
            };

            if pinch_distance < self.press_threshold {
                if !slot.pressed {
                    debug!("cursor {id} pressed (pinch {pinch_distance:.3} m)");
                }
                slot.pressed = true;
                slot.unpress_counter = 0;
            } else if pinch_distance >= self.unpress_threshold {
                slot.unpress_counter += 1;
                if slot.unpress_counter >= self.unpress_frames {
                    if slot.pressed {
                        debug!("cursor {id} unpressed after {} frames", slot.unpress_counter);
                    }
                    slot.pressed = false;
                    slot.unpress_counter = 0;
                }
            } else {
                slot.unpress_counter = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(mice_count: usize) -> CursorTracker {
        let tracking = TrackingConfig {
            mice_count,
            max_x_dist: 100.0,
            max_y_dist: 100.0,
            timeout: 1.0,
        };
        let pinch = PinchConfig {
            press_threshold: 0.02,
            unpress_threshold: 0.03,
            unpress_frames: 3,
        };
        CursorTracker::new(&tracking, &pinch).unwrap()
    }

    fn candidate(x: f64, y: f64, pinch: f64) -> ScreenCursorCandidate {
        ScreenCursorCandidate {
            pixel_position: Point2D::new(x, y),
            pinch_distance: pinch,
        }
    }

    #[test]
    fn test_all_slots_start_free() {
        let tracker = tracker(3);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.iter().all(|s| s.position.is_none() && !s.pressed));
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let tracking = TrackingConfig {
            mice_count: 0,
            max_x_dist: 100.0,
            max_y_dist: 100.0,
            timeout: 1.0,
        };
        let pinch = PinchConfig {
            press_threshold: 0.02,
            unpress_threshold: 0.03,
            unpress_frames: 3,
        };
        assert!(CursorTracker::new(&tracking, &pinch).is_err());

        let tracking = TrackingConfig {
            mice_count: 2,
            max_x_dist: 100.0,
            max_y_dist: 100.0,
            timeout: 1.0,
        };
        let bad_pinch = PinchConfig {
            press_threshold: 0.03,
            unpress_threshold: 0.02,
            unpress_frames: 3,
        };
        assert!(CursorTracker::new(&tracking, &bad_pinch).is_err());
    }

    #[test]
    fn test_free_slot_claims_candidate() {
        let mut tracker = tracker(2);
        let now = Instant::now();

        tracker.tick(&[candidate(500.0, 300.0, 0.05)], now);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot[0].position, Some(Point2D::new(500.0, 300.0)));
        assert!(snapshot[1].position.is_none());
    }

    #[test]
    fn test_bound_slot_follows_in_range_candidate() {
        let mut tracker = tracker(1);
        let now = Instant::now();

        tracker.tick(&[candidate(500.0, 300.0, 0.05)], now);
        tracker.tick(&[candidate(550.0, 320.0, 0.05)], now);

        assert_eq!(tracker.snapshot()[0].position, Some(Point2D::new(550.0, 320.0)));
    }

    #[test]
    fn test_bound_slot_holds_position_when_out_of_range() {
        let mut tracker = tracker(1);
        let now = Instant::now();

        tracker.tick(&[candidate(500.0, 300.0, 0.05)], now);
        // Candidate jumps beyond the per-axis box; the slot must not follow
        tracker.tick(&[candidate(1500.0, 300.0, 0.05)], now);

        assert_eq!(tracker.snapshot()[0].position, Some(Point2D::new(500.0, 300.0)));
    }
}
