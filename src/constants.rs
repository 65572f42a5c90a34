//! Constants used throughout the library

use std::time::Duration;

/// Hand landmark index of the wrist (MediaPipe layout)
pub const WRIST: usize = 0;

/// Hand landmark index of the thumb tip
pub const THUMB_TIP: usize = 4;

/// Hand landmark index of the index finger tip
pub const INDEX_TIP: usize = 8;

/// Face keypoint index of the right eye
pub const RIGHT_EYE: usize = 0;

/// Face keypoint index of the left eye
pub const LEFT_EYE: usize = 1;

/// Minimum face keypoints needed to derive an eye midpoint
pub const MIN_FACE_KEYPOINTS: usize = 2;

/// Meters per inch, for physical display dimensions
pub const METERS_PER_INCH: f64 = 0.0254;

/// Default maximum hand-to-face association distance in meters
pub const DEFAULT_MAX_FACE_DISTANCE: f64 = 1.2;

/// Default stereo baseline distance in meters
pub const DEFAULT_BASELINE_DISTANCE: f64 = 0.30;

/// Fusion loop tick period (~30 Hz)
pub const FUSION_TICK_PERIOD: Duration = Duration::from_millis(33);

/// Cursor tracker loop tick period (~100 Hz)
pub const TRACKER_TICK_PERIOD: Duration = Duration::from_millis(10);

/// Default number of persistent cursor slots
pub const DEFAULT_MICE_COUNT: usize = 4;

/// Default per-axis re-acquisition range in pixels
pub const DEFAULT_MAX_X_DIST: f64 = 700.0;
pub const DEFAULT_MAX_Y_DIST: f64 = 500.0;

/// Default seconds before an unmatched cursor slot is freed
pub const DEFAULT_TIMEOUT_SECS: f64 = 2.0;

/// Default pinch press threshold in meters
pub const DEFAULT_PRESS_THRESHOLD: f64 = 0.02;

/// Default pinch unpress threshold in meters
pub const DEFAULT_UNPRESS_THRESHOLD: f64 = 0.03;

/// Default consecutive above-threshold ticks before unpress
pub const DEFAULT_UNPRESS_FRAMES: u32 = 3;
