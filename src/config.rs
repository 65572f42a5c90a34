//! Configuration management for the stereo hand cursor pipeline

use crate::constants::{
    DEFAULT_BASELINE_DISTANCE, DEFAULT_MAX_FACE_DISTANCE, DEFAULT_MAX_X_DIST, DEFAULT_MAX_Y_DIST,
    DEFAULT_MICE_COUNT, DEFAULT_PRESS_THRESHOLD, DEFAULT_TIMEOUT_SECS, DEFAULT_UNPRESS_FRAMES,
    DEFAULT_UNPRESS_THRESHOLD,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stereo camera configuration
    pub camera: CameraConfig,

    /// Target display surface configuration
    pub screen: ScreenConfig,

    /// Hand-to-face association configuration
    pub fusion: FusionConfig,

    /// Cursor slot tracking configuration
    pub tracking: TrackingConfig,

    /// Pinch press/unpress configuration
    pub pinch: PinchConfig,
}

/// Stereo camera parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera image width in pixels
    pub image_width: u32,

    /// Camera image height in pixels
    pub image_height: u32,

    /// Path to the camera calibration file
    pub calibration_file: PathBuf,

    /// Distance between the two camera optical centers in meters
    pub baseline_distance: f64,

    /// Camera position relative to the screen-plane origin in meters
    pub offset: CameraOffset,
}

/// Camera position relative to the screen-plane origin, meters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct CameraOffset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Target display surface parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Physical display width in inches
    pub physical_width: f64,

    /// Physical display height in inches
    pub physical_height: f64,

    /// Display resolution width in pixels
    pub pixel_width: u32,

    /// Display resolution height in pixels
    pub pixel_height: u32,
}

impl ScreenConfig {
    /// Derive physical dimensions from a diagonal size and aspect ratio.
    ///
    /// A 27" 16:9 display yields roughly 23.5" x 13.2".
    #[must_use]
    pub fn from_diagonal(diagonal_inches: f64, aspect_w: f64, aspect_h: f64, pixel_width: u32, pixel_height: u32) -> Self {
        let k = diagonal_inches / (aspect_w * aspect_w + aspect_h * aspect_h).sqrt();
        Self {
            physical_width: aspect_w * k,
            physical_height: aspect_h * k,
            pixel_width,
            pixel_height,
        }
    }
}

/// Hand-to-face association parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Maximum 3D distance between a pinch point and its face in meters
    pub max_face_distance: f64,
}

/// Cursor slot tracking parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Number of persistent cursor slots
    pub mice_count: usize,

    /// Maximum x offset in pixels for a bound slot to re-acquire a candidate
    pub max_x_dist: f64,

    /// Maximum y offset in pixels for a bound slot to re-acquire a candidate
    pub max_y_dist: f64,

    /// Seconds without a qualifying candidate before a bound slot is freed
    pub timeout: f64,
}

/// Pinch press/unpress hysteresis parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinchConfig {
    /// Pinch distance in meters below which a press triggers
    pub press_threshold: f64,

    /// Pinch distance in meters at or above which the unpress counter runs
    pub unpress_threshold: f64,

    /// Consecutive above-threshold ticks before an unpress
    pub unpress_frames: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            screen: ScreenConfig::default(),
            fusion: FusionConfig::default(),
            tracking: TrackingConfig::default(),
            pinch: PinchConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            image_width: 1440,
            image_height: 960,
            calibration_file: PathBuf::from("calibration_left.yml"),
            baseline_distance: DEFAULT_BASELINE_DISTANCE,
            offset: CameraOffset {
                x: -0.29,
                y: 0.03,
                z: -0.015,
            },
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self::from_diagonal(27.0, 16.0, 9.0, 1920, 1080)
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            max_face_distance: DEFAULT_MAX_FACE_DISTANCE,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            mice_count: DEFAULT_MICE_COUNT,
            max_x_dist: DEFAULT_MAX_X_DIST,
            max_y_dist: DEFAULT_MAX_Y_DIST,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            press_threshold: DEFAULT_PRESS_THRESHOLD,
            unpress_threshold: DEFAULT_UNPRESS_THRESHOLD,
            unpress_frames: DEFAULT_UNPRESS_FRAMES,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration invariants.
    ///
    /// Violations are configuration errors rejected before any tracking loop
    /// starts, never runtime faults.
    pub fn validate(&self) -> Result<()> {
        if self.camera.image_width == 0 || self.camera.image_height == 0 {
            return Err(Error::Config("Image dimensions must be positive".to_string()));
        }
        if self.camera.baseline_distance <= 0.0 {
            return Err(Error::Config("Baseline distance must be positive".to_string()));
        }

        if self.screen.physical_width <= 0.0 || self.screen.physical_height <= 0.0 {
            return Err(Error::Config("Physical screen dimensions must be positive".to_string()));
        }
        if self.screen.pixel_width == 0 || self.screen.pixel_height == 0 {
            return Err(Error::Config("Screen resolution must be positive".to_string()));
        }

        if self.fusion.max_face_distance <= 0.0 {
            return Err(Error::Config("Max face distance must be positive".to_string()));
        }

        if self.tracking.mice_count < 1 {
            return Err(Error::Config("Mice count must be at least 1".to_string()));
        }
        if self.tracking.max_x_dist <= 0.0 || self.tracking.max_y_dist <= 0.0 {
            return Err(Error::Config("Tracking ranges must be positive".to_string()));
        }
        if self.tracking.timeout <= 0.0 {
            return Err(Error::Config("Timeout must be positive".to_string()));
        }

        if self.pinch.press_threshold <= 0.0 {
            return Err(Error::Config("Press threshold must be positive".to_string()));
        }
        if self.pinch.unpress_threshold <= self.pinch.press_threshold {
            return Err(Error::Config(
                "Unpress threshold must be greater than press threshold".to_string(),
            ));
        }
        if self.pinch.unpress_frames < 1 {
            return Err(Error::Config("Unpress frames must be at least 1".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Stereo Hand Cursor Configuration

# Stereo camera parameters
camera:
  image_width: 1440
  image_height: 960
  calibration_file: "calibration_left.yml"
  baseline_distance: 0.30
  offset:
    x: -0.29
    y: 0.03
    z: -0.015

# Target display surface
screen:
  physical_width: 23.53
  physical_height: 13.24
  pixel_width: 1920
  pixel_height: 1080

# Hand-to-face association
fusion:
  max_face_distance: 1.2

# Cursor slot tracking
tracking:
  mice_count: 4
  max_x_dist: 700.0
  max_y_dist: 500.0
  timeout: 2.0

# Pinch press/unpress hysteresis
pinch:
  press_threshold: 0.02
  unpress_threshold: 0.03
  unpress_frames: 3
"#;
