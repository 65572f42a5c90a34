//! Stereo hand cursor library for multi-cursor tracking from calibrated
//! stereo landmark detections.
//!
//! Two calibrated cameras watch the same scene. An external detector produces
//! per-view hand landmark and face keypoint lists; this library fuses them
//! into 3D, projects each hand's pinch point along the face-to-hand sight
//! line onto the display surface, and maintains a small set of persistent
//! virtual mouse cursors with pinch-based press/release semantics.
//!
//! The pipeline consists of:
//! 1. Rank-order correspondence matching between the two views
//! 2. Disparity-based triangulation of matched landmarks
//! 3. Screen-plane projection into display pixel coordinates
//! 4. Persistent cursor slot assignment with timeout and press hysteresis
//!
//! # Examples
//!
//! ## Fusing one tick of detections
//!
//! ```no_run
//! use stereo_hand_cursor::calibration::CameraIntrinsics;
//! use stereo_hand_cursor::config::Config;
//! use stereo_hand_cursor::detection::DetectionFrame;
//! use stereo_hand_cursor::fusion::FusionEngine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_file("config.yml")?;
//! config.validate()?;
//!
//! let intrinsics = CameraIntrinsics::from_calibration_file(
//!     &config.camera.calibration_file,
//!     config.camera.baseline_distance,
//! )?;
//!
//! let engine = FusionEngine::new(intrinsics, &config);
//! let left = DetectionFrame::default();
//! let right = DetectionFrame::default();
//! let candidates = engine.process(&left, &right);
//! println!("{} cursor candidates this tick", candidates.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Tracking cursors over candidates
//!
//! ```
//! use std::time::Instant;
//! use stereo_hand_cursor::config::{PinchConfig, TrackingConfig};
//! use stereo_hand_cursor::cursor_tracking::CursorTracker;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tracker = CursorTracker::new(&TrackingConfig::default(), &PinchConfig::default())?;
//! tracker.tick(&[], Instant::now());
//!
//! for cursor in tracker.snapshot() {
//!     println!("cursor {}: {:?} pressed={}", cursor.id, cursor.position, cursor.pressed);
//! }
//! # Ok(())
//! # }
//! ```

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// 2D/3D point types with vector arithmetic
pub mod geometry;

/// Calibration file loading and camera intrinsics
pub mod calibration;

/// Stereo disparity triangulation
pub mod triangulation;

/// Detection data model and per-view source interface
pub mod detection;

/// Stereo correspondence, fusion, and screen projection
pub mod fusion;

/// Persistent cursor slot tracking
pub mod cursor_tracking;

/// Configuration management
pub mod config;

/// Pipeline runner with background loops and snapshot publishing
pub mod app;

pub use error::{Error, Result};
