//! Integration tests for the background pipeline: snapshot publishing,
//! stale-data behavior, and cooperative shutdown

use std::sync::Arc;
use std::time::Duration;
use stereo_hand_cursor::app::Pipeline;
use stereo_hand_cursor::calibration::CameraIntrinsics;
use stereo_hand_cursor::config::Config;
use stereo_hand_cursor::constants::METERS_PER_INCH;
use stereo_hand_cursor::cursor_tracking::CursorTracker;
use stereo_hand_cursor::detection::{DetectionFrame, DetectionSource, FaceDetection, HandDetection};
use stereo_hand_cursor::fusion::FusionEngine;
use stereo_hand_cursor::geometry::Point2D;

/// Detection source that always serves the same pre-built frame
struct StaticSource {
    frame: Arc<DetectionFrame>,
}

impl StaticSource {
    fn new(frame: DetectionFrame) -> Arc<Self> {
        Arc::new(Self {
            frame: Arc::new(frame),
        })
    }
}

impl DetectionSource for StaticSource {
    fn latest(&self) -> Option<Arc<DetectionFrame>> {
        Some(Arc::clone(&self.frame))
    }
}

/// Detection source that has not produced anything yet
struct SilentSource;

impl DetectionSource for SilentSource {
    fn latest(&self) -> Option<Arc<DetectionFrame>> {
        None
    }
}

fn intrinsics() -> CameraIntrinsics {
    CameraIntrinsics {
        focal_length_x: 800.0,
        focal_length_y: 800.0,
        principal_point_x: 0.0,
        principal_point_y: 0.0,
        baseline_distance: 0.30,
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.camera.image_width = 1000;
    config.camera.image_height = 1000;
    config.camera.offset.x = 0.0;
    config.camera.offset.y = 0.0;
    config.camera.offset.z = 0.0;
    config.screen.physical_width = 1.0 / METERS_PER_INCH;
    config.screen.physical_height = 1.0 / METERS_PER_INCH;
    config.screen.pixel_width = 1000;
    config.screen.pixel_height = 1000;
    config.fusion.max_face_distance = 10.0;
    config
}

fn hand(wrist: (f64, f64), thumb: (f64, f64), index: (f64, f64)) -> HandDetection {
    let mut landmarks = vec![Point2D::default(); 9];
    landmarks[0] = Point2D::new(wrist.0, wrist.1);
    landmarks[4] = Point2D::new(thumb.0, thumb.1);
    landmarks[8] = Point2D::new(index.0, index.1);
    HandDetection::new(landmarks)
}

fn face(right_eye: (f64, f64), left_eye: (f64, f64)) -> FaceDetection {
    FaceDetection::new(vec![
        Point2D::new(right_eye.0, right_eye.1),
        Point2D::new(left_eye.0, left_eye.1),
    ])
}

fn left_frame() -> DetectionFrame {
    DetectionFrame {
        hands: vec![hand((0.48, 0.6), (0.50, 0.5), (0.52, 0.5))],
        faces: vec![face((0.4, 0.3), (0.6, 0.3))],
    }
}

fn right_frame() -> DetectionFrame {
    DetectionFrame {
        hands: vec![hand((0.40, 0.6), (0.42, 0.5), (0.44, 0.5))],
        faces: vec![face((0.36, 0.3), (0.56, 0.3))],
    }
}

fn start_pipeline(left: Arc<dyn DetectionSource>, right: Arc<dyn DetectionSource>) -> Pipeline {
    let config = test_config();
    let engine = FusionEngine::new(intrinsics(), &config);
    let tracker = CursorTracker::new(&config.tracking, &config.pinch).unwrap();
    Pipeline::start(engine, left, right, tracker)
}

#[test]
fn test_pipeline_publishes_candidates_and_mice() {
    let pipeline = start_pipeline(StaticSource::new(left_frame()), StaticSource::new(right_frame()));

    // A few fusion periods are enough for both loops to publish
    std::thread::sleep(Duration::from_millis(300));

    let candidates = pipeline.candidates().expect("fusion loop should have published");
    assert_eq!(candidates.len(), 1);

    let mice = pipeline.mice().expect("tracker loop should have published");
    assert_eq!(mice.len(), 4);
    assert!(mice[0].position.is_some(), "first slot should have claimed the hand");
    assert!(mice[1].position.is_none());

    pipeline.stop().unwrap();
}

#[test]
fn test_pipeline_without_detections_still_ticks() {
    let pipeline = start_pipeline(Arc::new(SilentSource), Arc::new(SilentSource));

    std::thread::sleep(Duration::from_millis(200));

    // No fusion output before the sources produce anything
    assert!(pipeline.candidates().is_none());

    // The tracker still ticks and publishes all-free snapshots
    let mice = pipeline.mice().expect("tracker publishes even with no candidates");
    assert!(mice.iter().all(|cursor| cursor.position.is_none() && !cursor.pressed));

    pipeline.stop().unwrap();
}

#[test]
fn test_pipeline_one_sided_detections_yield_no_candidates() {
    let pipeline = start_pipeline(StaticSource::new(left_frame()), Arc::new(SilentSource));

    std::thread::sleep(Duration::from_millis(200));
    assert!(pipeline.candidates().is_none());

    pipeline.stop().unwrap();
}

#[test]
fn test_pipeline_stop_joins_promptly() {
    let pipeline = start_pipeline(StaticSource::new(left_frame()), StaticSource::new(right_frame()));
    std::thread::sleep(Duration::from_millis(100));

    let started = std::time::Instant::now();
    pipeline.stop().unwrap();
    assert!(
        started.elapsed() < Duration::from_millis(500),
        "loops must observe cancellation within a tick or two"
    );
}

#[test]
fn test_cancellation_token_is_shared() {
    let pipeline = start_pipeline(StaticSource::new(left_frame()), StaticSource::new(right_frame()));
    let token = pipeline.cancellation_token();
    assert!(!token.is_cancelled());

    token.cancel();
    // stop() after external cancellation still joins cleanly
    pipeline.stop().unwrap();
}
