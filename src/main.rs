//! Demo application: runs the stereo fusion and cursor tracking pipeline
//! against a scripted synthetic scene standing in for the external
//! camera/detector stack, and prints cursor snapshots.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use nalgebra::Matrix3;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stereo_hand_cursor::app::Pipeline;
use stereo_hand_cursor::calibration::CameraIntrinsics;
use stereo_hand_cursor::config::{Config, EXAMPLE_CONFIG};
use stereo_hand_cursor::constants::{INDEX_TIP, THUMB_TIP, WRIST};
use stereo_hand_cursor::cursor_tracking::CursorTracker;
use stereo_hand_cursor::detection::{DetectionFrame, DetectionSource, FaceDetection, HandDetection};
use stereo_hand_cursor::fusion::FusionEngine;
use stereo_hand_cursor::geometry::{Point2D, Point3D};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Print an example configuration file and exit
    #[arg(long)]
    dump_config: bool,

    /// Seconds to run the demo
    #[arg(long, default_value = "5.0")]
    duration: f64,

    /// Use a synthetic pinhole calibration instead of the calibration file
    #[arg(long)]
    synthetic_calibration: bool,

    /// Enable debug output
    #[arg(short = 'd', long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.dump_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    info!("Stereo Hand Cursor - demo");

    let config = if let Some(path) = &args.config {
        info!("Loading configuration from: {path}");
        Config::from_file(path).with_context(|| format!("loading config {path}"))?
    } else {
        Config::default()
    };
    config.validate().context("invalid configuration")?;

    let intrinsics = if args.synthetic_calibration {
        warn!("Using synthetic pinhole calibration");
        synthetic_intrinsics(&config)?
    } else {
        CameraIntrinsics::from_calibration_file(&config.camera.calibration_file, config.camera.baseline_distance)
            .context("calibration is required at startup (or pass --synthetic-calibration)")?
    };

    let engine = FusionEngine::new(intrinsics, &config);
    let tracker = CursorTracker::new(&config.tracking, &config.pinch)?;

    let scene = Arc::new(Scene::new(intrinsics, &config));
    let left = Arc::new(ScriptedSource::new(Arc::clone(&scene), View::Left));
    let right = Arc::new(ScriptedSource::new(scene, View::Right));

    let pipeline = Pipeline::start(engine, left, right, tracker);

    let deadline = Instant::now() + Duration::from_secs_f64(args.duration);
    while Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(500));
        match pipeline.mice() {
            Some(mice) => {
                for cursor in mice.iter() {
                    match cursor.position {
                        Some(pos) => info!(
                            "cursor {}: ({:.0}, {:.0}) pressed={} pinch={:?}",
                            cursor.id, pos.x, pos.y, cursor.pressed, cursor.pinch_distance
                        ),
                        None => info!("cursor {}: free", cursor.id),
                    }
                }
            }
            None => info!("no tracker output yet"),
        }
    }

    pipeline.stop()?;
    Ok(())
}

/// Pinhole calibration derived from the configured image size, as a stand-in
/// when no measured calibration file is available
fn synthetic_intrinsics(config: &Config) -> Result<CameraIntrinsics> {
    let width = f64::from(config.camera.image_width);
    let height = f64::from(config.camera.image_height);
    let matrix = Matrix3::from_row_slice(&[width, 0.0, width / 2.0, 0.0, width, height / 2.0, 0.0, 0.0, 1.0]);
    Ok(CameraIntrinsics::from_camera_matrix(&matrix, config.camera.baseline_distance)?)
}

#[derive(Debug, Clone, Copy)]
enum View {
    Left,
    Right,
}

/// Shared synthetic scene: one face and one slowly sweeping, periodically
/// pinching hand in front of the cameras
struct Scene {
    intrinsics: CameraIntrinsics,
    image_width: f64,
    image_height: f64,
    start: Instant,
}

impl Scene {
    fn new(intrinsics: CameraIntrinsics, config: &Config) -> Self {
        Self {
            intrinsics,
            image_width: f64::from(config.camera.image_width),
            image_height: f64::from(config.camera.image_height),
            start: Instant::now(),
        }
    }

    /// Project a camera-frame 3D point into one view, normalized [0,1]
    fn project(&self, point: Point3D, view: View) -> Point2D {
        let x = match view {
            View::Left => point.x,
            View::Right => point.x - self.intrinsics.baseline_distance,
        };
        let u = self.intrinsics.focal_length_x * x / point.z + self.intrinsics.principal_point_x;
        let v = self.intrinsics.focal_length_y * point.y / point.z + self.intrinsics.principal_point_y;
        Point2D::new(u / self.image_width, v / self.image_height)
    }

    fn frame(&self, view: View) -> DetectionFrame {
        let t = self.start.elapsed().as_secs_f64();

        // Face fixed above the screen, hand sweeping side to side
        let face_eye_midpoint = Point3D::new(0.0, -0.10, 0.60);
        let pinch_center = Point3D::new(0.15 * (t * 0.8).sin(), 0.02, 0.35);

        // Pinch opens and closes on a slow cycle
        let pinch_gap = 0.01 + 0.03 * (0.5 + 0.5 * (t * 1.3).cos());
        let half = pinch_gap / 2.0;
        let thumb_tip = pinch_center + Point3D::new(-half, 0.0, 0.0);
        let index_tip = pinch_center + Point3D::new(half, 0.0, 0.0);
        let wrist = pinch_center + Point3D::new(0.0, 0.08, 0.02);

        let mut landmarks = vec![Point2D::default(); INDEX_TIP + 1];
        landmarks[WRIST] = self.project(wrist, view);
        landmarks[THUMB_TIP] = self.project(thumb_tip, view);
        landmarks[INDEX_TIP] = self.project(index_tip, view);

        let eye_offset = Point3D::new(0.03, 0.0, 0.0);
        let face = FaceDetection::new(vec![
            self.project(face_eye_midpoint - eye_offset, view),
            self.project(face_eye_midpoint + eye_offset, view),
        ]);

        DetectionFrame {
            hands: vec![HandDetection::new(landmarks)],
            faces: vec![face],
        }
    }
}

/// Synthetic detection producer for one view
struct ScriptedSource {
    scene: Arc<Scene>,
    view: View,
}

impl ScriptedSource {
    fn new(scene: Arc<Scene>, view: View) -> Self {
        Self { scene, view }
    }
}

impl DetectionSource for ScriptedSource {
    fn latest(&self) -> Option<Arc<DetectionFrame>> {
        Some(Arc::new(self.scene.frame(self.view)))
    }
}
