//! Stereo correspondence, 3D fusion, and screen projection.
//!
//! Takes one detection frame per view, pairs detections of the same physical
//! hand or face across the two views, triangulates the paired landmarks into
//! camera-centered 3D coordinates, and projects each hand's pinch point along
//! the face-to-hand sight line onto the display surface.
//!
//! Correspondence is a rank-order heuristic: detections are sorted by x in
//! each view and paired by rank. It assumes a side-by-side, roughly parallel
//! rig where subjects do not cross order between views; crossed hands or
//! one-sided occlusion produce wrong pairs for those ticks.

use crate::calibration::CameraIntrinsics;
use crate::config::Config;
use crate::constants::{INDEX_TIP, METERS_PER_INCH, THUMB_TIP, WRIST};
use crate::detection::{DetectionFrame, FaceDetection, HandDetection};
use crate::geometry::{Point2D, Point3D};
use crate::triangulation::Triangulator;
use log::{debug, info};

/// One hand's triangulated landmarks, recomputed every tick
#[derive(Debug, Clone, Copy)]
pub struct Fused3DHand {
    pub wrist: Point3D,
    pub thumb_tip: Point3D,
    pub index_tip: Point3D,
}

impl Fused3DHand {
    /// Midpoint of thumb tip and index tip
    #[must_use]
    pub fn pinch_point(&self) -> Point3D {
        self.thumb_tip.midpoint(self.index_tip)
    }

    /// 3D distance between thumb tip and index tip
    #[must_use]
    pub fn pinch_distance(&self) -> f64 {
        self.thumb_tip.distance_to(self.index_tip)
    }
}

/// One face's triangulated eye midpoint, recomputed every tick
#[derive(Debug, Clone, Copy)]
pub struct Fused3DFace {
    pub eye_midpoint: Point3D,
}

/// One hand's per-frame cursor evidence: where it points and how pinched it is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenCursorCandidate {
    pub pixel_position: Point2D,
    pub pinch_distance: f64,
}

/// Fuses per-view detections into screen-pixel cursor candidates
pub struct FusionEngine {
    triangulator: Triangulator,
    image_width: f64,
    image_height: f64,
    camera_offset: Point3D,
    screen_width_m: f64,
    screen_height_m: f64,
    pixel_width: f64,
    pixel_height: f64,
    max_face_distance: f64,
}

impl FusionEngine {
    #[must_use]
    pub fn new(intrinsics: CameraIntrinsics, config: &Config) -> Self {
        info!(
            "Initializing fusion engine: {}x{} px images, {:.3}x{:.3} m screen at {}x{} px",
            config.camera.image_width,
            config.camera.image_height,
            config.screen.physical_width * METERS_PER_INCH,
            config.screen.physical_height * METERS_PER_INCH,
            config.screen.pixel_width,
            config.screen.pixel_height,
        );

        Self {
            triangulator: Triangulator::new(intrinsics),
            image_width: f64::from(config.camera.image_width),
            image_height: f64::from(config.camera.image_height),
            camera_offset: Point3D::new(config.camera.offset.x, config.camera.offset.y, config.camera.offset.z),
            screen_width_m: config.screen.physical_width * METERS_PER_INCH,
            screen_height_m: config.screen.physical_height * METERS_PER_INCH,
            pixel_width: f64::from(config.screen.pixel_width),
            pixel_height: f64::from(config.screen.pixel_height),
            max_face_distance: config.fusion.max_face_distance,
        }
    }

    /// Fuse one tick's detections from both views into cursor candidates.
    ///
    /// Missing detections, unusable landmark sets, and hands without a nearby
    /// face all shrink the output; an empty frame on either side yields an
    /// empty candidate list, never an error.
    #[must_use]
    pub fn process(&self, left: &DetectionFrame, right: &DetectionFrame) -> Vec<ScreenCursorCandidate> {
        let hands = self.fuse_hands(&left.hands, &right.hands);
        let faces = self.fuse_faces(&left.faces, &right.faces);

        if hands.is_empty() || faces.is_empty() {
            return Vec::new();
        }

        let candidates: Vec<ScreenCursorCandidate> = hands
            .iter()
            .filter_map(|hand| self.project_hand(hand, &faces))
            .collect();

        debug!(
            "fused {} hands / {} faces into {} candidates",
            hands.len(),
            faces.len(),
            candidates.len()
        );
        candidates
    }

    /// Pair hands across views by wrist-x rank and triangulate each pair
    fn fuse_hands(&self, left: &[HandDetection], right: &[HandDetection]) -> Vec<Fused3DHand> {
        let left_sorted = sorted_hands(left);
        let right_sorted = sorted_hands(right);

        left_sorted
            .iter()
            .zip(right_sorted.iter())
            .filter_map(|(l, r)| self.fuse_hand_pair(l, r))
            .collect()
    }

    /// Pair faces across views by left-eye-x rank and triangulate each pair
    fn fuse_faces(&self, left: &[FaceDetection], right: &[FaceDetection]) -> Vec<Fused3DFace> {
        let left_sorted = sorted_faces(left);
        let right_sorted = sorted_faces(right);

        left_sorted
            .iter()
            .zip(right_sorted.iter())
            .filter_map(|(l, r)| self.fuse_face_pair(l, r))
            .collect()
    }

    fn fuse_hand_pair(&self, left: &HandDetection, right: &HandDetection) -> Option<Fused3DHand> {
        let triangulate = |idx: usize| -> Option<Point3D> {
            let l = left.landmarks.get(idx)?;
            let r = right.landmarks.get(idx)?;
            Some(self.triangulator.point_from(self.to_pixels(*l), self.to_pixels(*r)))
        };

        Some(Fused3DHand {
            wrist: triangulate(WRIST)?,
            thumb_tip: triangulate(THUMB_TIP)?,
            index_tip: triangulate(INDEX_TIP)?,
        })
    }

    /// Eye midpoint per view, then one triangulation of the two midpoints
    fn fuse_face_pair(&self, left: &FaceDetection, right: &FaceDetection) -> Option<Fused3DFace> {
        let (l_right_eye, l_left_eye) = left.eyes()?;
        let (r_right_eye, r_left_eye) = right.eyes()?;

        let midpoint_left = self.to_pixels(l_right_eye).midpoint(self.to_pixels(l_left_eye));
        let midpoint_right = self.to_pixels(r_right_eye).midpoint(self.to_pixels(r_left_eye));

        Some(Fused3DFace {
            eye_midpoint: self.triangulator.point_from(midpoint_left, midpoint_right),
        })
    }

    /// Project one fused hand through its nearest face onto the screen
    fn project_hand(&self, hand: &Fused3DHand, faces: &[Fused3DFace]) -> Option<ScreenCursorCandidate> {
        let pinch_point = hand.pinch_point();
        let face_point = self.nearest_face(pinch_point, faces)?;

        // Translate into the screen-anchored frame before intersecting
        let hand_rel = pinch_point - self.camera_offset;
        let face_rel = face_point - self.camera_offset;

        let intersection = screen_plane_intersection(face_rel, hand_rel);
        let pixel_position = Point2D::new(
            (intersection.x / self.screen_width_m) * self.pixel_width,
            (intersection.y / self.screen_height_m) * self.pixel_height,
        );

        Some(ScreenCursorCandidate {
            pixel_position,
            pinch_distance: hand.pinch_distance(),
        })
    }

    /// Closest face within the association radius, if any.
    ///
    /// Degenerate (infinite-depth) hand or face points fail the radius test
    /// and drop out here instead of raising an error.
    fn nearest_face(&self, pinch_point: Point3D, faces: &[Fused3DFace]) -> Option<Point3D> {
        let mut shortest = f64::INFINITY;
        let mut best = None;
        for face in faces {
            let dist = pinch_point.distance_to(face.eye_midpoint);
            if dist < shortest && dist < self.max_face_distance {
                shortest = dist;
                best = Some(face.eye_midpoint);
            }
        }
        best
    }

    /// Scale a normalized detection coordinate to image pixels
    fn to_pixels(&self, normalized: Point2D) -> Point2D {
        Point2D::new(normalized.x * self.image_width, normalized.y * self.image_height)
    }
}

/// Intersection of the face-to-hand segment with the screen plane `z = 0`.
///
/// When the segment is parallel to the plane the face point's (x, y) is the
/// degenerate fallback.
fn screen_plane_intersection(face: Point3D, hand: Point3D) -> Point2D {
    if face.z == hand.z {
        return Point2D::new(face.x, face.y);
    }

    let t = -face.z / (hand.z - face.z);
    Point2D::new(face.x + t * (hand.x - face.x), face.y + t * (hand.y - face.y))
}

/// Hands usable for correspondence, sorted by wrist x ascending
fn sorted_hands(hands: &[HandDetection]) -> Vec<&HandDetection> {
    let mut usable: Vec<&HandDetection> = hands.iter().filter(|h| h.landmarks.len() > INDEX_TIP).collect();
    usable.sort_by(|a, b| {
        let ax = a.landmarks[WRIST].x;
        let bx = b.landmarks[WRIST].x;
        ax.total_cmp(&bx)
    });
    usable
}

/// Faces usable for correspondence, sorted by left-eye x ascending
fn sorted_faces(faces: &[FaceDetection]) -> Vec<&FaceDetection> {
    let mut usable: Vec<&FaceDetection> = faces.iter().filter(|f| f.eyes().is_some()).collect();
    usable.sort_by(|a, b| {
        // eyes() above guarantees the sort key exists
        let ax = a.sort_key().map_or(f64::INFINITY, |p| p.x);
        let bx = b.sort_key().map_or(f64::INFINITY, |p| p.x);
        ax.total_cmp(&bx)
    });
    usable
}
