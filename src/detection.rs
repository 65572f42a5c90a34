//! Detection data model and the per-view detection source interface.
//!
//! Landmark and face detection is an external collaborator. The core only
//! sees its output: per-view lists of hand landmark sets and face keypoint
//! sets in normalized [0,1] image coordinates, with no cross-frame identity.

use crate::constants::{LEFT_EYE, MIN_FACE_KEYPOINTS, RIGHT_EYE, WRIST};
use crate::geometry::Point2D;
use std::sync::Arc;

/// One detected hand in one view: the detector's fixed ordered landmark list
#[derive(Debug, Clone, Default)]
pub struct HandDetection {
    /// Normalized [0,1] landmark coordinates, indexed per `constants`
    pub landmarks: Vec<Point2D>,
}

impl HandDetection {
    #[must_use]
    pub fn new(landmarks: Vec<Point2D>) -> Self {
        Self { landmarks }
    }

    /// Wrist landmark, if the detector produced one
    #[must_use]
    pub fn wrist(&self) -> Option<Point2D> {
        self.landmarks.get(WRIST).copied()
    }
}

/// One detected face in one view, exposing at least two eye keypoints
#[derive(Debug, Clone, Default)]
pub struct FaceDetection {
    /// Normalized [0,1] keypoint coordinates, indexed per `constants`
    pub keypoints: Vec<Point2D>,
}

impl FaceDetection {
    #[must_use]
    pub fn new(keypoints: Vec<Point2D>) -> Self {
        Self { keypoints }
    }

    /// Both eye keypoints, or `None` when the detector produced fewer than two
    #[must_use]
    pub fn eyes(&self) -> Option<(Point2D, Point2D)> {
        if self.keypoints.len() < MIN_FACE_KEYPOINTS {
            return None;
        }
        Some((self.keypoints[RIGHT_EYE], self.keypoints[LEFT_EYE]))
    }

    /// Left-eye keypoint used as the sort key for correspondence matching
    #[must_use]
    pub fn sort_key(&self) -> Option<Point2D> {
        self.keypoints.get(LEFT_EYE).copied()
    }
}

/// One view's detection snapshot for a single tick
#[derive(Debug, Clone, Default)]
pub struct DetectionFrame {
    pub hands: Vec<HandDetection>,
    pub faces: Vec<FaceDetection>,
}

impl DetectionFrame {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hands.is_empty() && self.faces.is_empty()
    }
}

/// Non-blocking snapshot read of one view's latest detections.
///
/// Implementations publish a fully-formed frame per producer cycle; readers
/// may observe the same frame more than once between cycles and must never
/// block the producer.
pub trait DetectionSource: Send + Sync {
    /// Latest published frame, or `None` before the first detection completes
    fn latest(&self) -> Option<Arc<DetectionFrame>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_wrist_lookup() {
        let hand = HandDetection::new(vec![Point2D::new(0.5, 0.6)]);
        assert_eq!(hand.wrist(), Some(Point2D::new(0.5, 0.6)));

        let empty = HandDetection::default();
        assert!(empty.wrist().is_none());
    }

    #[test]
    fn test_face_eyes_require_two_keypoints() {
        let face = FaceDetection::new(vec![Point2D::new(0.4, 0.3), Point2D::new(0.6, 0.3)]);
        let (right, left) = face.eyes().unwrap();
        assert_eq!(right, Point2D::new(0.4, 0.3));
        assert_eq!(left, Point2D::new(0.6, 0.3));

        let partial = FaceDetection::new(vec![Point2D::new(0.4, 0.3)]);
        assert!(partial.eyes().is_none());
    }

    #[test]
    fn test_empty_frame() {
        assert!(DetectionFrame::default().is_empty());
    }
}
