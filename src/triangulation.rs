//! Stereo disparity triangulation.
//!
//! Recovers camera-centered 3D positions from matched left/right pixel pairs
//! using a pinhole stereo model. Depth is inversely proportional to the
//! horizontal disparity between the two observations.

use crate::calibration::CameraIntrinsics;
use crate::geometry::{Point2D, Point3D};

/// Triangulates matched pixel pairs into 3D points
#[derive(Debug, Clone, Copy)]
pub struct Triangulator {
    intrinsics: CameraIntrinsics,
}

impl Triangulator {
    #[must_use]
    pub const fn new(intrinsics: CameraIntrinsics) -> Self {
        Self { intrinsics }
    }

    #[must_use]
    pub const fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    /// Depth of a matched pixel pair.
    ///
    /// Zero disparity means the rays are parallel; depth is reported as
    /// infinite and the caller must guard against using it.
    #[must_use]
    pub fn depth_from(&self, p1: Point2D, p2: Point2D) -> f64 {
        let disparity = (p2.x - p1.x).abs();
        if disparity == 0.0 {
            return f64::INFINITY;
        }
        (self.intrinsics.baseline_distance * self.intrinsics.focal_length_x) / disparity
    }

    /// Full 3D position of a matched pixel pair.
    ///
    /// `p1` and `p2` are pixel observations of the same physical point in the
    /// left and right views. No plausibility filtering is applied; degenerate
    /// or implausible depths are passed through for downstream association to
    /// reject.
    #[must_use]
    pub fn point_from(&self, p1: Point2D, p2: Point2D) -> Point3D {
        let z = self.depth_from(p1, p2);

        let u_x = (p1.x + p2.x) / 2.0 - self.intrinsics.principal_point_x;
        let u_y = (p1.y + p2.y) / 2.0 - self.intrinsics.principal_point_y;

        Point3D::new(
            (u_x * z) / self.intrinsics.focal_length_x,
            (u_y * z) / self.intrinsics.focal_length_y,
            z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_intrinsics() -> CameraIntrinsics {
        CameraIntrinsics {
            focal_length_x: 800.0,
            focal_length_y: 800.0,
            principal_point_x: 0.0,
            principal_point_y: 0.0,
            baseline_distance: 0.30,
        }
    }

    #[test]
    fn test_depth_from_disparity() {
        let tri = Triangulator::new(test_intrinsics());
        let p1 = Point2D::new(400.0, 300.0);
        let p2 = Point2D::new(380.0, 300.0);

        // z = baseline * fx / disparity = 0.30 * 800 / 20
        assert!((tri.depth_from(p1, p2) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_depth_sign_of_disparity_is_ignored() {
        let tri = Triangulator::new(test_intrinsics());
        let p1 = Point2D::new(380.0, 300.0);
        let p2 = Point2D::new(400.0, 300.0);
        assert!((tri.depth_from(p1, p2) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_disparity_yields_infinite_depth() {
        let tri = Triangulator::new(test_intrinsics());
        let p = Point2D::new(400.0, 300.0);
        assert!(tri.depth_from(p, p).is_infinite());

        let point = tri.point_from(p, p);
        assert!(point.z.is_infinite());
    }

    #[test]
    fn test_point_from_pair() {
        let tri = Triangulator::new(test_intrinsics());
        let p1 = Point2D::new(400.0, 300.0);
        let p2 = Point2D::new(380.0, 300.0);

        let point = tri.point_from(p1, p2);
        // u_x = 390, u_y = 300 with principal point at the origin
        assert!((point.x - 390.0 * 12.0 / 800.0).abs() < 1e-12);
        assert!((point.y - 300.0 * 12.0 / 800.0).abs() < 1e-12);
        assert!((point.z - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_synthetic_depth() {
        // Project a synthetic point at known depth, then recover it.
        let intrinsics = test_intrinsics();
        let tri = Triangulator::new(intrinsics);
        let z0 = 1.5;
        let disparity = intrinsics.baseline_distance * intrinsics.focal_length_x / z0;

        let p1 = Point2D::new(500.0, 240.0);
        let p2 = Point2D::new(500.0 - disparity, 240.0);
        let point = tri.point_from(p1, p2);
        assert!((point.z - z0).abs() < 1e-9);
    }

    #[test]
    fn test_principal_point_offset() {
        let intrinsics = CameraIntrinsics {
            principal_point_x: 720.0,
            principal_point_y: 480.0,
            ..test_intrinsics()
        };
        let tri = Triangulator::new(intrinsics);

        // A pair centered on the principal point maps to the optical axis.
        let p1 = Point2D::new(730.0, 480.0);
        let p2 = Point2D::new(710.0, 480.0);
        let point = tri.point_from(p1, p2);
        assert!(point.x.abs() < 1e-12);
        assert!(point.y.abs() < 1e-12);
    }
}
