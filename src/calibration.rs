//! Camera calibration loading and intrinsic parameter extraction.
//!
//! The calibration file is a YAML document holding the 3x3 row-major camera
//! matrix `K` and, optionally, the distortion coefficients `D`. Only `K` is
//! consumed here; undistortion is applied at the capture layer before frames
//! reach the detectors.

use crate::{Error, Result};
use log::info;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw matrix block as stored in the calibration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixData {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
}

impl MatrixData {
    fn to_matrix3(&self) -> Result<Matrix3<f64>> {
        if self.rows != 3 || self.cols != 3 || self.data.len() != 9 {
            return Err(Error::Calibration(format!(
                "camera matrix must be 3x3 with 9 values, got {}x{} with {}",
                self.rows,
                self.cols,
                self.data.len()
            )));
        }
        Ok(Matrix3::from_row_slice(&self.data))
    }
}

/// On-disk calibration file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationFile {
    /// 3x3 row-major camera matrix
    #[serde(rename = "K")]
    pub camera_matrix: MatrixData,

    /// Lens distortion coefficients, unused by the core
    #[serde(rename = "D", default, skip_serializing_if = "Option::is_none")]
    pub distortion: Option<MatrixData>,
}

impl CalibrationFile {
    /// Load a calibration file from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Calibration(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Calibration(format!("cannot parse {}: {e}", path.display())))
    }
}

/// Pinhole stereo camera intrinsics, invariant for a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsics {
    /// Focal length along x, pixels
    pub focal_length_x: f64,
    /// Focal length along y, pixels
    pub focal_length_y: f64,
    /// Principal point x, pixels
    pub principal_point_x: f64,
    /// Principal point y, pixels
    pub principal_point_y: f64,
    /// Distance between the two optical centers, meters
    pub baseline_distance: f64,
}

impl CameraIntrinsics {
    /// Extract intrinsics from a 3x3 camera matrix and a baseline distance
    ///
    /// # Errors
    ///
    /// Returns an error if the focal lengths are non-finite or non-positive,
    /// or the baseline is non-positive.
    pub fn from_camera_matrix(matrix: &Matrix3<f64>, baseline_distance: f64) -> Result<Self> {
        let intrinsics = Self {
            focal_length_x: matrix[(0, 0)],
            focal_length_y: matrix[(1, 1)],
            principal_point_x: matrix[(0, 2)],
            principal_point_y: matrix[(1, 2)],
            baseline_distance,
        };
        intrinsics.validate()?;
        Ok(intrinsics)
    }

    /// Load intrinsics from a calibration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, malformed, or holds
    /// implausible focal lengths. Calibration problems are fatal at startup.
    pub fn from_calibration_file<P: AsRef<Path>>(path: P, baseline_distance: f64) -> Result<Self> {
        let file = CalibrationFile::from_file(&path)?;
        let matrix = file.camera_matrix.to_matrix3()?;
        let intrinsics = Self::from_camera_matrix(&matrix, baseline_distance)?;
        info!(
            "Loaded calibration from {}: fx={:.1} fy={:.1} cx={:.1} cy={:.1}",
            path.as_ref().display(),
            intrinsics.focal_length_x,
            intrinsics.focal_length_y,
            intrinsics.principal_point_x,
            intrinsics.principal_point_y,
        );
        Ok(intrinsics)
    }

    fn validate(&self) -> Result<()> {
        if !self.focal_length_x.is_finite() || self.focal_length_x <= 0.0 {
            return Err(Error::Calibration(format!(
                "focal length x must be finite and positive, got {}",
                self.focal_length_x
            )));
        }
        if !self.focal_length_y.is_finite() || self.focal_length_y <= 0.0 {
            return Err(Error::Calibration(format!(
                "focal length y must be finite and positive, got {}",
                self.focal_length_y
            )));
        }
        if !self.principal_point_x.is_finite() || !self.principal_point_y.is_finite() {
            return Err(Error::Calibration("principal point must be finite".to_string()));
        }
        if self.baseline_distance <= 0.0 {
            return Err(Error::Calibration(format!(
                "baseline distance must be positive, got {}",
                self.baseline_distance
            )));
        }
        Ok(())
    }
}
