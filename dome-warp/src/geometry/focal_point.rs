//! Projector focal point from two calibration images
//!
//! The projected rectangle is measured on two planes of constant y. Its top and
//! bottom edges trace two lines in the y-z plane that meet at the lens.

use glam::{DMat2, DVec2, DVec3};

use crate::error::{DomeError, Result};

const SINGULAR_EPSILON: f64 = 1e-12;

/// Intersect the lines along the top and bottom of the projected light.
///
/// Each quad lists its corners clockwise from the top-left. The image is assumed
/// horizontally centered on the mirror, so the focal point has x = 0.
pub fn projector_focal_point(first: &[DVec3; 4], second: &[DVec3; 4]) -> Result<DVec3> {
    let y1 = first[0].y;
    let y2 = second[0].y;
    let depth = y2 - y1;
    if depth.abs() < SINGULAR_EPSILON {
        return Err(DomeError::DegenerateCalibration(format!(
            "calibration images share the same depth y = {}",
            y1
        )));
    }

    let upper_z1 = first[0].z;
    let upper_slope = (second[0].z - upper_z1) / depth;
    let lower_z1 = first[2].z;
    let lower_slope = (second[2].z - lower_z1) / depth;

    // slope * y - z = slope * y1 - z1 for each edge
    let a = DMat2::from_cols(DVec2::new(upper_slope, lower_slope), DVec2::new(-1.0, -1.0));
    let b = DVec2::new(upper_slope * y1 - upper_z1, lower_slope * y1 - lower_z1);

    let det = a.determinant();
    if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
        return Err(DomeError::DegenerateCalibration(format!(
            "top and bottom edges are parallel (slopes {:.6} and {:.6})",
            upper_slope, lower_slope
        )));
    }

    let yz = a.inverse() * b;
    Ok(DVec3::new(0.0, yz.x, yz.y))
}
