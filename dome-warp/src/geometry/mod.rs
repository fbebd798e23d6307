//! Geometry of the dome display
//!
//! Fixed physical descriptions of the projector, mirror, dome and source screens,
//! plus the primitives used to trace light through them.

mod field;
mod flat_display;
mod focal_point;
mod screen;
mod sphere;

pub use field::{DirectionField, Grid, ValidityMask};
pub use flat_display::FlatDisplay;
pub use focal_point::projector_focal_point;
pub use screen::{DisplayGeometry, ScreenBasis};
pub use sphere::{reflect, Sphere};

use glam::DVec3;

use crate::config::ProjectorConfig;
use crate::error::{DomeError, Result};

/// Projector resolution and the two measured images of its output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectorGeometry {
    pub pixel_height: usize,
    pub pixel_width: usize,
    /// Corners on the plane farther from the mirror, clockwise from top-left.
    pub first_image: [DVec3; 4],
    /// Corners on the plane nearer the mirror, clockwise from top-left.
    pub second_image: [DVec3; 4],
}

impl From<&ProjectorConfig> for ProjectorGeometry {
    fn from(config: &ProjectorConfig) -> Self {
        Self {
            pixel_height: config.pixel_height as usize,
            pixel_width: config.pixel_width as usize,
            first_image: config.first_image.map(DVec3::from_array),
            second_image: config.second_image.map(DVec3::from_array),
        }
    }
}

impl ProjectorGeometry {
    /// Effective lens position of the projector.
    pub fn focal_point(&self) -> Result<DVec3> {
        projector_focal_point(&self.first_image, &self.second_image)
    }

    /// The second calibration image as a flat display seen from the focal point.
    ///
    /// Assumes the image has the same width at its top and bottom.
    pub fn image_plane(&self, focal_point: DVec3) -> Result<FlatDisplay> {
        let [top_left, top_right, _, bottom_left] = self.second_image;
        let height = top_left.z - bottom_left.z;
        let width = top_right.x - top_left.x;
        if height.abs() < f64::EPSILON || width.abs() < f64::EPSILON {
            return Err(DomeError::DegenerateCalibration(format!(
                "second calibration image has no area ({:.4} x {:.4})",
                width, height
            )));
        }

        Ok(FlatDisplay {
            height,
            width,
            pixel_height: self.pixel_height,
            pixel_width: self.pixel_width,
            distance: top_left.y - focal_point.y,
            vertical_offset: bottom_left.z - focal_point.z + height / 2.0,
            phi: 0.0,
        })
    }
}

/// Spherical mirror centered at the dome-space origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorGeometry {
    pub radius: f64,
}

impl MirrorGeometry {
    pub fn sphere(&self) -> Sphere {
        Sphere::new(DVec3::ZERO, self.radius)
    }
}

/// Hemispherical screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomeGeometry {
    /// Vector from the mirror center to the dome center.
    pub center: DVec3,
    pub radius: f64,
}

impl DomeGeometry {
    pub fn sphere(&self) -> Sphere {
        Sphere::new(self.center, self.radius)
    }
}

/// Pitch and yaw of a direction in degrees.
///
/// Pitch is the elevation above the horizontal plane; yaw is measured in the
/// horizontal plane from +y towards +x.
pub fn pitch_yaw(direction: DVec3) -> (f64, f64) {
    let direction = direction.normalize();
    let pitch = direction.z.clamp(-1.0, 1.0).asin().to_degrees();
    let yaw = direction.x.atan2(direction.y).to_degrees();
    (pitch, yaw)
}
