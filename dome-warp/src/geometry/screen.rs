//! Virtual camera screens
//!
//! Each source image is rendered by a virtual camera looking at a flat screen.
//! The camera sits at the viewer's position, so a viewing direction inside the
//! dome can be traced straight onto the screen that faces it.

use glam::{DMat3, DVec3};

use super::field::DirectionField;
use super::flat_display::FlatDisplay;
use crate::config::ScreenConfig;
use crate::error::{DomeError, Result};

/// Physical description of one source screen, angles in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub height: f64,
    pub width: f64,
    pub distance: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
    pub pixel_height: usize,
    pub pixel_width: usize,
}

impl From<&ScreenConfig> for DisplayGeometry {
    fn from(config: &ScreenConfig) -> Self {
        Self {
            height: config.height,
            width: config.width,
            distance: config.distance,
            pitch: config.pitch.to_radians(),
            yaw: config.yaw.to_radians(),
            roll: config.roll.to_radians(),
            pixel_height: config.pixel_height as usize,
            pixel_width: config.pixel_width as usize,
        }
    }
}

impl DisplayGeometry {
    /// The screen as its own camera sees it: straight ahead along +y, tilted by pitch.
    pub fn camera_display(&self) -> FlatDisplay {
        FlatDisplay {
            height: self.height,
            width: self.width,
            pixel_height: self.pixel_height,
            pixel_width: self.pixel_width,
            distance: self.distance,
            vertical_offset: 0.0,
            phi: self.pitch,
        }
    }

    /// Vector from the viewer to the center of the screen.
    pub fn center(&self) -> DVec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.distance * DVec3::new(sin_yaw * cos_pitch, cos_yaw * cos_pitch, sin_pitch)
    }

    /// Build the row/column basis used to locate pixels on this screen.
    pub fn basis(&self) -> Result<ScreenBasis> {
        let center = self.center();
        let direction = center.normalize();

        // With no roll this is +z, so columns run horizontally.
        let (sin_roll, cos_roll) = self.roll.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let up = DVec3::new(sin_roll * cos_yaw, sin_roll * sin_yaw, cos_roll);

        let col = center.cross(up);
        if col.length() < 1e-9 * self.distance {
            return Err(DomeError::Configuration(format!(
                "screen with pitch {:.1} deg and roll {:.1} deg has no column direction",
                self.pitch.to_degrees(),
                self.roll.to_degrees()
            )));
        }
        let col = col.normalize();
        let row = center.cross(col).normalize();

        // Camera frame: x right, y level forward, z up, then tilted by pitch.
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let camera_axes = DMat3::from_cols(
            DVec3::X,
            DVec3::new(0.0, cos_pitch, sin_pitch),
            DVec3::new(0.0, -sin_pitch, cos_pitch),
        );
        let dome_axes = DMat3::from_cols(col, direction, -row);

        Ok(ScreenBasis {
            center,
            direction,
            distance: self.distance,
            row,
            col,
            row_spacing: self.height / self.pixel_height as f64,
            col_spacing: self.width / self.pixel_width as f64,
            row_center: self.pixel_height as f64 / 2.0,
            col_center: self.pixel_width as f64 / 2.0,
            pixel_height: self.pixel_height,
            pixel_width: self.pixel_width,
            camera: self.camera_display(),
            camera_to_dome: dome_axes * camera_axes.transpose(),
        })
    }
}

/// Vectors and pixel scales for tracing directions onto one screen.
///
/// Continuous pixel coordinates measure from the screen's top-left corner in
/// units of pixels, so pixel `(i, j)` covers `[i, i + 1) x [j, j + 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBasis {
    /// Vector from the viewer to the screen center.
    pub center: DVec3,
    /// Unit vector towards the screen center.
    pub direction: DVec3,
    pub distance: f64,
    /// Unit vector of increasing row number (down the image).
    pub row: DVec3,
    /// Unit vector of increasing column number (across the image).
    pub col: DVec3,
    pub row_spacing: f64,
    pub col_spacing: f64,
    pub row_center: f64,
    pub col_center: f64,
    pub pixel_height: usize,
    pub pixel_width: usize,
    camera: FlatDisplay,
    camera_to_dome: DMat3,
}

impl ScreenBasis {
    /// Cosine between a direction and the screen's center direction.
    pub fn facing(&self, direction: DVec3) -> f64 {
        direction.dot(self.direction)
    }

    /// Continuous `(row, col)` where a unit direction crosses this screen.
    ///
    /// Returns `None` when the screen faces away or the crossing is off-screen.
    pub fn project(&self, direction: DVec3) -> Option<(f64, f64)> {
        let facing = self.facing(direction);
        if facing <= 0.0 {
            return None;
        }

        let on_screen = direction * (self.distance / facing) - self.center;
        let row = self.row_center + on_screen.dot(self.row) / self.row_spacing;
        let col = self.col_center + on_screen.dot(self.col) / self.col_spacing;

        let inside = row >= 0.0
            && row < self.pixel_height as f64
            && col >= 0.0
            && col < self.pixel_width as f64;
        inside.then_some((row, col))
    }

    /// Unit direction from the viewer to a continuous `(row, col)` on the screen.
    pub fn direction_to(&self, row: f64, col: f64) -> DVec3 {
        let on_screen = (row - self.row_center) * self.row_spacing * self.row
            + (col - self.col_center) * self.col_spacing * self.col;
        (self.center + on_screen).normalize()
    }

    /// Camera view directions for every pixel, rotated into dome space.
    pub fn camera_view(&self) -> DirectionField {
        let to_dome = self.camera_to_dome;
        self.camera.directions().map(|d| (to_dome * *d).normalize())
    }
}
