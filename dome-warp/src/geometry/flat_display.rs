//! Viewing directions for flat rectangular displays
//!
//! Used for the virtual camera screens and for the projector's image plane.

use glam::DVec3;

use super::field::{DirectionField, Grid};

/// A flat display seen from a viewpoint at the origin.
///
/// The display lies along +y with +x to the viewer's right and +z up. Pixel
/// centers span the full physical width and height, first pixel on one edge and
/// last pixel on the other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatDisplay {
    /// Physical height.
    pub height: f64,
    /// Physical width.
    pub width: f64,
    pub pixel_height: usize,
    pub pixel_width: usize,
    /// Distance from the viewpoint to the display, negative when it lies along -y.
    pub distance: f64,
    /// Shift of the display along z.
    pub vertical_offset: f64,
    /// Angle between the view axis and the horizontal plane, in radians.
    pub phi: f64,
}

/// Position of a pixel index within `0..count` as a fraction in [0, 1].
///
/// A single pixel sits at the center.
fn fraction(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.5
    } else {
        index as f64 / (count - 1) as f64
    }
}

impl FlatDisplay {
    /// Unit vector from the viewpoint towards the center of pixel (row, col).
    pub fn direction(&self, row: usize, col: usize) -> DVec3 {
        let fr = fraction(row, self.pixel_height);
        let fc = fraction(col, self.pixel_width);
        let (sin_phi, cos_phi) = self.phi.sin_cos();

        let x = self.width * (fc - 0.5);
        let y = self.distance * cos_phi + (fr - 0.5) * self.height * sin_phi;
        let z = self.distance * sin_phi
            + (0.5 - fr) * self.height * cos_phi
            + self.vertical_offset;

        DVec3::new(x, y, z).normalize()
    }

    /// Directions for every pixel of the display.
    pub fn directions(&self) -> DirectionField {
        Grid::from_fn(self.pixel_height, self.pixel_width, |row, col| {
            self.direction(row, col)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(pixel_height: usize, pixel_width: usize) -> FlatDisplay {
        FlatDisplay {
            height: 1.0,
            width: 1.4,
            pixel_height,
            pixel_width,
            distance: 0.5,
            vertical_offset: 0.0,
            phi: 0.0,
        }
    }

    #[test]
    fn test_corners_span_the_screen() {
        let field = display(3, 5).directions();
        let top_left = field[(0, 0)];
        let expected = DVec3::new(-0.7, 0.5, 0.5).normalize();
        assert!((top_left - expected).length() < 1e-12);

        let bottom_right = field[(2, 4)];
        let expected = DVec3::new(0.7, 0.5, -0.5).normalize();
        assert!((bottom_right - expected).length() < 1e-12);

        // Odd resolution puts a pixel exactly on the axis
        assert!((field[(1, 2)] - DVec3::Y).length() < 1e-12);
    }

    #[test]
    fn test_all_directions_are_unit() {
        let mut d = display(7, 9);
        d.phi = 0.4;
        d.vertical_offset = -0.2;
        for v in d.directions().iter() {
            assert!((v.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_row_and_column_use_center() {
        let field = display(1, 1).directions();
        assert_eq!(field.rows(), 1);
        assert!((field[(0, 0)] - DVec3::Y).length() < 1e-12);

        let row = display(1, 4).directions();
        for v in row.iter() {
            assert!(v.z.abs() < 1e-12);
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_pitch_tilts_center_up() {
        let mut d = display(3, 3);
        d.phi = 30f64.to_radians();
        let center = d.direction(1, 1);
        let pitch = center.z.asin().to_degrees();
        assert!((pitch - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_distance_faces_backwards() {
        let mut d = display(3, 3);
        d.distance = -0.6;
        d.vertical_offset = 0.1;
        let center = d.direction(1, 1);
        assert!(center.y < 0.0);
        assert!(center.z > 0.0);
    }
}
