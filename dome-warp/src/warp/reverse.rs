//! Projector frame back onto a flat screen
//!
//! Shows what the viewer would see of a warped frame, resampled onto one of
//! the source screens. Useful for checking a warp by eye.

use image::{Rgb, RgbImage};

use crate::error::{DomeError, Result};
use crate::geometry::DirectionField;
use crate::projection::{AnimalView, SearchCursor};

/// Resample a warped projector frame onto a screen with per-pixel
/// directions `camera_view`.
///
/// Each screen pixel takes the color of the projector pixel found by the
/// nearest-pixel search, or black when there is none.
pub fn project_to_screen(
    view: &AnimalView,
    camera_view: &DirectionField,
    warped: &RgbImage,
    cursor: &mut SearchCursor,
) -> Result<RgbImage> {
    let expected = (view.cols() as u32, view.rows() as u32);
    if warped.dimensions() != expected {
        return Err(DomeError::Configuration(format!(
            "warped image is {}x{} but the projector is {}x{}",
            warped.width(),
            warped.height(),
            expected.0,
            expected.1
        )));
    }

    let mut screen = RgbImage::new(camera_view.cols() as u32, camera_view.rows() as u32);
    for ((row, col), direction) in camera_view.indexed_iter() {
        let color = match cursor.nearest_pixel(view, *direction) {
            Some((r, c)) => *warped.get_pixel(c as u32, r as u32),
            None => Rgb([0, 0, 0]),
        };
        screen.put_pixel(col as u32, row as u32, color);
    }
    Ok(screen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Grid;
    use crate::projection::PixelView;
    use glam::DVec3;

    #[test]
    fn test_identity_view_copies_frame() {
        let views = Grid::from_fn(2, 3, |r, c| {
            PixelView::Valid(DVec3::new(c as f64 - 1.0, 4.0, 0.5 - r as f64).normalize())
        });
        let view = AnimalView::from_views(&views);
        let mut warped = RgbImage::new(3, 2);
        for (x, y, pixel) in warped.enumerate_pixels_mut() {
            *pixel = Rgb([x as u8 * 50, y as u8 * 100, 7]);
        }

        let mut cursor = SearchCursor::new(2, 3);
        let screen = project_to_screen(&view, view.directions(), &warped, &mut cursor).unwrap();
        assert_eq!(screen, warped);
    }

    #[test]
    fn test_rejects_wrong_frame_size() {
        let views = Grid::from_fn(2, 2, |_, _| PixelView::Valid(DVec3::Y));
        let view = AnimalView::from_views(&views);
        let mut cursor = SearchCursor::new(2, 2);
        let result = project_to_screen(&view, view.directions(), &RgbImage::new(3, 3), &mut cursor);
        assert!(matches!(result, Err(DomeError::Configuration(_))));
    }
}
