//! Outline of a source screen as it appears on the dome

use super::mirror::AnimalView;
use super::search::SearchCursor;
use crate::geometry::{pitch_yaw, DirectionField};

/// One border pixel of a source screen and where it ends up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlinePoint {
    /// `(row, col)` on the source screen.
    pub source: (usize, usize),
    /// `(row, col)` of the projector pixel with the closest viewing direction.
    pub projector: (usize, usize),
    /// Elevation of the projector pixel as seen by the viewer, in degrees.
    pub pitch: f64,
    /// Azimuth of the projector pixel as seen by the viewer, in degrees.
    pub yaw: f64,
}

/// Border pixels of a `rows x cols` image, clockwise from the top-left.
///
/// Each pixel appears once.
pub fn border_pixels(rows: usize, cols: usize) -> Vec<(usize, usize)> {
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let mut border: Vec<(usize, usize)> = (0..cols).map(|col| (0, col)).collect();
    border.extend((1..rows).map(|row| (row, cols - 1)));
    if rows > 1 {
        border.extend((0..cols - 1).rev().map(|col| (rows - 1, col)));
    }
    if cols > 1 {
        border.extend((1..rows - 1).rev().map(|row| (row, 0)));
    }
    border
}

/// Trace the border of one source screen onto the projector.
///
/// `camera_view` holds the screen's per-pixel directions in dome space.
pub fn screen_outline(
    view: &AnimalView,
    camera_view: &DirectionField,
    cursor: &mut SearchCursor,
) -> Vec<OutlinePoint> {
    border_pixels(camera_view.rows(), camera_view.cols())
        .into_iter()
        .filter_map(|source| {
            let projector = cursor.nearest_pixel(view, camera_view[source])?;
            let (pitch, yaw) = pitch_yaw(view.direction(projector.0, projector.1)?);
            Some(OutlinePoint {
                source,
                projector,
                pitch,
                yaw,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Grid;
    use crate::projection::mirror::PixelView;
    use glam::DVec3;

    #[test]
    fn test_border_is_clockwise_without_repeats() {
        let border = border_pixels(3, 4);
        assert_eq!(
            border,
            vec![
                (0, 0),
                (0, 1),
                (0, 2),
                (0, 3),
                (1, 3),
                (2, 3),
                (2, 2),
                (2, 1),
                (2, 0),
                (1, 0),
            ]
        );
    }

    #[test]
    fn test_thin_borders() {
        assert_eq!(border_pixels(1, 3), vec![(0, 0), (0, 1), (0, 2)]);
        assert_eq!(border_pixels(3, 1), vec![(0, 0), (1, 0), (2, 0)]);
        assert_eq!(border_pixels(1, 1), vec![(0, 0)]);
        assert!(border_pixels(0, 5).is_empty());
    }

    #[test]
    fn test_outline_reports_view_angles() {
        let views = Grid::from_fn(3, 3, |r, c| {
            let yaw = (c as f64 - 1.0) * 0.2;
            let pitch = (1.0 - r as f64) * 0.2;
            PixelView::Valid(DVec3::new(
                yaw.sin() * pitch.cos(),
                yaw.cos() * pitch.cos(),
                pitch.sin(),
            ))
        });
        let view = AnimalView::from_views(&views);
        let camera_view = view.directions().clone();
        let mut cursor = SearchCursor::new(3, 3);

        let outline = screen_outline(&view, &camera_view, &mut cursor);
        assert_eq!(outline.len(), 8);
        for point in &outline {
            assert_eq!(point.source, point.projector);
        }
        let top_left = outline[0];
        assert!((top_left.pitch - 0.2f64.to_degrees()).abs() < 1e-9);
        assert!((top_left.yaw + 0.2f64.to_degrees()).abs() < 1e-9);
    }
}
