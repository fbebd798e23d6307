//! Contributing pixel table
//!
//! For every projector pixel the viewer sees, find the source screen that faces
//! the same direction and the point on that screen the direction passes through.

use serde::{Deserialize, Serialize};

use super::mirror::AnimalView;
use crate::geometry::{Grid, ScreenBasis};

/// A continuous position on one source screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourcePixel {
    pub screen: usize,
    pub row: f64,
    pub col: f64,
}

/// Source pixels supplying the color of each projector pixel
///
/// Built once from the viewing directions and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributingPixels {
    table: Grid<Vec<SourcePixel>>,
}

impl ContributingPixels {
    pub fn from_grid(table: Grid<Vec<SourcePixel>>) -> Self {
        Self { table }
    }

    pub fn rows(&self) -> usize {
        self.table.rows()
    }

    pub fn cols(&self) -> usize {
        self.table.cols()
    }

    /// Source pixels for one projector pixel; empty when it renders black.
    pub fn get(&self, row: usize, col: usize) -> &[SourcePixel] {
        self.table.get(row, col).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn row(&self, row: usize) -> &[Vec<SourcePixel>] {
        self.table.row(row)
    }

    pub fn grid(&self) -> &Grid<Vec<SourcePixel>> {
        &self.table
    }

    /// Number of projector pixels with at least one source pixel.
    pub fn filled_count(&self) -> usize {
        self.table.iter().filter(|pixels| !pixels.is_empty()).count()
    }

    /// Number of table entries that sample each screen.
    pub fn screen_counts(&self, screens: usize) -> Vec<usize> {
        let mut counts = vec![0; screens];
        for pixel in self.table.iter().flatten() {
            if let Some(count) = counts.get_mut(pixel.screen) {
                *count += 1;
            }
        }
        counts
    }
}

/// Index of the screen whose center direction is closest to `direction`.
///
/// Returns `None` when no screen faces the direction at all, which would
/// otherwise land on the far side of a screen's extended plane.
pub fn facing_screen(direction: glam::DVec3, bases: &[ScreenBasis]) -> Option<usize> {
    let mut best = None;
    let mut best_dot = 0.0;
    for (i, basis) in bases.iter().enumerate() {
        let dot = basis.facing(direction);
        if dot > best_dot {
            best_dot = dot;
            best = Some(i);
        }
    }
    best
}

/// Back-project one viewing direction onto the screen facing it.
pub fn source_pixel(direction: glam::DVec3, bases: &[ScreenBasis]) -> Option<SourcePixel> {
    let screen = facing_screen(direction, bases)?;
    let (row, col) = bases[screen].project(direction)?;
    Some(SourcePixel { screen, row, col })
}

/// Build the table by back-projecting every valid projector pixel.
pub fn contributing_pixels(view: &AnimalView, bases: &[ScreenBasis]) -> ContributingPixels {
    let table = Grid::from_fn(view.rows(), view.cols(), |row, col| {
        view.direction(row, col)
            .and_then(|direction| source_pixel(direction, bases))
            .into_iter()
            .collect()
    });
    ContributingPixels::from_grid(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScreenConfig;
    use crate::geometry::DisplayGeometry;
    use crate::projection::mirror::PixelView;
    use glam::DVec3;

    fn bases() -> Vec<ScreenBasis> {
        [-90.0, 0.0, 90.0]
            .iter()
            .map(|yaw| {
                DisplayGeometry::from(&ScreenConfig::with_yaw(*yaw))
                    .basis()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_facing_screen_picks_largest_dot() {
        let bases = bases();
        assert_eq!(facing_screen(DVec3::Y, &bases), Some(1));
        assert_eq!(facing_screen(DVec3::X, &bases), Some(2));
        assert_eq!(facing_screen(-DVec3::X, &bases), Some(0));
        // Straight behind and below: no screen faces it
        assert_eq!(facing_screen(DVec3::new(0.0, -1.0, -1.0).normalize(), &bases), None);
    }

    #[test]
    fn test_source_pixel_on_center_screen() {
        let bases = bases();
        let pixel = source_pixel(bases[1].direction, &bases).unwrap();
        assert_eq!(pixel.screen, 1);
        assert!((pixel.row - 100.0).abs() < 1e-9);
        assert!((pixel.col - 140.0).abs() < 1e-9);

        // Steeply down is outside the screen even though the screen faces it
        assert!(source_pixel(DVec3::new(0.0, 1.0, -1.2).normalize(), &bases).is_none());
    }

    #[test]
    fn test_table_skips_invalid_pixels() {
        let bases = bases();
        let views = Grid::from_vec(
            1,
            3,
            vec![
                PixelView::Valid(DVec3::Y),
                PixelView::Invalid,
                PixelView::Valid(-DVec3::Y),
            ],
        )
        .unwrap();
        let view = AnimalView::from_views(&views);
        let table = contributing_pixels(&view, &bases);

        assert_eq!(table.get(0, 0).len(), 1);
        assert!(table.get(0, 1).is_empty());
        assert!(table.get(0, 2).is_empty());
        assert!(table.get(5, 5).is_empty());
        assert_eq!(table.filled_count(), 1);
        assert_eq!(table.screen_counts(3), vec![0, 1, 0]);
    }
}
