//! Direction-space nearest-pixel search
//!
//! Finds the projector pixel whose viewing direction best matches a query
//! direction by greedy hill climbing over the 8-connected pixel grid. The
//! climb starts from the previous answer, so a sequence of nearby queries
//! converges in a few steps. It is an approximation: it relies on the viewing
//! directions varying smoothly across the projector and can stop at a local
//! maximum where they do not.

use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::mapper::{facing_screen, ContributingPixels, SourcePixel};
use super::mirror::AnimalView;
use crate::geometry::{DirectionField, Grid, ScreenBasis};

/// Seed used by [`SearchCursor::new`] so repeated runs give identical tables.
const DEFAULT_SEED: u64 = 0x0d0e_5eed;

/// Random restarts tried before falling back to a scan for any valid pixel.
const MAX_RESTARTS: usize = 1024;

const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Search state carried between queries
#[derive(Debug, Clone)]
pub struct SearchCursor {
    position: (usize, usize),
    rng: StdRng,
}

impl SearchCursor {
    /// Start at the middle of the projector's bottom row.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_seed(rows, cols, DEFAULT_SEED)
    }

    pub fn with_seed(rows: usize, cols: usize, seed: u64) -> Self {
        Self {
            position: (rows.saturating_sub(1), cols / 2),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The most recently returned pixel.
    pub fn position(&self) -> (usize, usize) {
        self.position
    }

    /// Projector pixel whose viewing direction has the largest dot product
    /// with `query`, as found by hill climbing from the last answer.
    ///
    /// Invalid pixels are never visited. Returns `None` when the view has no
    /// valid pixel at all.
    pub fn nearest_pixel(&mut self, view: &AnimalView, query: DVec3) -> Option<(usize, usize)> {
        let (mut row, mut col) = self.valid_start(view)?;
        let mut best = view.direction(row, col)?.dot(query);

        loop {
            let mut next = None;
            for (dr, dc) in NEIGHBORS {
                let (Some(r), Some(c)) = (row.checked_add_signed(dr), col.checked_add_signed(dc))
                else {
                    continue;
                };
                if let Some(direction) = view.direction(r, c) {
                    let dot = direction.dot(query);
                    if dot > best {
                        best = dot;
                        next = Some((r, c));
                    }
                }
            }
            match next {
                Some((r, c)) => {
                    row = r;
                    col = c;
                }
                None => break,
            }
        }

        self.position = (row, col);
        Some((row, col))
    }

    fn valid_start(&mut self, view: &AnimalView) -> Option<(usize, usize)> {
        let (row, col) = self.position;
        if view.is_valid(row, col) {
            return Some((row, col));
        }
        if view.rows() == 0 || view.cols() == 0 {
            return None;
        }

        for _ in 0..MAX_RESTARTS {
            let row = self.rng.random_range(0..view.rows());
            let col = self.rng.random_range(0..view.cols());
            if view.is_valid(row, col) {
                return Some((row, col));
            }
        }

        // Sparse masks: take the first valid pixel, if any
        view.mask()
            .indexed_iter()
            .find(|(_, valid)| **valid)
            .map(|(position, _)| position)
    }
}

/// Build the contributing pixel table by searching forward from every source pixel.
///
/// Each screen is scanned in a serpentine order so consecutive queries stay
/// close together. A source pixel is kept only when the projector pixel it
/// lands on is itself facing the same screen, which drops matches that stop
/// at the edge of the dome image. Source positions are recorded at the
/// pixel's origin corner.
pub fn forward_contributing_pixels(
    view: &AnimalView,
    bases: &[ScreenBasis],
    camera_views: &[DirectionField],
    cursor: &mut SearchCursor,
) -> ContributingPixels {
    let mut table: Grid<Vec<SourcePixel>> =
        Grid::from_fn(view.rows(), view.cols(), |_, _| Vec::new());

    for (screen, field) in camera_views.iter().enumerate() {
        for row in 0..field.rows() {
            let forward = row % 2 == 0;
            for i in 0..field.cols() {
                let col = if forward { i } else { field.cols() - 1 - i };
                let Some((r, c)) = cursor.nearest_pixel(view, field[(row, col)]) else {
                    continue;
                };
                let lands_on_screen = view
                    .direction(r, c)
                    .and_then(|direction| facing_screen(direction, bases))
                    == Some(screen);
                if !lands_on_screen {
                    continue;
                }
                if let Some(pixels) = table.get_mut(r, c) {
                    pixels.push(SourcePixel {
                        screen,
                        row: row as f64,
                        col: col as f64,
                    });
                }
            }
        }
    }

    ContributingPixels::from_grid(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::mirror::PixelView;

    /// Directions fanning out smoothly like a small projector's view.
    fn fan(rows: usize, cols: usize) -> AnimalView {
        let views = Grid::from_fn(rows, cols, |r, c| {
            let yaw = (c as f64 - cols as f64 / 2.0) * 0.05;
            let pitch = (rows as f64 / 2.0 - r as f64) * 0.05;
            PixelView::Valid(DVec3::new(yaw.sin(), yaw.cos() * pitch.cos(), pitch.sin()).normalize())
        });
        AnimalView::from_views(&views)
    }

    #[test]
    fn test_cursor_starts_bottom_middle() {
        let cursor = SearchCursor::new(720, 1280);
        assert_eq!(cursor.position(), (719, 640));
    }

    #[test]
    fn test_finds_exact_pixel() {
        let view = fan(20, 30);
        let mut cursor = SearchCursor::new(20, 30);
        for &(r, c) in &[(3, 4), (10, 15), (19, 0), (0, 29), (12, 2)] {
            let query = view.direction(r, c).unwrap();
            assert_eq!(cursor.nearest_pixel(&view, query), Some((r, c)));
            assert_eq!(cursor.position(), (r, c));
        }
    }

    #[test]
    fn test_restarts_from_valid_pixel() {
        let full = fan(10, 10);
        // Only the top-left quarter is valid, so the bottom-middle start is invalid
        let views = Grid::from_fn(10, 10, |r, c| {
            if r < 5 && c < 5 {
                PixelView::Valid(full.direction(r, c).unwrap())
            } else {
                PixelView::Invalid
            }
        });
        let view = AnimalView::from_views(&views);
        let mut cursor = SearchCursor::with_seed(10, 10, 7);
        let query = view.direction(2, 3).unwrap();
        assert_eq!(cursor.nearest_pixel(&view, query), Some((2, 3)));

        // A query outside the valid region stops on its border
        let outside = full.direction(8, 8).unwrap();
        let (r, c) = cursor.nearest_pixel(&view, outside).unwrap();
        assert!(view.is_valid(r, c));
        assert_eq!((r, c), (4, 4));
    }

    #[test]
    fn test_all_invalid_returns_none() {
        let views = Grid::from_fn(4, 4, |_, _| PixelView::Invalid);
        let view = AnimalView::from_views(&views);
        let mut cursor = SearchCursor::new(4, 4);
        assert_eq!(cursor.nearest_pixel(&view, DVec3::Y), None);
        assert_eq!(cursor.position(), (3, 2));
    }

    #[test]
    fn test_single_valid_pixel_found_by_scan() {
        let views = Grid::from_fn(64, 64, |r, c| {
            if (r, c) == (5, 60) {
                PixelView::Valid(DVec3::Y)
            } else {
                PixelView::Invalid
            }
        });
        let view = AnimalView::from_views(&views);
        let mut cursor = SearchCursor::new(64, 64);
        assert_eq!(cursor.nearest_pixel(&view, DVec3::X), Some((5, 60)));
    }
}
