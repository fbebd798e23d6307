//! Image warping for dome projection
//!
//! Combines one flat image per source screen into a single projector frame
//! using a precomputed contributing pixel table. The table is resolved to
//! discrete samples once, then reused for every frame.

mod reverse;

pub use reverse::project_to_screen;

use image::RgbImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{DomeError, Result};
use crate::geometry::Grid;
use crate::projection::{ContributingPixels, SourcePixel};

/// How a continuous source coordinate selects a discrete pixel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelLookup {
    /// The pixel whose area contains the coordinate, i.e. the nearest pixel
    /// center. Pixel `i` covers `[i, i + 1)`.
    #[default]
    Nearest,
    /// Round the coordinate half away from zero.
    Round,
}

impl PixelLookup {
    /// Discrete index for `coordinate` on an axis of `size` pixels.
    ///
    /// Always lands inside `0..size`; `size` must be non-zero.
    pub fn resolve(self, coordinate: f64, size: u32) -> u32 {
        let index = match self {
            PixelLookup::Nearest => coordinate.floor(),
            PixelLookup::Round => coordinate.round(),
        };
        let last = size.saturating_sub(1);
        // NaN casts to zero
        (index.max(0.0) as u32).min(last)
    }
}

/// One resolved source pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sample {
    screen: usize,
    x: u32,
    y: u32,
}

/// Applies a contributing pixel table to frames of source images
#[derive(Debug, Clone)]
pub struct Warper {
    samples: Grid<Vec<Sample>>,
    /// `(width, height)` of each source screen.
    screen_sizes: Vec<(u32, u32)>,
    lookup: PixelLookup,
}

impl Warper {
    /// Resolve `table` against the source screen sizes, given as `(width, height)`.
    ///
    /// Entries that name a screen outside `screen_sizes` are dropped.
    pub fn new(
        table: &ContributingPixels,
        screen_sizes: Vec<(u32, u32)>,
        lookup: PixelLookup,
    ) -> Self {
        let samples = table.grid().map(|pixels| {
            pixels
                .iter()
                .filter_map(|pixel| resolve(pixel, &screen_sizes, lookup))
                .collect()
        });
        Self {
            samples,
            screen_sizes,
            lookup,
        }
    }

    pub fn lookup(&self) -> PixelLookup {
        self.lookup
    }

    /// Output frame size as `(width, height)`.
    pub fn output_size(&self) -> (u32, u32) {
        (self.samples.cols() as u32, self.samples.rows() as u32)
    }

    pub fn screen_sizes(&self) -> &[(u32, u32)] {
        &self.screen_sizes
    }

    /// Warp one frame into a new projector image.
    pub fn warp(&self, images: &[RgbImage]) -> Result<RgbImage> {
        let (width, height) = self.output_size();
        let mut output = RgbImage::new(width, height);
        self.warp_into(images, &mut output)?;
        Ok(output)
    }

    /// Warp one frame into an existing projector image.
    ///
    /// Every output pixel is the average of its source pixels, truncated per
    /// channel, or black when it has none.
    pub fn warp_into(&self, images: &[RgbImage], output: &mut RgbImage) -> Result<()> {
        self.check_inputs(images)?;
        if output.dimensions() != self.output_size() {
            let (width, height) = self.output_size();
            return Err(DomeError::Configuration(format!(
                "output image is {}x{} but the projector is {}x{}",
                output.width(),
                output.height(),
                width,
                height
            )));
        }

        let cols = self.samples.cols();
        if cols == 0 {
            return Ok(());
        }
        let buffer: &mut [u8] = output;
        buffer
            .par_chunks_mut(cols * 3)
            .enumerate()
            .for_each(|(row, line)| {
                for (col, pixel) in line.chunks_exact_mut(3).enumerate() {
                    let samples = &self.samples[(row, col)];
                    if samples.is_empty() {
                        pixel.fill(0);
                        continue;
                    }

                    let mut sum = [0u32; 3];
                    for sample in samples {
                        let color = images[sample.screen].get_pixel(sample.x, sample.y).0;
                        for (total, channel) in sum.iter_mut().zip(color) {
                            *total += u32::from(channel);
                        }
                    }
                    let count = samples.len() as u32;
                    for (out, total) in pixel.iter_mut().zip(sum) {
                        *out = (total / count) as u8;
                    }
                }
            });
        Ok(())
    }

    fn check_inputs(&self, images: &[RgbImage]) -> Result<()> {
        if images.len() != self.screen_sizes.len() {
            return Err(DomeError::Configuration(format!(
                "expected {} source images, got {}",
                self.screen_sizes.len(),
                images.len()
            )));
        }
        for (screen, (image, expected)) in images.iter().zip(&self.screen_sizes).enumerate() {
            if image.dimensions() != *expected {
                return Err(DomeError::ImageDimensionMismatch {
                    screen,
                    expected: *expected,
                    actual: image.dimensions(),
                });
            }
        }
        Ok(())
    }
}

fn resolve(
    pixel: &SourcePixel,
    screen_sizes: &[(u32, u32)],
    lookup: PixelLookup,
) -> Option<Sample> {
    let &(width, height) = screen_sizes.get(pixel.screen)?;
    if width == 0 || height == 0 {
        return None;
    }
    Some(Sample {
        screen: pixel.screen,
        x: lookup.resolve(pixel.col, width),
        y: lookup.resolve(pixel.row, height),
    })
}
