//! Dome projection pipeline
//!
//! Turns a [`DomeConfig`] into everything needed to warp frames: the projector
//! focal point, the direction the viewer sees for each projector pixel, the
//! per-screen camera views and the contributing pixel table. All of it is
//! computed once in [`DomeProjection::new`] and read-only afterwards.

mod mapper;
mod mirror;
mod outline;
mod search;

pub use mapper::{
    contributing_pixels, facing_screen, source_pixel, ContributingPixels, SourcePixel,
};
pub use mirror::{
    projector_pixel_directions, AnimalView, MirrorSolver, PixelView, ReflectedRay,
};
pub use outline::{border_pixels, screen_outline, OutlinePoint};
pub use search::{forward_contributing_pixels, SearchCursor};

use std::time::Instant;

use glam::DVec3;
use image::RgbImage;

use crate::config::DomeConfig;
use crate::error::{DomeError, Result};
use crate::geometry::{
    pitch_yaw, DirectionField, DisplayGeometry, DomeGeometry, MirrorGeometry, ProjectorGeometry,
    ScreenBasis,
};
use crate::warp::{self, Warper};

/// Horizontal and vertical angular extent in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOfView {
    pub horizontal: f64,
    pub vertical: f64,
}

/// Field of view summary for a configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldsOfView {
    /// The source screen facing most nearly straight ahead, as its camera sees it.
    pub camera: FieldOfView,
    /// Extent of the projector pixels that show source content, as the viewer
    /// sees them. `None` when no pixel does.
    pub dome: Option<FieldOfView>,
}

/// Precomputed geometry and lookup tables for one dome configuration
#[derive(Debug, Clone)]
pub struct DomeProjection {
    config: DomeConfig,
    focal_point: DVec3,
    screens: Vec<DisplayGeometry>,
    bases: Vec<ScreenBasis>,
    camera_views: Vec<DirectionField>,
    projector_directions: DirectionField,
    animal_view: AnimalView,
    contributing: ContributingPixels,
}

impl DomeProjection {
    /// Validate `config` and compute every derived structure.
    pub fn new(config: &DomeConfig) -> Result<Self> {
        config.validate()?;
        let started = Instant::now();

        let projector = ProjectorGeometry::from(&config.projector);
        let focal_point = projector.focal_point()?;
        log::info!(
            "Projector focal point at ({:.4}, {:.4}, {:.4})",
            focal_point.x,
            focal_point.y,
            focal_point.z
        );
        let plane = projector.image_plane(focal_point)?;
        let projector_directions = projector_pixel_directions(&plane);

        let solver = MirrorSolver {
            focal_point,
            mirror: MirrorGeometry {
                radius: config.mirror_radius,
            }
            .sphere(),
            dome: DomeGeometry {
                center: DVec3::from_array(config.dome_center),
                radius: config.dome_radius,
            }
            .sphere(),
            viewer: DVec3::from_array(config.animal_position),
        };
        let animal_view = AnimalView::compute(&solver, &projector_directions);
        log::debug!("Traced projector pixels in {:?}", started.elapsed());

        let total = animal_view.rows() * animal_view.cols();
        let valid = animal_view.valid_count();
        log::info!(
            "{} of {} projector pixels reach the dome ({:.1}%)",
            valid,
            total,
            100.0 * animal_view.valid_fraction()
        );
        if animal_view.valid_fraction() < 0.5 {
            log::warn!(
                "Only {:.1}% of projector pixels reach the dome; check the mirror and projector calibration",
                100.0 * animal_view.valid_fraction()
            );
        }

        let screens: Vec<DisplayGeometry> =
            config.screens.iter().map(DisplayGeometry::from).collect();
        let bases = screens
            .iter()
            .map(DisplayGeometry::basis)
            .collect::<Result<Vec<_>>>()?;
        let camera_views: Vec<DirectionField> =
            bases.iter().map(ScreenBasis::camera_view).collect();

        let table_started = Instant::now();
        let contributing = contributing_pixels(&animal_view, &bases);
        log::debug!("Built contributing pixel table in {:?}", table_started.elapsed());
        log::info!(
            "Contributing pixel table fills {} projector pixels, per screen {:?}",
            contributing.filled_count(),
            contributing.screen_counts(bases.len())
        );

        Ok(Self {
            config: config.clone(),
            focal_point,
            screens,
            bases,
            camera_views,
            projector_directions,
            animal_view,
            contributing,
        })
    }

    pub fn config(&self) -> &DomeConfig {
        &self.config
    }

    pub fn focal_point(&self) -> DVec3 {
        self.focal_point
    }

    pub fn screens(&self) -> &[DisplayGeometry] {
        &self.screens
    }

    pub fn screen_bases(&self) -> &[ScreenBasis] {
        &self.bases
    }

    /// Per-screen camera view directions in dome space.
    pub fn camera_views(&self) -> &[DirectionField] {
        &self.camera_views
    }

    /// Directions from the focal point through each projector pixel.
    pub fn projector_directions(&self) -> &DirectionField {
        &self.projector_directions
    }

    pub fn animal_view(&self) -> &AnimalView {
        &self.animal_view
    }

    pub fn contributing_pixels(&self) -> &ContributingPixels {
        &self.contributing
    }

    /// `(rows, cols)` of the projector.
    pub fn projector_size(&self) -> (usize, usize) {
        (self.animal_view.rows(), self.animal_view.cols())
    }

    /// A fresh search cursor for this projector.
    pub fn search_cursor(&self) -> SearchCursor {
        let (rows, cols) = self.projector_size();
        SearchCursor::new(rows, cols)
    }

    /// Warper for the contributing pixel table using the configured lookup.
    pub fn warper(&self) -> Warper {
        let sizes = self
            .screens
            .iter()
            .map(|screen| (screen.pixel_width as u32, screen.pixel_height as u32))
            .collect();
        Warper::new(&self.contributing, sizes, self.config.pixel_lookup)
    }

    /// Viewing direction at continuous projector coordinates.
    ///
    /// `u` runs across the projector image and `v` down it; pixel `(row, col)`
    /// covers `[col, col + 1) x [row, row + 1)`.
    pub fn view_direction(&self, u: f64, v: f64) -> Result<DVec3> {
        let missing = DomeError::NoViewingDirection { u, v };
        if u.is_nan() || v.is_nan() || u < 0.0 || v < 0.0 {
            return Err(missing);
        }
        let (rows, cols) = self.projector_size();
        let (row, col) = (v.floor(), u.floor());
        if row >= rows as f64 || col >= cols as f64 {
            return Err(missing);
        }
        self.animal_view
            .direction(row as usize, col as usize)
            .ok_or(missing)
    }

    /// [`view_direction`](Self::view_direction) for a batch of `(u, v)` points.
    pub fn view_directions(&self, points: &[(f64, f64)]) -> Vec<Result<DVec3>> {
        points
            .iter()
            .map(|&(u, v)| self.view_direction(u, v))
            .collect()
    }

    /// Angular extent of the front camera and of the image on the dome.
    pub fn fields_of_view(&self) -> Result<FieldsOfView> {
        let front = self
            .screens
            .iter()
            .min_by(|a, b| a.yaw.abs().total_cmp(&b.yaw.abs()))
            .ok_or_else(|| DomeError::Configuration("no screens configured".to_string()))?;
        let camera = FieldOfView {
            horizontal: 2.0 * (front.width / (2.0 * front.distance)).atan().to_degrees(),
            vertical: 2.0 * (front.height / (2.0 * front.distance)).atan().to_degrees(),
        };

        let mut extent: Option<(f64, f64, f64, f64)> = None;
        for ((row, col), pixels) in self.contributing.grid().indexed_iter() {
            if pixels.is_empty() {
                continue;
            }
            let Some(direction) = self.animal_view.direction(row, col) else {
                continue;
            };
            let (pitch, yaw) = pitch_yaw(direction);
            extent = Some(match extent {
                None => (yaw, yaw, pitch, pitch),
                Some((min_yaw, max_yaw, min_pitch, max_pitch)) => (
                    min_yaw.min(yaw),
                    max_yaw.max(yaw),
                    min_pitch.min(pitch),
                    max_pitch.max(pitch),
                ),
            });
        }
        let dome = extent.map(|(min_yaw, max_yaw, min_pitch, max_pitch)| FieldOfView {
            horizontal: max_yaw - min_yaw,
            vertical: max_pitch - min_pitch,
        });

        Ok(FieldsOfView { camera, dome })
    }

    /// Contributing pixel table built by searching forward from each source pixel.
    pub fn forward_contributing_pixels(&self, cursor: &mut SearchCursor) -> ContributingPixels {
        forward_contributing_pixels(&self.animal_view, &self.bases, &self.camera_views, cursor)
    }

    /// Border of one source screen traced onto the projector.
    pub fn screen_outline(
        &self,
        screen: usize,
        cursor: &mut SearchCursor,
    ) -> Result<Vec<OutlinePoint>> {
        let camera_view = self.camera_view(screen)?;
        Ok(screen_outline(&self.animal_view, camera_view, cursor))
    }

    /// Resample a warped projector frame onto one source screen.
    pub fn project_to_screen(
        &self,
        warped: &RgbImage,
        screen: usize,
        cursor: &mut SearchCursor,
    ) -> Result<RgbImage> {
        let camera_view = self.camera_view(screen)?;
        warp::project_to_screen(&self.animal_view, camera_view, warped, cursor)
    }

    fn camera_view(&self, screen: usize) -> Result<&DirectionField> {
        self.camera_views.get(screen).ok_or_else(|| {
            DomeError::Configuration(format!(
                "no screen {}; {} configured",
                screen,
                self.camera_views.len()
            ))
        })
    }
}
