//! Mirror reflection field
//!
//! Traces every projector pixel from the focal point to the mirror, reflects it
//! onto the dome and records the direction in which the viewer sees the lit spot.
//! Each pixel is independent, so the field is computed with a parallel map.

use glam::DVec3;

use crate::geometry::{reflect, DirectionField, FlatDisplay, Grid, Sphere, ValidityMask};

/// Outcome of tracing one projector pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelView {
    /// Unit direction from the viewer to the illuminated point on the dome.
    Valid(DVec3),
    /// The ray misses the mirror or, after reflection, the dome.
    Invalid,
}

/// Every stage of a traced ray, for diagnostics and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectedRay {
    /// Unit direction leaving the projector.
    pub incident: DVec3,
    /// Point where the ray meets the mirror.
    pub mirror_point: DVec3,
    /// Outward unit normal of the mirror at `mirror_point`.
    pub normal: DVec3,
    /// Unit direction after reflection.
    pub reflected: DVec3,
    /// Point where the reflected ray meets the dome.
    pub dome_point: DVec3,
    /// Unit direction from the viewer to `dome_point`.
    pub view: DVec3,
}

/// Optical layout from the projector lens to the viewer's eye
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorSolver {
    pub focal_point: DVec3,
    pub mirror: Sphere,
    pub dome: Sphere,
    pub viewer: DVec3,
}

impl MirrorSolver {
    /// Follow one projector ray through the mirror onto the dome.
    pub fn trace(&self, incident: DVec3) -> Option<ReflectedRay> {
        // Nearest hit is the side of the mirror facing the projector
        let (near, _) = self.mirror.intersect(self.focal_point, incident)?;
        if near <= 0.0 {
            return None;
        }
        let mirror_point = self.focal_point + near * incident;
        let normal = self.mirror.normal_at(mirror_point);
        let reflected = reflect(incident, normal).normalize();

        // The mirror sits inside the dome, so the far root is where the ray exits
        let (_, far) = self.dome.intersect(mirror_point, reflected)?;
        if far <= 0.0 {
            return None;
        }
        let dome_point = mirror_point + far * reflected;

        let view = (dome_point - self.viewer).try_normalize()?;

        Some(ReflectedRay {
            incident,
            mirror_point,
            normal,
            reflected,
            dome_point,
            view,
        })
    }

    /// Viewing direction for one projector ray.
    pub fn view(&self, incident: DVec3) -> PixelView {
        match self.trace(incident) {
            Some(ray) => PixelView::Valid(ray.view),
            None => PixelView::Invalid,
        }
    }
}

/// Directions from the projector's focal point through each pixel of its image plane.
///
/// The projector faces -y, so x is mirrored relative to the image-plane convention.
pub fn projector_pixel_directions(plane: &FlatDisplay) -> DirectionField {
    let flip = DVec3::new(-1.0, 1.0, 1.0);
    plane.directions().map(|d| *d * flip)
}

/// What the viewer sees for each projector pixel
#[derive(Debug, Clone, PartialEq)]
pub struct AnimalView {
    directions: DirectionField,
    mask: ValidityMask,
}

impl AnimalView {
    /// Trace every projector pixel.
    pub fn compute(solver: &MirrorSolver, projector_directions: &DirectionField) -> Self {
        let views: Grid<PixelView> = projector_directions.map(|d| solver.view(*d));
        Self::from_views(&views)
    }

    /// Split per-pixel results into a direction field and its mask.
    ///
    /// Invalid pixels hold a zero vector.
    pub fn from_views(views: &Grid<PixelView>) -> Self {
        let directions = views.map(|v| match v {
            PixelView::Valid(direction) => *direction,
            PixelView::Invalid => DVec3::ZERO,
        });
        let mask = views.map(|v| matches!(v, PixelView::Valid(_)));
        Self { directions, mask }
    }

    pub fn rows(&self) -> usize {
        self.directions.rows()
    }

    pub fn cols(&self) -> usize {
        self.directions.cols()
    }

    pub fn directions(&self) -> &DirectionField {
        &self.directions
    }

    pub fn mask(&self) -> &ValidityMask {
        &self.mask
    }

    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        self.mask.get(row, col).copied().unwrap_or(false)
    }

    /// Viewing direction of a valid pixel.
    pub fn direction(&self, row: usize, col: usize) -> Option<DVec3> {
        if self.is_valid(row, col) {
            self.directions.get(row, col).copied()
        } else {
            None
        }
    }

    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|v| **v).count()
    }

    pub fn valid_fraction(&self) -> f64 {
        if self.mask.is_empty() {
            0.0
        } else {
            self.valid_count() as f64 / self.mask.len() as f64
        }
    }
}
