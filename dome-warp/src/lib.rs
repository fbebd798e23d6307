//! Dome Warp Library
//!
//! Pixel remapping for dome displays lit by a single projector through a
//! spherical mirror. Given the physical layout of the projector, mirror, dome
//! and viewer, it works out which source-screen pixels each projector pixel
//! should show, then warps frames of flat images into projector images.

pub mod config;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod warp;

// Re-export commonly used types
pub use config::{
    load_config, save_config, DomeConfig, ProjectorConfig, ScreenConfig, ScreenLists,
};
pub use error::{DomeError, Result};
pub use geometry::{DirectionField, FlatDisplay, Grid, ValidityMask};
pub use projection::{
    AnimalView, ContributingPixels, DomeProjection, FieldOfView, FieldsOfView, SearchCursor,
    SourcePixel,
};
pub use warp::{PixelLookup, Warper};
