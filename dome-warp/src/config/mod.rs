//! Configuration and serialization module.
//!
//! Describes the physical layout of a dome display: the flat virtual screens the
//! source images are rendered for, the projector, the spherical mirror, the dome
//! and the viewer. All dome-space vectors are relative to the mirror center with
//! +x to the viewer's right, +y forward and +z up.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DomeError, Result};
use crate::warp::PixelLookup;

/// Complete dome display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomeConfig {
    /// Flat virtual screens supplying source images.
    pub screens: Vec<ScreenConfig>,
    /// Projector resolution and calibration images.
    pub projector: ProjectorConfig,
    /// Radius of the spherical mirror.
    pub mirror_radius: f64,
    /// Vector from the mirror center to the dome center.
    pub dome_center: [f64; 3],
    /// Radius of the dome.
    pub dome_radius: f64,
    /// Vector from the mirror center to the viewer's eyes.
    pub animal_position: [f64; 3],
    /// How continuous source coordinates are resolved to pixels when warping.
    #[serde(default)]
    pub pixel_lookup: PixelLookup,
}

impl Default for DomeConfig {
    fn default() -> Self {
        Self {
            screens: vec![
                ScreenConfig::with_yaw(-90.0),
                ScreenConfig::with_yaw(0.0),
                ScreenConfig::with_yaw(90.0),
            ],
            projector: ProjectorConfig::default(),
            mirror_radius: 0.215,
            dome_center: [0.0, 0.138, 0.309],
            dome_radius: 0.603,
            animal_position: [0.0, 0.06, 0.61],
            pixel_lookup: PixelLookup::default(),
        }
    }
}

/// Per-screen configuration for a virtual camera and its flat image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Physical screen height.
    pub height: f64,
    /// Physical screen width.
    pub width: f64,
    /// Distance from the virtual camera to the screen.
    pub distance: f64,
    /// Angle between the view direction and the horizontal plane, in degrees.
    pub pitch: f64,
    /// Angle in the horizontal plane between the view direction and +y, in degrees.
    pub yaw: f64,
    /// Rotation of the image about the view direction, in degrees.
    pub roll: f64,
    /// Image height in pixels.
    pub pixel_height: u32,
    /// Image width in pixels.
    pub pixel_width: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            height: 1.0,
            width: 1.4,
            distance: 0.5,
            pitch: 30.0,
            yaw: 0.0,
            roll: 0.0,
            pixel_height: 200,
            pixel_width: 280,
        }
    }
}

impl ScreenConfig {
    /// Default screen turned to the given yaw (degrees).
    pub fn with_yaw(yaw: f64) -> Self {
        Self {
            yaw,
            ..Default::default()
        }
    }
}

/// Screen parameters given as parallel lists, one entry per screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenLists {
    pub height: Vec<f64>,
    pub width: Vec<f64>,
    pub distance: Vec<f64>,
    pub pitch: Vec<f64>,
    pub yaw: Vec<f64>,
    pub roll: Vec<f64>,
    pub pixel_height: Vec<u32>,
    pub pixel_width: Vec<u32>,
}

impl ScreenLists {
    /// Zip the lists into per-screen configurations.
    pub fn into_screens(self) -> Result<Vec<ScreenConfig>> {
        let count = self.height.len();
        let lengths = [
            ("width", self.width.len()),
            ("distance", self.distance.len()),
            ("pitch", self.pitch.len()),
            ("yaw", self.yaw.len()),
            ("roll", self.roll.len()),
            ("pixel_height", self.pixel_height.len()),
            ("pixel_width", self.pixel_width.len()),
        ];
        for (name, len) in lengths {
            if len != count {
                return Err(DomeError::Configuration(format!(
                    "screen list '{}' has {} entries but 'height' has {}",
                    name, len, count
                )));
            }
        }

        Ok((0..count)
            .map(|i| ScreenConfig {
                height: self.height[i],
                width: self.width[i],
                distance: self.distance[i],
                pitch: self.pitch[i],
                yaw: self.yaw[i],
                roll: self.roll[i],
                pixel_height: self.pixel_height[i],
                pixel_width: self.pixel_width[i],
            })
            .collect())
    }
}

/// Projector configuration.
///
/// The calibration quads are the corners of the projected rectangle measured on
/// two planes of constant y between the projector and the mirror, listed
/// clockwise from the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectorConfig {
    /// Projector image height in pixels.
    pub pixel_height: u32,
    /// Projector image width in pixels.
    pub pixel_width: u32,
    /// Projected corners on the plane farther from the mirror.
    pub first_image: [[f64; 3]; 4],
    /// Projected corners on the plane nearer the mirror.
    pub second_image: [[f64; 3]; 4],
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            pixel_height: 720,
            pixel_width: 1280,
            first_image: [
                [-0.080, 0.436, 0.137],
                [0.080, 0.436, 0.137],
                [0.080, 0.436, 0.043],
                [-0.080, 0.436, 0.043],
            ],
            second_image: [
                [-0.115, 0.265, 0.186],
                [0.115, 0.265, 0.186],
                [0.115, 0.265, 0.054],
                [-0.115, 0.265, 0.054],
            ],
        }
    }
}

impl DomeConfig {
    /// Reference geometry with a different projector resolution.
    pub fn with_projector_resolution(pixel_height: u32, pixel_width: u32) -> Self {
        let mut config = Self::default();
        config.projector.pixel_height = pixel_height;
        config.projector.pixel_width = pixel_width;
        config
    }

    /// Check that the configuration describes a buildable geometry.
    pub fn validate(&self) -> Result<()> {
        if self.screens.is_empty() {
            return Err(DomeError::Configuration("at least one screen is required".into()));
        }

        for (i, screen) in self.screens.iter().enumerate() {
            for (name, value) in [
                ("height", screen.height),
                ("width", screen.width),
                ("distance", screen.distance),
            ] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(DomeError::Configuration(format!(
                        "screen {} {} must be positive, got {}",
                        i, name, value
                    )));
                }
            }
            if screen.pixel_height == 0 || screen.pixel_width == 0 {
                return Err(DomeError::Configuration(format!(
                    "screen {} has zero pixel resolution {}x{}",
                    i, screen.pixel_width, screen.pixel_height
                )));
            }
            if ![screen.pitch, screen.yaw, screen.roll].iter().all(|a| a.is_finite()) {
                return Err(DomeError::Configuration(format!(
                    "screen {} orientation is not finite",
                    i
                )));
            }
        }

        if self.projector.pixel_height == 0 || self.projector.pixel_width == 0 {
            return Err(DomeError::Configuration(format!(
                "projector has zero pixel resolution {}x{}",
                self.projector.pixel_width, self.projector.pixel_height
            )));
        }

        for (name, value) in [
            ("mirror_radius", self.mirror_radius),
            ("dome_radius", self.dome_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DomeError::Configuration(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let vectors = [self.dome_center, self.animal_position];
        let quads = self.projector.first_image.iter().chain(&self.projector.second_image);
        if !vectors.iter().chain(quads).flatten().all(|v| v.is_finite()) {
            return Err(DomeError::Configuration("geometry contains non-finite values".into()));
        }

        Ok(())
    }
}

/// Load a configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<DomeConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: DomeConfig = serde_json::from_str(&contents)
        .map_err(|e| DomeError::Serialization(e.to_string()))?;
    config.validate()?;
    log::info!("Loaded dome configuration from {:?}", path);
    Ok(config)
}

/// Save a configuration as pretty-printed JSON.
pub fn save_config(config: &DomeConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| DomeError::Serialization(e.to_string()))?;
    std::fs::write(path, json)?;
    log::info!("Saved dome configuration to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists(count: usize) -> ScreenLists {
        ScreenLists {
            height: vec![1.0; count],
            width: vec![1.4; count],
            distance: vec![0.5; count],
            pitch: vec![30.0; count],
            yaw: vec![0.0; count],
            roll: vec![0.0; count],
            pixel_height: vec![200; count],
            pixel_width: vec![280; count],
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = DomeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.screens.len(), 3);
        assert_eq!(config.screens[0].yaw, -90.0);
        assert_eq!(config.projector.pixel_width, 1280);
    }

    #[test]
    fn test_screen_lists_zip() {
        let screens = lists(3).into_screens().unwrap();
        assert_eq!(screens.len(), 3);
        assert_eq!(screens[2], ScreenConfig::default());
    }

    #[test]
    fn test_screen_lists_length_mismatch() {
        let mut l = lists(3);
        l.roll.pop();
        let err = l.into_screens().unwrap_err();
        assert!(matches!(err, DomeError::Configuration(ref msg) if msg.contains("roll")));
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let mut config = DomeConfig::default();
        config.mirror_radius = 0.0;
        assert!(matches!(config.validate(), Err(DomeError::Configuration(_))));

        let mut config = DomeConfig::default();
        config.dome_radius = -1.0;
        assert!(matches!(config.validate(), Err(DomeError::Configuration(_))));
    }

    #[test]
    fn test_rejects_zero_resolution() {
        let mut config = DomeConfig::default();
        config.screens[1].pixel_width = 0;
        assert!(config.validate().is_err());

        let config = DomeConfig::with_projector_resolution(0, 16);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let path = std::env::temp_dir().join(format!("dome-warp-config-{}.json", std::process::id()));
        let mut config = DomeConfig::with_projector_resolution(36, 64);
        config.pixel_lookup = PixelLookup::Round;

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_pixel_lookup_defaults_when_missing() {
        let mut value = serde_json::to_value(DomeConfig::default()).unwrap();
        value.as_object_mut().unwrap().remove("pixel_lookup");
        let config: DomeConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config.pixel_lookup, PixelLookup::Nearest);
    }
}
