//! Engine configuration
//!
//! Every tunable lives here with defaults matching the reference look and feel.
//! Files are JSON; any omitted field keeps its default.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bevy::log::{info, warn};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::core::projection::Rotation;

/// Straight (non-premultiplied) sRGB color with alpha, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb8(0, 0, 0);

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 1.0)
    }

    pub const fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        Rgba {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }
}

/// Fill and radius of a node marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub fill: Rgba,
    pub radius: f32,
}

/// Color and width of a path stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Rgba,
    pub width: f32,
}

impl StrokeStyle {
    pub fn lerp(self, other: StrokeStyle, t: f32) -> StrokeStyle {
        StrokeStyle {
            color: self.color.lerp(other.color, t),
            width: self.width + (other.width - self.width) * t,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub interaction: InteractionConfig,
    pub camera: CameraConfig,
    pub markers: MarkerStyleConfig,
    pub edges: EdgeStyleConfig,
    pub map: MapStyleConfig,
    /// Directory holding `world.json`, `nodes.json` and `edges.json`.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Degrees of globe rotation per pixel of drag, multiplied by `1 / scale`.
    pub drag_sensitivity: f64,
    /// Exponent per wheel pixel: `scale * 2^(-delta_y * wheel_factor)`.
    pub wheel_factor: f64,
    /// Pixels per wheel "line" for devices that report lines.
    pub wheel_line_pixels: f64,
    /// Pointer travel below which a press/release counts as a click.
    pub click_tolerance_px: f64,
    /// Radius of the clickable/hoverable area around a node.
    pub hit_radius_px: f64,
    /// Vertical offset of the tooltip anchor above the node.
    pub tooltip_offset_px: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: 75.0,
            wheel_factor: 0.002,
            wheel_line_pixels: 50.0,
            click_tolerance_px: 3.0,
            hit_radius_px: 10.0,
            tooltip_offset_px: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Globe baseline scale is `min(width, height) / globe_scale_divisor`.
    pub globe_scale_divisor: f64,
    pub globe_initial_rotation: Rotation,
    /// Scale extent as multiples of the mode's baseline scale.
    pub min_scale_factor: f64,
    pub max_scale_factor: f64,
    /// Extra zoom applied after fitting the flat map to the world.
    pub flat_initial_zoom: f64,
    /// Fraction of the viewport a fitted point set may fill.
    pub globe_fill: f64,
    pub flat_fill: f64,
    /// Zoom used to center a single point in flat mode.
    pub flat_single_point_zoom: f64,
    pub transition_secs: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            globe_scale_divisor: 2.2,
            globe_initial_rotation: Rotation::new(0.0, -30.0, 0.0),
            min_scale_factor: 0.8,
            max_scale_factor: 15.0,
            flat_initial_zoom: 1.5,
            globe_fill: 0.8,
            flat_fill: 0.9,
            flat_single_point_zoom: 4.0,
            transition_secs: 1.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyleConfig {
    pub default: MarkerStyle,
    pub candidate: MarkerStyle,
    pub destination: MarkerStyle,
    pub origin: MarkerStyle,
    pub hover_ring: StrokeStyle,
}

impl Default for MarkerStyleConfig {
    fn default() -> Self {
        Self {
            default: MarkerStyle {
                fill: Rgba::rgb8(0xfb, 0xbf, 0x24),
                radius: 2.5,
            },
            candidate: MarkerStyle {
                fill: Rgba::rgb8(0xfc, 0xd3, 0x4d),
                radius: 4.0,
            },
            destination: MarkerStyle {
                fill: Rgba::rgb8(0x8b, 0x5c, 0xf6),
                radius: 6.0,
            },
            origin: MarkerStyle {
                fill: Rgba::rgb8(0xec, 0x48, 0x99),
                radius: 7.0,
            },
            hover_ring: StrokeStyle {
                color: Rgba::BLACK,
                width: 1.5,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeStyleConfig {
    pub resting: StrokeStyle,
    pub emphasized: StrokeStyle,
    pub draw_in_secs: f64,
    /// Duration of each direction of the pulse.
    pub pulse_half_cycle_secs: f64,
    pub depulse_secs: f64,
    pub fade_out_secs: f64,
    /// Paths shorter than this on screen appear without a draw-in.
    pub min_draw_in_length_px: f64,
}

impl Default for EdgeStyleConfig {
    fn default() -> Self {
        Self {
            resting: StrokeStyle {
                color: Rgba::rgba8(59, 130, 246, 0.7),
                width: 1.5,
            },
            emphasized: StrokeStyle {
                color: Rgba::rgba8(37, 99, 235, 1.0),
                width: 3.0,
            },
            draw_in_secs: 1.0,
            pulse_half_cycle_secs: 1.2,
            depulse_secs: 0.3,
            fade_out_secs: 0.3,
            min_draw_in_length_px: 1.0,
        }
    }
}

/// Backdrop and country outline colors. Country rings are stroked only;
/// land reads as the ocean fill showing between outlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStyleConfig {
    pub ocean_fill: Rgba,
    pub ocean_stroke: StrokeStyle,
    pub land_stroke: StrokeStyle,
}

impl Default for MapStyleConfig {
    fn default() -> Self {
        Self {
            ocean_fill: Rgba::rgb8(0xa2, 0xd4, 0xf5),
            ocean_stroke: StrokeStyle {
                color: Rgba::rgb8(0x60, 0xa5, 0xfa),
                width: 0.5,
            },
            land_stroke: StrokeStyle {
                color: Rgba::rgb8(0xa8, 0xa2, 0x9e),
                width: 0.5,
            },
        }
    }
}

impl GlobeConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Platform config location:
    /// - macOS: ~/Library/Application Support/routeglobe/config.json
    /// - Linux: ~/.config/routeglobe/config.json
    /// - Windows: %APPDATA%\routeglobe\config\config.json
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "routeglobe").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load from the platform location, falling back to defaults.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            info!("No config directory available; using default globe config");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded globe config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring globe config: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_file(test_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "routeglobe-config-{}-{}-{}.json",
            test_name,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = unique_temp_file("partial");
        fs::write(&path, r#"{ "interaction": { "drag_sensitivity": 40.0 } }"#).unwrap();

        let config = GlobeConfig::load(&path).unwrap();
        assert_eq!(config.interaction.drag_sensitivity, 40.0);
        assert_eq!(config.interaction.wheel_factor, 0.002);
        assert_eq!(config.camera.transition_secs, 1.25);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let path = unique_temp_file("invalid");
        fs::write(&path, "not json").unwrap();
        assert!(GlobeConfig::load(&path).is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = unique_temp_file("missing");
        assert!(GlobeConfig::load(&path).is_err());
    }

    #[test]
    fn test_marker_radii_ordering() {
        let m = MarkerStyleConfig::default();
        assert!(m.default.radius < m.candidate.radius);
        assert!(m.candidate.radius < m.destination.radius);
        assert!(m.destination.radius < m.origin.radius);
    }

    #[test]
    fn test_stroke_lerp_endpoints() {
        let e = EdgeStyleConfig::default();
        assert_eq!(e.resting.lerp(e.emphasized, 0.0), e.resting);
        let end = e.resting.lerp(e.emphasized, 1.0);
        assert!((end.width - e.emphasized.width).abs() < 1e-6);
        assert!((end.color.a - e.emphasized.color.a).abs() < 1e-6);
    }
}
