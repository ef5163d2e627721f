//! Per-mode baseline transforms fitted to the viewport
//!
//! A baseline is the camera a mode starts from: the globe sized to the shorter
//! viewport side, or the flat map fitted to the world geometry. Baselines are
//! recomputed whenever the viewport changes and define each mode's scale extent.

use std::f64::consts::PI;

use bevy::math::DVec2;

use crate::core::config::CameraConfig;
use crate::core::geo::bounds_in_projection;
use crate::core::projection::{Projection, ProjectionMode, Rotation};
use crate::network::WorldGeometry;

/// Viewport size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    /// Sizes below one pixel are raised to one.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// Closed scale interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleExtent {
    pub min: f64,
    pub max: f64,
}

impl ScaleExtent {
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }

    pub fn contains(&self, scale: f64) -> bool {
        (self.min..=self.max).contains(&scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBaseline {
    pub scale: f64,
    pub translate: DVec2,
    pub rotation: Rotation,
}

impl ViewBaseline {
    pub fn projection(&self, mode: ProjectionMode) -> Projection {
        Projection::new(mode)
            .with_scale(self.scale)
            .with_translate(self.translate)
            .with_rotation(self.rotation)
    }
}

#[derive(Debug, Clone)]
pub struct ViewStateStore {
    viewport: ViewportSize,
    globe: ViewBaseline,
    flat: ViewBaseline,
}

impl ViewStateStore {
    pub fn new(viewport: ViewportSize, world: &WorldGeometry, config: &CameraConfig) -> Self {
        Self {
            viewport,
            globe: fit_globe(viewport, config),
            flat: fit_flat(viewport, world, config),
        }
    }

    pub fn refit(&mut self, viewport: ViewportSize, world: &WorldGeometry, config: &CameraConfig) {
        *self = Self::new(viewport, world, config);
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn baseline(&self, mode: ProjectionMode) -> &ViewBaseline {
        match mode {
            ProjectionMode::Globe => &self.globe,
            ProjectionMode::Flat => &self.flat,
        }
    }

    /// Allowed projection scale for `mode`: the configured multiples of the
    /// baseline scale.
    pub fn scale_extent(&self, mode: ProjectionMode, config: &CameraConfig) -> ScaleExtent {
        let s0 = self.baseline(mode).scale;
        ScaleExtent {
            min: config.min_scale_factor * s0,
            max: config.max_scale_factor * s0,
        }
    }
}

fn fit_globe(viewport: ViewportSize, config: &CameraConfig) -> ViewBaseline {
    ViewBaseline {
        scale: viewport.min_side() / config.globe_scale_divisor,
        translate: viewport.center(),
        rotation: config.globe_initial_rotation,
    }
}

/// Fit the unit Mercator image of the world into the viewport, then apply the
/// configured initial zoom about the projection origin.
fn fit_flat(viewport: ViewportSize, world: &WorldGeometry, config: &CameraConfig) -> ViewBaseline {
    let points: Vec<_> = world.points().collect();
    let unit = Projection::mercator();
    let fitted = bounds_in_projection(&points, &unit)
        .filter(|b| b.is_finite() && b.width() > 0.0 && b.height() > 0.0)
        .map(|b| {
            let k = (viewport.width / b.width()).min(viewport.height / b.height());
            let translate = DVec2::new(
                (viewport.width - k * (b.min.x + b.max.x)) / 2.0,
                (viewport.height - k * (b.min.y + b.max.y)) / 2.0,
            );
            (k, translate)
        });
    let (scale, translate) =
        fitted.unwrap_or_else(|| (viewport.width / (2.0 * PI), viewport.center()));

    ViewBaseline {
        scale: scale * config.flat_initial_zoom,
        translate,
        rotation: Rotation::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coordinates::GeoPoint;

    const EPSILON: f64 = 1e-9;

    fn world() -> WorldGeometry {
        WorldGeometry::new(vec![vec![
            GeoPoint::new(-180.0, -60.0),
            GeoPoint::new(180.0, -60.0),
            GeoPoint::new(180.0, 75.0),
            GeoPoint::new(-180.0, 75.0),
            GeoPoint::new(-180.0, -60.0),
        ]])
    }

    #[test]
    fn test_globe_baseline() {
        let cfg = CameraConfig::default();
        let store = ViewStateStore::new(ViewportSize::new(800.0, 600.0), &world(), &cfg);
        let b = store.baseline(ProjectionMode::Globe);
        assert!((b.scale - 600.0 / 2.2).abs() < EPSILON);
        assert_eq!(b.translate, DVec2::new(400.0, 300.0));
        assert_eq!(b.rotation, Rotation::new(0.0, -30.0, 0.0));
    }

    #[test]
    fn test_flat_baseline_fits_world_before_zoom() {
        let mut cfg = CameraConfig::default();
        cfg.flat_initial_zoom = 1.0;
        let viewport = ViewportSize::new(800.0, 600.0);
        let store = ViewStateStore::new(viewport, &world(), &cfg);
        let proj = store.baseline(ProjectionMode::Flat).projection(ProjectionMode::Flat);

        let points: Vec<_> = world().points().collect();
        let b = bounds_in_projection(&points, &proj).unwrap();
        assert!(b.min.x >= -1e-6 && b.min.y >= -1e-6);
        assert!(b.max.x <= 800.0 + 1e-6 && b.max.y <= 600.0 + 1e-6);
        let touches_w = (b.width() - 800.0).abs() < 1e-6;
        let touches_h = (b.height() - 600.0).abs() < 1e-6;
        assert!(touches_w || touches_h);
        assert!((b.center() - viewport.center()).length() < 1e-6);
    }

    #[test]
    fn test_flat_baseline_without_world() {
        let cfg = CameraConfig::default();
        let store = ViewStateStore::new(ViewportSize::new(628.0, 400.0), &WorldGeometry::default(), &cfg);
        let b = store.baseline(ProjectionMode::Flat);
        assert!((b.scale - 628.0 / (2.0 * PI) * 1.5).abs() < EPSILON);
        assert_eq!(b.translate, DVec2::new(314.0, 200.0));
    }

    #[test]
    fn test_scale_extent_tracks_baseline() {
        let cfg = CameraConfig::default();
        let mut store = ViewStateStore::new(ViewportSize::new(440.0, 440.0), &world(), &cfg);
        let extent = store.scale_extent(ProjectionMode::Globe, &cfg);
        assert!((extent.min - 160.0).abs() < EPSILON);
        assert!((extent.max - 3000.0).abs() < EPSILON);

        store.refit(ViewportSize::new(220.0, 880.0), &world(), &cfg);
        let extent = store.scale_extent(ProjectionMode::Globe, &cfg);
        assert!((extent.min - 80.0).abs() < EPSILON);
    }

    #[test]
    fn test_viewport_is_at_least_one_pixel() {
        let v = ViewportSize::new(0.0, -5.0);
        assert_eq!(v.width, 1.0);
        assert_eq!(v.height, 1.0);
    }
}
