//! Map projections: orthographic globe and flat Mercator
//!
//! Both variants share one contract: forward and inverse transforms plus
//! rotation, scale and translate parameters. Screen space has its origin at the
//! top-left corner with y growing downwards.
//!
//! Rotation follows the usual spherical rotation order: spin by `lambda` about
//! the polar axis, then tilt by `phi`, then roll by `gamma`. The point at
//! `(-lambda, -phi)` lands at the projection center. The flat variant ignores
//! rotation.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use bevy::math::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::core::coordinates::{GeoPoint, wrap_degrees};

/// Which projection family is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Orthographic sphere ("3D").
    #[default]
    Globe,
    /// Mercator ("2D").
    Flat,
}

impl ProjectionMode {
    pub fn toggled(self) -> Self {
        match self {
            ProjectionMode::Globe => ProjectionMode::Flat,
            ProjectionMode::Flat => ProjectionMode::Globe,
        }
    }
}

/// Rotation triple in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub lambda: f64,
    pub phi: f64,
    pub gamma: f64,
}

impl Rotation {
    pub const fn new(lambda: f64, phi: f64, gamma: f64) -> Self {
        Self { lambda, phi, gamma }
    }

    pub fn is_finite(&self) -> bool {
        self.lambda.is_finite() && self.phi.is_finite() && self.gamma.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    mode: ProjectionMode,
    rotation: Rotation,
    scale: f64,
    translate: DVec2,
}

impl Projection {
    /// Unit-scale orthographic projection centered at the screen origin.
    pub fn orthographic() -> Self {
        Self::new(ProjectionMode::Globe)
    }

    /// Unit-scale Mercator projection centered at the screen origin.
    pub fn mercator() -> Self {
        Self::new(ProjectionMode::Flat)
    }

    pub fn new(mode: ProjectionMode) -> Self {
        Self {
            mode,
            rotation: Rotation::default(),
            scale: 1.0,
            translate: DVec2::ZERO,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_translate(mut self, translate: DVec2) -> Self {
        self.translate = translate;
        self
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn translate(&self) -> DVec2 {
        self.translate
    }

    pub fn set_translate(&mut self, translate: DVec2) {
        self.translate = translate;
    }

    /// Geographic point at the center of the view (globe mode).
    pub fn sub_camera_point(&self) -> GeoPoint {
        GeoPoint::new(-self.rotation.lambda, -self.rotation.phi)
    }

    /// Forward transform. `None` when the point is occluded (globe far side)
    /// or has no finite image (Mercator at the poles).
    pub fn project(&self, p: GeoPoint) -> Option<DVec2> {
        let raw = match self.mode {
            ProjectionMode::Globe => {
                let v = self.to_view(p);
                if v.x < -1e-12 {
                    return None;
                }
                DVec2::new(v.y, -v.z)
            }
            ProjectionMode::Flat => {
                let lat = p.lat.to_radians();
                let y = (FRAC_PI_4 + lat / 2.0).tan().ln();
                DVec2::new(p.lon.to_radians(), -y)
            }
        };
        let screen = self.translate + raw * self.scale;
        screen.is_finite().then_some(screen)
    }

    /// Inverse transform. `None` when the screen point has no geographic
    /// counterpart (outside the globe disc, or off the flat map).
    pub fn invert(&self, screen: DVec2) -> Option<GeoPoint> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return None;
        }
        let a = (screen.x - self.translate.x) / self.scale;
        let b = (self.translate.y - screen.y) / self.scale;
        match self.mode {
            ProjectionMode::Globe => {
                let r2 = a * a + b * b;
                if !r2.is_finite() || r2 > 1.0 + 1e-12 {
                    return None;
                }
                let x = (1.0 - r2).max(0.0).sqrt();
                self.from_view(DVec3::new(x, a, b))
            }
            ProjectionMode::Flat => {
                let lon = a.to_degrees();
                let lat = (2.0 * b.exp().atan() - FRAC_PI_2).to_degrees();
                let p = GeoPoint::new(lon, lat);
                (p.is_finite() && lon.abs() <= 180.0).then_some(p)
            }
        }
    }

    /// Solve for the globe rotation that maps `geo` onto `screen` at the current
    /// scale and translate, keeping roll fixed at zero.
    ///
    /// Of the two geometric solutions the one closest to the current rotation
    /// is returned. `None` when no solution keeps tilt within `[-90, 90]` or the
    /// screen point lies off the disc.
    pub fn rotation_placing(&self, geo: GeoPoint, screen: DVec2) -> Option<Rotation> {
        if self.mode != ProjectionMode::Globe || self.rotation.gamma.abs() > 1e-12 {
            return None;
        }
        let a = (screen.x - self.translate.x) / self.scale;
        let b = (self.translate.y - screen.y) / self.scale;
        if !(a * a + b * b <= 1.0) {
            return None;
        }

        let lat0 = geo.lat.to_radians();
        let lon0 = geo.lon.to_radians();
        let (sin_lat, cos_lat) = lat0.sin_cos();
        if cos_lat < 1e-12 {
            return None;
        }
        let q = a / cos_lat;
        if q.abs() > 1.0 {
            return None;
        }
        let theta = q.asin();

        let current = self.rotation;
        let mut best: Option<(f64, Rotation)> = None;
        for theta in [theta, PI - theta] {
            let x = cos_lat * theta.cos();
            let r = x.hypot(sin_lat);
            if r < 1e-12 || b.abs() > r + 1e-12 {
                continue;
            }
            let beta = sin_lat.atan2(x);
            let mut phi = (b / r).clamp(-1.0, 1.0).asin() - beta;
            if phi > PI {
                phi -= 2.0 * PI;
            } else if phi < -PI {
                phi += 2.0 * PI;
            }
            if phi.abs() > FRAC_PI_2 + 1e-12 {
                continue;
            }
            let lambda = (theta - lon0).to_degrees();
            let lambda = current.lambda + wrap_degrees(lambda - current.lambda);
            let phi = phi.to_degrees().clamp(-90.0, 90.0);
            let cost = (lambda - current.lambda).abs() + (phi - current.phi).abs();
            if best.is_none_or(|(c, _)| cost < c) {
                best = Some((cost, Rotation::new(lambda, phi, 0.0)));
            }
        }
        best.map(|(_, r)| r)
    }

    /// Project a polyline into continuous screen runs.
    ///
    /// A run breaks at occluded or unprojectable samples, and in flat mode
    /// where consecutive samples jump across the antimeridian.
    pub fn project_polyline(&self, points: &[GeoPoint]) -> Vec<Vec<DVec2>> {
        let mut runs = Vec::new();
        let mut current: Vec<DVec2> = Vec::new();
        let mut prev: Option<GeoPoint> = None;
        for &p in points {
            let crosses_seam = self.mode == ProjectionMode::Flat
                && prev.is_some_and(|q| (p.lon - q.lon).abs() > 180.0);
            match self.project(p) {
                Some(screen) if !crosses_seam => current.push(screen),
                Some(screen) => {
                    flush_run(&mut runs, &mut current);
                    current.push(screen);
                }
                None => flush_run(&mut runs, &mut current),
            }
            prev = Some(p);
        }
        flush_run(&mut runs, &mut current);
        runs
    }

    fn to_view(&self, p: GeoPoint) -> DVec3 {
        let spun = GeoPoint::new(p.lon + self.rotation.lambda, p.lat).to_unit_vector();
        let (sin_phi, cos_phi) = self.rotation.phi.to_radians().sin_cos();
        let (sin_gamma, cos_gamma) = self.rotation.gamma.to_radians().sin_cos();
        let x = spun.x * cos_phi - spun.z * sin_phi;
        let k = spun.z * cos_phi + spun.x * sin_phi;
        let y = spun.y * cos_gamma - k * sin_gamma;
        let z = k * cos_gamma + spun.y * sin_gamma;
        DVec3::new(x, y, z)
    }

    fn from_view(&self, v: DVec3) -> Option<GeoPoint> {
        let (sin_phi, cos_phi) = self.rotation.phi.to_radians().sin_cos();
        let (sin_gamma, cos_gamma) = self.rotation.gamma.to_radians().sin_cos();
        let y = v.y * cos_gamma + v.z * sin_gamma;
        let k = v.z * cos_gamma - v.y * sin_gamma;
        let x = v.x * cos_phi + k * sin_phi;
        let z = k * cos_phi - v.x * sin_phi;
        let spun = GeoPoint::from_vector(DVec3::new(x, y, z))?;
        Some(GeoPoint::new(
            wrap_degrees(spun.lon - self.rotation.lambda),
            spun.lat,
        ))
    }
}

fn flush_run(runs: &mut Vec<Vec<DVec2>>, current: &mut Vec<DVec2>) {
    if current.len() >= 2 {
        runs.push(std::mem::take(current));
    } else {
        current.clear();
    }
}
