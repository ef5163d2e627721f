//! Spherical geometry utilities
//!
//! Pure functions over [`GeoPoint`]s: great-circle densification, central
//! angles, spherical centroids and screen-space bounds under a trial projection.

use std::f64::consts::PI;

use bevy::math::{DVec2, DVec3};

use crate::core::coordinates::GeoPoint;
use crate::core::projection::Projection;

/// Number of segments in a densified great-circle path.
pub const PATH_SEGMENTS: usize = 50;

/// Ordered samples along a great-circle arc.
#[derive(Debug, Clone, PartialEq)]
pub struct PathGeometry(Vec<GeoPoint>);

impl PathGeometry {
    pub fn points(&self) -> &[GeoPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<GeoPoint> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<GeoPoint> {
        self.0.last().copied()
    }
}

/// Sample the shortest great-circle arc from `a` to `b` with spherical linear
/// interpolation, returning `PATH_SEGMENTS + 1` points.
///
/// The endpoints are returned exactly as given. Antipodal endpoints have no
/// unique shortest arc; one through the pole-facing perpendicular is chosen.
pub fn densify_great_circle(a: GeoPoint, b: GeoPoint) -> PathGeometry {
    let va = a.to_unit_vector();
    let vb = b.to_unit_vector();
    let omega = va.angle_between(vb);

    let mut points = Vec::with_capacity(PATH_SEGMENTS + 1);
    points.push(a);
    for i in 1..PATH_SEGMENTS {
        let t = i as f64 / PATH_SEGMENTS as f64;
        let v = if omega < 1e-12 {
            va
        } else if PI - omega < 1e-9 {
            let perp = any_perpendicular(va);
            va * (t * PI).cos() + perp * (t * PI).sin()
        } else {
            let sin_omega = omega.sin();
            va * (((1.0 - t) * omega).sin() / sin_omega) + vb * ((t * omega).sin() / sin_omega)
        };
        points.push(GeoPoint::from_vector(v).unwrap_or(a));
    }
    points.push(b);
    PathGeometry(points)
}

fn any_perpendicular(v: DVec3) -> DVec3 {
    let helper = if v.z.abs() < 0.9 { DVec3::Z } else { DVec3::X };
    let perp = helper - v * v.dot(helper);
    perp.normalize_or_zero()
}

/// Central angle between two points in radians (haversine form).
pub fn angular_distance(p: GeoPoint, q: GeoPoint) -> f64 {
    let phi1 = p.lat.to_radians();
    let phi2 = q.lat.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (q.lon - p.lon).to_radians();
    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * h.sqrt().clamp(0.0, 1.0).asin()
}

/// Spherical centroid: the normalized sum of unit vectors.
///
/// `None` for an empty set or when the vectors cancel out (e.g. an antipodal
/// pair), since no direction is meaningful then.
pub fn centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
    if points.is_empty() {
        return None;
    }
    let sum: DVec3 = points.iter().map(GeoPoint::to_unit_vector).sum();
    if sum.length() < 1e-9 * points.len() as f64 {
        return None;
    }
    GeoPoint::from_vector(sum)
}

/// Axis-aligned screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl ScreenBounds {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) / 2.0
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Zero extent along both axes.
    pub fn is_point(&self) -> bool {
        self.width() <= 0.0 && self.height() <= 0.0
    }

    fn include(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }
}

/// Screen bounds of `points` under `projection`, which is only read.
///
/// Points the projection cannot place (far side, poles) are left out; `None`
/// when none remain.
pub fn bounds_in_projection(points: &[GeoPoint], projection: &Projection) -> Option<ScreenBounds> {
    let mut projected = points.iter().filter_map(|&p| projection.project(p));
    let first = projected.next()?;
    let mut bounds = ScreenBounds {
        min: first,
        max: first,
    };
    for p in projected {
        bounds.include(p);
    }
    Some(bounds)
}
