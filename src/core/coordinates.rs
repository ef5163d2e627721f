//! Geographic coordinates and unit-sphere conversions
//!
//! Longitudes and latitudes are carried in decimal degrees. Vector math runs in
//! f64 on the unit sphere with the axes used by the projections:
//! - x: towards (lon 0, lat 0)
//! - y: towards (lon 90, lat 0)
//! - z: towards the north pole

use bevy::math::DVec3;
use serde::{Deserialize, Serialize};

use crate::core::error::GeoError;

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    /// Construct without validation. Use for values already known to be in range.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Construct from untrusted degrees, rejecting out-of-range values.
    pub fn from_degrees(lon: f64, lat: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidLatitude(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GeoError::InvalidLongitude(lon));
        }
        Ok(Self { lon, lat })
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Unit vector on the sphere.
    pub fn to_unit_vector(&self) -> DVec3 {
        let lon = self.lon.to_radians();
        let lat = self.lat.to_radians();
        let mut r = lat.cos();
        // Clamp residual radius at the poles so longitude has no effect there
        if (std::f64::consts::FRAC_PI_2 - lat.abs()).abs() < 1e-12 {
            r = 0.0;
        }
        DVec3::new(r * lon.cos(), r * lon.sin(), lat.sin())
    }

    /// Geographic point of a (not necessarily unit) direction vector.
    ///
    /// Returns `None` for a zero or non-finite vector.
    pub fn from_vector(v: DVec3) -> Option<Self> {
        let len = v.length();
        if !len.is_finite() || len < 1e-12 {
            return None;
        }
        let n = v / len;
        let lat = n.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = n.y.atan2(n.x).to_degrees();
        Some(Self { lon, lat })
    }

    /// Exact bit pattern of the pair, for use as a hash key.
    pub fn key(&self) -> (u64, u64) {
        (self.lon.to_bits(), self.lat.to_bits())
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self { lon, lat }
    }
}

/// Wrap an angle in degrees into `[-180, 180)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped.is_finite() { wrapped } else { angle }
}
