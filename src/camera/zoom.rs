//! Flat-mode pan/zoom transform
//!
//! `k` scales distances from the screen origin and `(x, y)` is an additive pixel
//! offset. Composed with the flat baseline as
//! `scale = baseline.scale * k` and `translate = baseline.translate * k + (x, y)`,
//! so a point the baseline draws at `p` is drawn at `p * k + (x, y)`.

use std::f64::consts::SQRT_2;

use bevy::math::DVec2;

use crate::core::projection::{Projection, ProjectionMode};
use crate::core::view_state::{ScaleExtent, ViewBaseline, ViewportSize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub const fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.k.is_finite() && self.x.is_finite() && self.y.is_finite()
    }

    pub fn offset(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn apply(&self, p: DVec2) -> DVec2 {
        p * self.k + self.offset()
    }

    pub fn invert(&self, p: DVec2) -> DVec2 {
        (p - self.offset()) / self.k
    }

    pub fn translated(&self, delta: DVec2) -> Self {
        Self::new(self.k, self.x + delta.x, self.y + delta.y)
    }

    /// Rescale to `k`, keeping the content under `anchor` in place.
    pub fn scaled_about(&self, k: f64, anchor: DVec2) -> Self {
        let content = self.invert(anchor);
        let offset = anchor - content * k;
        Self::new(k, offset.x, offset.y)
    }

    /// Projection produced by this transform over the flat baseline.
    pub fn compose(&self, baseline: &ViewBaseline) -> Projection {
        Projection::new(ProjectionMode::Flat)
            .with_scale(baseline.scale * self.k)
            .with_translate(baseline.translate * self.k + self.offset())
    }
}

/// Bounds on `k` given the mode's absolute scale extent.
pub fn zoom_extent(baseline: &ViewBaseline, extent: ScaleExtent) -> ScaleExtent {
    ScaleExtent {
        min: extent.min / baseline.scale,
        max: extent.max / baseline.scale,
    }
}

/// Smooth zoom between two transforms along the van Wijk and Nuij optimal
/// path, viewed about the viewport center.
#[derive(Debug, Clone, Copy)]
pub struct SmoothZoom {
    center: DVec2,
    extent: f64,
    from: DVec2,
    to: DVec2,
    w0: f64,
    w1: f64,
    path: ZoomPath,
}

#[derive(Debug, Clone, Copy)]
enum ZoomPath {
    /// Pure zoom or negligible pan: log-linear width.
    Linear { s: f64 },
    Curved { r0: f64, s: f64, d1: f64 },
}

const RHO: f64 = SQRT_2;

impl SmoothZoom {
    pub fn new(a: ZoomTransform, b: ZoomTransform, viewport: ViewportSize) -> Self {
        let center = viewport.center();
        let extent = viewport.width.max(viewport.height);
        let from = a.invert(center);
        let to = b.invert(center);
        let w0 = extent / a.k;
        let w1 = extent / b.k;

        let rho2 = RHO * RHO;
        let rho4 = rho2 * rho2;
        let d2 = (to - from).length_squared();
        let path = if d2 < 1e-12 {
            ZoomPath::Linear {
                s: (w1 / w0).ln() / RHO,
            }
        } else {
            let d1 = d2.sqrt();
            let b0 = (w1 * w1 - w0 * w0 + rho4 * d2) / (2.0 * w0 * rho2 * d1);
            let b1 = (w1 * w1 - w0 * w0 - rho4 * d2) / (2.0 * w1 * rho2 * d1);
            let r0 = ((b0 * b0 + 1.0).sqrt() - b0).ln();
            let r1 = ((b1 * b1 + 1.0).sqrt() - b1).ln();
            ZoomPath::Curved {
                r0,
                s: (r1 - r0) / RHO,
                d1,
            }
        };

        Self {
            center,
            extent,
            from,
            to,
            w0,
            w1,
            path,
        }
    }

    /// Transform at path parameter `t` in `[0, 1]`.
    pub fn at(&self, t: f64) -> ZoomTransform {
        let delta = self.to - self.from;
        let (focus, width) = match self.path {
            ZoomPath::Linear { s } => (self.from + delta * t, self.w0 * (RHO * t * s).exp()),
            ZoomPath::Curved { r0, s, d1 } => {
                let rs = RHO * t * s + r0;
                let u = self.w0 / (RHO * RHO * d1) * (r0.cosh() * rs.tanh() - r0.sinh());
                (self.from + delta * u, self.w0 * r0.cosh() / rs.cosh())
            }
        };
        let width = if width.is_finite() && width > 0.0 {
            width
        } else {
            self.w1
        };
        let k = self.extent / width;
        let offset = self.center - focus * k;
        ZoomTransform::new(k, offset.x, offset.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn assert_close(a: ZoomTransform, b: ZoomTransform) {
        assert!((a.k - b.k).abs() < EPSILON, "{a:?} vs {b:?}");
        assert!((a.x - b.x).abs() < 1e-4, "{a:?} vs {b:?}");
        assert!((a.y - b.y).abs() < 1e-4, "{a:?} vs {b:?}");
    }

    #[test]
    fn test_scaled_about_keeps_anchor() {
        let t = ZoomTransform::new(2.0, 30.0, -10.0);
        let anchor = DVec2::new(120.0, 80.0);
        let content = t.invert(anchor);
        let zoomed = t.scaled_about(5.0, anchor);
        assert!((zoomed.apply(content) - anchor).length() < EPSILON);
    }

    #[test]
    fn test_compose_matches_apply() {
        let baseline = ViewBaseline {
            scale: 150.0,
            translate: DVec2::new(400.0, 300.0),
            rotation: Default::default(),
        };
        let t = ZoomTransform::new(3.0, -50.0, 20.0);
        let base = baseline.projection(ProjectionMode::Flat);
        let live = t.compose(&baseline);
        let p = crate::core::coordinates::GeoPoint::new(10.0, 20.0);
        let expected = t.apply(base.project(p).unwrap());
        assert!((live.project(p).unwrap() - expected).length() < EPSILON);
    }

    #[test]
    fn test_smooth_zoom_endpoints() {
        let viewport = ViewportSize::new(800.0, 600.0);
        let a = ZoomTransform::IDENTITY;
        let b = ZoomTransform::new(4.0, -900.0, -500.0);
        let path = SmoothZoom::new(a, b, viewport);
        assert_close(path.at(0.0), a);
        assert_close(path.at(1.0), b);
    }

    #[test]
    fn test_smooth_zoom_pure_zoom_is_monotonic() {
        let viewport = ViewportSize::new(800.0, 600.0);
        let a = ZoomTransform::IDENTITY;
        let b = ZoomTransform::IDENTITY.scaled_about(8.0, viewport.center());
        let path = SmoothZoom::new(a, b, viewport);
        let mut last = 0.0;
        for i in 0..=10 {
            let k = path.at(i as f64 / 10.0).k;
            assert!(k >= last);
            last = k;
        }
        assert_close(path.at(1.0), b);
    }

    #[test]
    fn test_zoom_extent_relative_to_baseline() {
        let baseline = ViewBaseline {
            scale: 200.0,
            translate: DVec2::ZERO,
            rotation: Default::default(),
        };
        let extent = zoom_extent(&baseline, ScaleExtent { min: 160.0, max: 3000.0 });
        assert!((extent.min - 0.8).abs() < EPSILON);
        assert!((extent.max - 15.0).abs() < EPSILON);
    }
}
