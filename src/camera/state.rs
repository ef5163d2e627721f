//! Live projection state
//!
//! The single owned value every gesture and transition tick writes through.
//! Setters enforce the scale extent and tilt bounds and ignore non-finite
//! input.

use crate::camera::zoom::{ZoomTransform, zoom_extent};
use crate::core::config::CameraConfig;
use crate::core::projection::{Projection, ProjectionMode, Rotation};
use crate::core::view_state::{ScaleExtent, ViewBaseline, ViewStateStore, ViewportSize};

/// Rotation and scale of the globe camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobeCamera {
    pub rotation: Rotation,
    pub scale: f64,
}

#[derive(Debug, Clone)]
pub struct ProjectionState {
    projection: Projection,
    baseline: ViewBaseline,
    extent: ScaleExtent,
    viewport: ViewportSize,
    zoom: ZoomTransform,
}

impl ProjectionState {
    /// Fresh state for `mode` at its baseline.
    pub fn activate(mode: ProjectionMode, store: &ViewStateStore, config: &CameraConfig) -> Self {
        let baseline = *store.baseline(mode);
        Self {
            projection: baseline.projection(mode),
            baseline,
            extent: store.scale_extent(mode, config),
            viewport: store.viewport(),
            zoom: ZoomTransform::IDENTITY,
        }
    }

    pub fn mode(&self) -> ProjectionMode {
        self.projection.mode()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn baseline(&self) -> &ViewBaseline {
        &self.baseline
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn scale_extent(&self) -> ScaleExtent {
        self.extent
    }

    /// Bounds on the flat pan/zoom factor.
    pub fn zoom_extent(&self) -> ScaleExtent {
        zoom_extent(&self.baseline, self.extent)
    }

    pub fn zoom(&self) -> ZoomTransform {
        self.zoom
    }

    pub fn globe_camera(&self) -> GlobeCamera {
        GlobeCamera {
            rotation: self.projection.rotation(),
            scale: self.projection.scale(),
        }
    }

    /// Set the globe rotation, clamping tilt to `[-90, 90]`. Spin is unbounded.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        if !rotation.is_finite() {
            return;
        }
        let rotation = Rotation {
            phi: rotation.phi.clamp(-90.0, 90.0),
            ..rotation
        };
        self.projection.set_rotation(rotation);
    }

    /// Set the projection scale, clamped to the extent.
    pub fn set_scale(&mut self, scale: f64) {
        if !scale.is_finite() {
            return;
        }
        self.projection.set_scale(self.extent.clamp(scale));
    }

    pub fn set_globe_camera(&mut self, view: GlobeCamera) {
        self.set_rotation(view.rotation);
        self.set_scale(view.scale);
    }

    /// Set the flat pan/zoom transform, clamping `k` to the zoom extent.
    pub fn set_zoom(&mut self, zoom: ZoomTransform) {
        if self.mode() != ProjectionMode::Flat || !zoom.is_finite() {
            return;
        }
        let bounds = self.zoom_extent();
        let k = bounds.clamp(zoom.k);
        let zoom = if k == zoom.k {
            zoom
        } else {
            // Keep whatever sits at the viewport center in place.
            zoom.scaled_about(k, self.viewport.center())
        };
        self.zoom = zoom;
        self.projection = zoom.compose(&self.baseline);
    }
}
