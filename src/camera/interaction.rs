//! Pointer gestures: drag, wheel and pinch
//!
//! Each gesture mutates the [`ProjectionState`] synchronously. Globe drags
//! rotate, flat drags pan. Zooming in either mode keeps the geographic point
//! under the pointer fixed.

use bevy::math::DVec2;

use crate::camera::state::ProjectionState;
use crate::core::config::InteractionConfig;
use crate::core::coordinates::wrap_degrees;
use crate::core::projection::{ProjectionMode, Rotation};

/// A press that has not been released yet.
#[derive(Debug, Clone, Copy)]
struct PointerPress {
    start: DVec2,
    last: DVec2,
    dragged: bool,
}

/// Outcome of a pointer release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerRelease {
    /// Press and release without travelling past the click tolerance.
    Click(DVec2),
    /// The press turned into a drag.
    DragEnd,
    /// Release without a matching press.
    Stray,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    config: InteractionConfig,
    press: Option<PointerPress>,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            press: None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|p| p.dragged)
    }

    pub fn pointer_down(&mut self, pos: DVec2) {
        self.press = Some(PointerPress {
            start: pos,
            last: pos,
            dragged: false,
        });
    }

    /// Feed a pointer position. Returns `true` when the state was mutated by a
    /// drag.
    pub fn pointer_move(&mut self, pos: DVec2, state: &mut ProjectionState) -> bool {
        let Some(press) = self.press.as_mut() else {
            return false;
        };
        let delta = pos - press.last;
        press.last = pos;
        if press.start.distance(pos) > self.config.click_tolerance_px {
            press.dragged = true;
        }
        if delta == DVec2::ZERO {
            return false;
        }
        self.drag(delta, state);
        true
    }

    pub fn pointer_up(&mut self, pos: DVec2) -> PointerRelease {
        match self.press.take() {
            Some(press) if press.dragged || press.start.distance(pos) > self.config.click_tolerance_px => {
                PointerRelease::DragEnd
            }
            Some(_) => PointerRelease::Click(pos),
            None => PointerRelease::Stray,
        }
    }

    /// Abandon the current press (pointer left the surface).
    pub fn cancel(&mut self) {
        self.press = None;
    }

    /// Apply a drag delta: rotate the globe or pan the flat map.
    ///
    /// Globe sensitivity is divided by the current scale so the surface keeps
    /// pace with the pointer at every zoom level.
    pub fn drag(&self, delta: DVec2, state: &mut ProjectionState) {
        match state.mode() {
            ProjectionMode::Globe => {
                let rotation = state.projection().rotation();
                let k = self.config.drag_sensitivity / state.projection().scale();
                state.set_rotation(Rotation {
                    lambda: rotation.lambda + delta.x * k,
                    phi: rotation.phi - delta.y * k,
                    ..rotation
                });
            }
            ProjectionMode::Flat => {
                let zoom = state.zoom().translated(delta);
                state.set_zoom(zoom);
            }
        }
    }

    /// Wheel zoom anchored at `pos`; `delta_y` is in pixels, positive zooms out.
    pub fn wheel(&self, pos: DVec2, delta_y: f64, state: &mut ProjectionState) -> bool {
        let factor = 2f64.powf(-delta_y * self.config.wheel_factor);
        self.zoom_by(pos, factor, state)
    }

    /// Multiply the zoom by `factor`, anchored at `pos`. Returns `false` when the
    /// clamped result equals the current zoom.
    pub fn zoom_by(&self, pos: DVec2, factor: f64, state: &mut ProjectionState) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        match state.mode() {
            ProjectionMode::Globe => zoom_globe(pos, factor, state),
            ProjectionMode::Flat => {
                let zoom = state.zoom();
                let k = state.zoom_extent().clamp(zoom.k * factor);
                if k == zoom.k {
                    return false;
                }
                state.set_zoom(zoom.scaled_about(k, pos));
                true
            }
        }
    }
}

fn zoom_globe(pos: DVec2, factor: f64, state: &mut ProjectionState) -> bool {
    let current = state.projection().scale();
    let target = state.scale_extent().clamp(current * factor);
    if target == current {
        return false;
    }

    let anchor = state.projection().invert(pos);
    state.set_scale(target);

    // Off-disc pointer: plain zoom about the center.
    let Some(geo) = anchor else {
        return true;
    };
    let projection = state.projection();
    if let Some(rotation) = projection.rotation_placing(geo, pos) {
        state.set_rotation(rotation);
    } else if let Some(after) = projection.invert(pos) {
        // No exact solution (tilt would leave [-90, 90]): nudge by the drift.
        let rotation = projection.rotation();
        state.set_rotation(Rotation {
            lambda: rotation.lambda + wrap_degrees(after.lon - geo.lon),
            phi: rotation.phi + (after.lat - geo.lat),
            ..rotation
        });
    }
    true
}
