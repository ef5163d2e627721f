//! Zoom-to-fit camera transitions
//!
//! A selection change computes a target framing for the relevant point set and
//! tweens the live [`ProjectionState`] toward it. Only one transition runs at a
//! time; anything that supersedes it cancels it first.
//!
//! In globe mode the camera a selection sequence started from is kept as the
//! "previous view" and restored when the selection is cleared. Flat mode resets
//! to the baseline instead.

use bevy::log::{debug, warn};

use crate::camera::easing::{Tween, cubic_in_out};
use crate::camera::state::{GlobeCamera, ProjectionState};
use crate::camera::zoom::{SmoothZoom, ZoomTransform};
use crate::core::config::CameraConfig;
use crate::core::coordinates::{GeoPoint, wrap_degrees};
use crate::core::error::FitError;
use crate::core::geo::{bounds_in_projection, centroid};
use crate::core::projection::{Projection, ProjectionMode, Rotation};
use crate::core::view_state::{ScaleExtent, ViewBaseline, ViewportSize};
use crate::network::NodeId;

/// Camera parameters for one mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraParams {
    Globe(GlobeCamera),
    Flat(ZoomTransform),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Frame a selection.
    Fit,
    /// Return to the previous view (globe).
    Restore,
    /// Return to the baseline (flat).
    Reset,
}

/// The selection a fit was computed for. Equal signatures mean the camera is
/// already where it should be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitSignature {
    pub mode: ProjectionMode,
    pub origin: Option<NodeId>,
    pub destination: Option<NodeId>,
}

/// What to frame after a selection change.
#[derive(Debug, Clone, Copy)]
pub enum FitGoal<'a> {
    /// Nothing selected.
    Neutral,
    /// Frame these points.
    Frame(&'a [GeoPoint]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    /// Same signature as the last fit; nothing done.
    Unchanged,
    Started(TransitionKind),
    /// Rotation applied at once without a tween (degenerate extent).
    Snapped,
    /// Nothing to animate toward.
    Idle,
    /// Target could not be computed; the camera stays put.
    Skipped(FitError),
}

#[derive(Debug, Clone, Copy)]
enum TweenPath {
    Globe { from: GlobeCamera, to: GlobeCamera },
    Flat { path: SmoothZoom, to: ZoomTransform },
}

/// One in-flight camera animation.
#[derive(Debug, Clone, Copy)]
pub struct CameraTransition {
    kind: TransitionKind,
    tween: Tween,
    path: TweenPath,
}

impl CameraTransition {
    /// Globe tween. Spin takes the shorter way round.
    pub fn globe(kind: TransitionKind, from: GlobeCamera, to: GlobeCamera, tween: Tween) -> Self {
        let to = GlobeCamera {
            rotation: Rotation {
                lambda: from.rotation.lambda + wrap_degrees(to.rotation.lambda - from.rotation.lambda),
                ..to.rotation
            },
            ..to
        };
        Self {
            kind,
            tween,
            path: TweenPath::Globe { from, to },
        }
    }

    pub fn flat(
        kind: TransitionKind,
        from: ZoomTransform,
        to: ZoomTransform,
        viewport: ViewportSize,
        tween: Tween,
    ) -> Self {
        Self {
            kind,
            tween,
            path: TweenPath::Flat {
                path: SmoothZoom::new(from, to, viewport),
                to,
            },
        }
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn target(&self) -> CameraParams {
        match self.path {
            TweenPath::Globe { to, .. } => CameraParams::Globe(to),
            TweenPath::Flat { to, .. } => CameraParams::Flat(to),
        }
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.tween.is_finished(now)
    }

    /// Camera at `now`; exactly the target once finished.
    pub fn sample(&self, now: f64) -> CameraParams {
        if self.is_finished(now) {
            return self.target();
        }
        let t = cubic_in_out(self.tween.progress(now));
        match self.path {
            TweenPath::Globe { from, to } => {
                let lerp = |a: f64, b: f64| a + (b - a) * t;
                CameraParams::Globe(GlobeCamera {
                    rotation: Rotation::new(
                        lerp(from.rotation.lambda, to.rotation.lambda),
                        lerp(from.rotation.phi, to.rotation.phi),
                        lerp(from.rotation.gamma, to.rotation.gamma),
                    ),
                    scale: lerp(from.scale, to.scale),
                })
            }
            TweenPath::Flat { path, .. } => CameraParams::Flat(path.at(t)),
        }
    }
}

/// Rotation that centers the spherical centroid of `points`.
pub fn globe_fit_rotation(points: &[GeoPoint]) -> Result<Rotation, FitError> {
    if points.is_empty() {
        return Err(FitError::EmptyPointSet);
    }
    let center = centroid(points).ok_or(FitError::NonFinite)?;
    Ok(Rotation::new(-center.lon, -center.lat, 0.0))
}

/// Largest scale at which `points`, seen at `rotation`, fill at most `fill` of
/// the viewport; clamped to `extent`.
pub fn globe_fit_scale(
    points: &[GeoPoint],
    rotation: Rotation,
    viewport: ViewportSize,
    extent: ScaleExtent,
    fill: f64,
) -> Result<f64, FitError> {
    let trial = Projection::orthographic().with_rotation(rotation);
    let bounds = bounds_in_projection(points, &trial).ok_or(FitError::DegenerateBounds)?;
    if bounds.is_point() {
        return Err(FitError::DegenerateBounds);
    }
    let scale = fill / (bounds.width() / viewport.width).max(bounds.height() / viewport.height);
    if !scale.is_finite() {
        return Err(FitError::NonFinite);
    }
    Ok(extent.clamp(scale))
}

/// Pan/zoom transform that centers `points` as drawn by the flat baseline.
///
/// A single point (or coincident points) is centered at a fixed zoom.
pub fn flat_fit_target(
    points: &[GeoPoint],
    baseline: &ViewBaseline,
    viewport: ViewportSize,
    zoom_extent: ScaleExtent,
    config: &CameraConfig,
) -> Result<ZoomTransform, FitError> {
    if points.is_empty() {
        return Err(FitError::EmptyPointSet);
    }
    let base = baseline.projection(ProjectionMode::Flat);
    let bounds = bounds_in_projection(points, &base).ok_or(FitError::DegenerateBounds)?;
    let k = if bounds.is_point() {
        config.flat_single_point_zoom
    } else {
        config.flat_fill / (bounds.width() / viewport.width).max(bounds.height() / viewport.height)
    };
    let k = zoom_extent.clamp(k);
    let offset = viewport.center() - bounds.center() * k;
    let target = ZoomTransform::new(k, offset.x, offset.y);
    if !target.is_finite() {
        return Err(FitError::NonFinite);
    }
    Ok(target)
}

/// Owner of the active camera transition and the previous-view snapshot.
#[derive(Debug, Clone, Default)]
pub struct CameraTransitions {
    active: Option<CameraTransition>,
    previous_view: Option<GlobeCamera>,
    last_signature: Option<FitSignature>,
    started: u64,
}

impl CameraTransitions {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&CameraTransition> {
        self.active.as_ref()
    }

    pub fn previous_view(&self) -> Option<GlobeCamera> {
        self.previous_view
    }

    /// Number of transitions started so far.
    pub fn started(&self) -> u64 {
        self.started
    }

    /// Cancel the active transition. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Cancel and drop the snapshot, so a later clear does not restore a
    /// camera the user has since moved away from.
    pub fn interrupt(&mut self) {
        if self.cancel() {
            debug!("Camera transition interrupted");
        }
        self.previous_view = None;
    }

    /// Forget the last fitted selection so the next fit runs even if the
    /// selection is unchanged.
    pub fn invalidate(&mut self) {
        self.last_signature = None;
    }

    /// React to a selection change.
    pub fn on_selection(
        &mut self,
        signature: FitSignature,
        goal: FitGoal<'_>,
        state: &mut ProjectionState,
        config: &CameraConfig,
        now: f64,
    ) -> FitOutcome {
        if self.last_signature.as_ref() == Some(&signature) {
            return FitOutcome::Unchanged;
        }
        self.last_signature = Some(signature);
        let tween = Tween::new(now, config.transition_secs);

        let points = match goal {
            FitGoal::Neutral => {
                // The snapshot is read before the running transition is dropped.
                let snapshot = self.previous_view.take();
                self.cancel();
                return self.return_to_neutral(snapshot, state, tween);
            }
            FitGoal::Frame(points) => points,
        };

        if self.cancel() {
            debug!("Selection changed mid-transition; dropping previous view");
            self.previous_view = None;
        } else if self.previous_view.is_none() && state.mode() == ProjectionMode::Globe {
            self.previous_view = Some(state.globe_camera());
        }

        let outcome = match state.mode() {
            ProjectionMode::Globe => self.fit_globe(points, state, config, tween),
            ProjectionMode::Flat => self.fit_flat(points, state, config, tween),
        };
        if let FitOutcome::Skipped(err) = outcome {
            match err {
                FitError::EmptyPointSet => debug!("Nothing to frame for this selection"),
                err => warn!("Camera fit skipped: {err}"),
            }
        }
        outcome
    }

    fn return_to_neutral(
        &mut self,
        snapshot: Option<GlobeCamera>,
        state: &ProjectionState,
        tween: Tween,
    ) -> FitOutcome {
        match state.mode() {
            ProjectionMode::Globe => match snapshot {
                Some(view) if view != state.globe_camera() => {
                    self.start(CameraTransition::globe(TransitionKind::Restore, state.globe_camera(), view, tween))
                }
                _ => FitOutcome::Idle,
            },
            ProjectionMode::Flat => {
                if state.zoom() == ZoomTransform::IDENTITY {
                    return FitOutcome::Idle;
                }
                self.start(CameraTransition::flat(
                    TransitionKind::Reset,
                    state.zoom(),
                    ZoomTransform::IDENTITY,
                    state.viewport(),
                    tween,
                ))
            }
        }
    }

    fn fit_globe(
        &mut self,
        points: &[GeoPoint],
        state: &mut ProjectionState,
        config: &CameraConfig,
        tween: Tween,
    ) -> FitOutcome {
        let rotation = match globe_fit_rotation(points) {
            Ok(rotation) => rotation,
            Err(err) => return FitOutcome::Skipped(err),
        };
        match globe_fit_scale(points, rotation, state.viewport(), state.scale_extent(), config.globe_fill) {
            Ok(scale) => {
                debug!(
                    "Globe fit: center ({:.2}, {:.2}), scale {scale:.1}",
                    -rotation.lambda, -rotation.phi
                );
                let target = GlobeCamera { rotation, scale };
                self.start(CameraTransition::globe(TransitionKind::Fit, state.globe_camera(), target, tween))
            }
            Err(err) => {
                warn!("Globe fit kept current scale: {err}");
                let current = state.projection().rotation();
                state.set_rotation(Rotation {
                    lambda: current.lambda + wrap_degrees(rotation.lambda - current.lambda),
                    ..rotation
                });
                FitOutcome::Snapped
            }
        }
    }

    fn fit_flat(
        &mut self,
        points: &[GeoPoint],
        state: &ProjectionState,
        config: &CameraConfig,
        tween: Tween,
    ) -> FitOutcome {
        match flat_fit_target(points, state.baseline(), state.viewport(), state.zoom_extent(), config) {
            Ok(target) => {
                debug!("Flat fit: k {:.2}, offset ({:.1}, {:.1})", target.k, target.x, target.y);
                self.start(CameraTransition::flat(
                    TransitionKind::Fit,
                    state.zoom(),
                    target,
                    state.viewport(),
                    tween,
                ))
            }
            Err(err) => FitOutcome::Skipped(err),
        }
    }

    fn start(&mut self, transition: CameraTransition) -> FitOutcome {
        let kind = transition.kind();
        self.active = Some(transition);
        self.started += 1;
        debug!("Camera transition started: {kind:?}");
        FitOutcome::Started(kind)
    }

    /// Advance the active transition. Returns `true` when the state changed.
    pub fn tick(&mut self, now: f64, state: &mut ProjectionState) -> bool {
        let Some(transition) = self.active else {
            return false;
        };
        match transition.sample(now) {
            CameraParams::Globe(view) => state.set_globe_camera(view),
            CameraParams::Flat(zoom) => state.set_zoom(zoom),
        }
        if transition.is_finished(now) {
            self.active = None;
            if transition.kind() == TransitionKind::Restore {
                self.previous_view = None;
            }
            debug!("Camera transition finished: {:?}", transition.kind());
        }
        true
    }
}
