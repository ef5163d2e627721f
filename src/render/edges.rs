//! Keyed edge scene
//!
//! Edges are keyed by their endpoint coordinates. Each reconcile diffs the new
//! key set against the live one:
//! - appear: densify (or reuse) the path and play the draw-in
//! - persist: only the pulse/rest style is updated
//! - disappear: fade out, then drop on a later tick
//!
//! The pulse is a looping tween with a cancel flag. Flipping the flag makes the
//! next tick swap the loop for a short ease back to the resting style, starting
//! from wherever the pulse was.

use std::collections::HashSet;

use bevy::math::DVec2;

use crate::camera::easing::{Tween, cubic_in_out, sin_in_out};
use crate::core::config::{EdgeStyleConfig, StrokeStyle};
use crate::core::coordinates::GeoPoint;
use crate::core::geo::{PathGeometry, densify_great_circle};
use crate::core::projection::Projection;

/// Identity of an edge path: exact endpoint coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    from: (u64, u64),
    to: (u64, u64),
}

impl EdgeKey {
    pub fn new(from: GeoPoint, to: GeoPoint) -> Self {
        Self {
            from: from.key(),
            to: to.key(),
        }
    }
}

/// An edge that should be in scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSpec {
    pub from: GeoPoint,
    pub to: GeoPoint,
}

impl EdgeSpec {
    pub fn new(from: GeoPoint, to: GeoPoint) -> Self {
        Self { from, to }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.from, self.to)
    }
}

/// Perpetual rest/emphasis oscillation.
#[derive(Debug, Clone, Copy)]
struct PulseLoop {
    start: f64,
    half_cycle: f64,
    cancelled: bool,
}

impl PulseLoop {
    fn style(&self, config: &EdgeStyleConfig, now: f64) -> StrokeStyle {
        if self.half_cycle <= 0.0 {
            return config.resting;
        }
        let phase = ((now - self.start).max(0.0) / self.half_cycle) % 2.0;
        if phase <= 1.0 {
            config.resting.lerp(config.emphasized, sin_in_out(phase) as f32)
        } else {
            config.emphasized.lerp(config.resting, sin_in_out(phase - 1.0) as f32)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum EdgeStyleAnim {
    Resting,
    Pulsing(PulseLoop),
    Easing { from: StrokeStyle, tween: Tween },
}

#[derive(Debug, Clone)]
struct EdgeEntry {
    key: EdgeKey,
    geometry: PathGeometry,
    /// Draw-in; `None` once fully drawn.
    reveal: Option<Tween>,
    style: EdgeStyleAnim,
    /// Fade-out; `Some` once the edge left scope.
    leaving: Option<Tween>,
}

impl EdgeEntry {
    fn is_pulsing(&self) -> bool {
        matches!(self.style, EdgeStyleAnim::Pulsing(p) if !p.cancelled)
    }

    fn is_easing(&self) -> bool {
        matches!(self.style, EdgeStyleAnim::Easing { .. })
    }

    fn cancel_pulse(&mut self) {
        if let EdgeStyleAnim::Pulsing(pulse) = &mut self.style {
            pulse.cancelled = true;
        }
    }

    fn style_at(&self, config: &EdgeStyleConfig, now: f64) -> StrokeStyle {
        match self.style {
            EdgeStyleAnim::Resting => config.resting,
            EdgeStyleAnim::Pulsing(pulse) => pulse.style(config, now),
            EdgeStyleAnim::Easing { from, tween } => {
                from.lerp(config.resting, cubic_in_out(tween.progress(now)) as f32)
            }
        }
    }

    fn reveal_at(&self, now: f64) -> f64 {
        self.reveal
            .map_or(1.0, |tween| cubic_in_out(tween.progress(now)))
    }

    fn opacity_at(&self, now: f64) -> f32 {
        self.leaving
            .map_or(1.0, |tween| 1.0 - cubic_in_out(tween.progress(now)) as f32)
    }
}

/// A drawable edge for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSprite {
    pub key: EdgeKey,
    /// Continuous screen runs, already truncated by the draw-in.
    pub runs: Vec<Vec<DVec2>>,
    pub style: StrokeStyle,
    pub opacity: f32,
    pub pulsing: bool,
    /// Easing back to rest after a cancelled pulse; the width still moves.
    pub easing: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EdgeScene {
    config: EdgeStyleConfig,
    entries: Vec<EdgeEntry>,
}

impl EdgeScene {
    pub fn new(config: EdgeStyleConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
        }
    }

    /// Diff `specs` against the live entries. `selected` is the key of the one
    /// path that should pulse, if any.
    pub fn reconcile(
        &mut self,
        specs: &[EdgeSpec],
        selected: Option<EdgeKey>,
        projection: &Projection,
        now: f64,
    ) {
        let mut wanted = HashSet::with_capacity(specs.len());
        let specs: Vec<EdgeSpec> = specs.iter().copied().filter(|s| wanted.insert(s.key())).collect();

        let fade = self.config.fade_out_secs;
        for entry in &mut self.entries {
            if entry.leaving.is_none() && !wanted.contains(&entry.key) {
                entry.leaving = Some(Tween::new(now, fade));
                entry.cancel_pulse();
            }
        }

        for spec in specs {
            let key = spec.key();
            let live = self
                .entries
                .iter()
                .position(|e| e.key == key && e.leaving.is_none());
            let index = match live {
                Some(index) => index,
                None => self.enter(spec, projection, now),
            };
            let entry = &mut self.entries[index];
            if selected == Some(key) {
                if !entry.is_pulsing() {
                    entry.style = EdgeStyleAnim::Pulsing(PulseLoop {
                        start: now,
                        half_cycle: self.config.pulse_half_cycle_secs,
                        cancelled: false,
                    });
                }
            } else {
                entry.cancel_pulse();
            }
        }
    }

    /// Insert a fresh entry, reusing the geometry of a fading one with the same
    /// key. Returns its index.
    fn enter(&mut self, spec: EdgeSpec, projection: &Projection, now: f64) -> usize {
        let key = spec.key();
        let geometry = self
            .entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.geometry.clone())
            .unwrap_or_else(|| densify_great_circle(spec.from, spec.to));

        let length = polyline_length(&projection.project_polyline(geometry.points()));
        let reveal = (length >= self.config.min_draw_in_length_px)
            .then(|| Tween::new(now, self.config.draw_in_secs));

        // A fading entry with this key is superseded outright.
        self.entries.retain(|e| e.key != key);
        self.entries.push(EdgeEntry {
            key,
            geometry,
            reveal,
            style: EdgeStyleAnim::Resting,
            leaving: None,
        });
        self.entries.len() - 1
    }

    /// Retire finished animations. Returns `true` while anything is still
    /// animating.
    pub fn tick(&mut self, now: f64) -> bool {
        self.entries
            .retain(|e| e.leaving.is_none_or(|tween| !tween.is_finished(now)));

        let config = &self.config;
        let mut animating = false;
        for entry in &mut self.entries {
            if entry.reveal.is_some_and(|tween| tween.is_finished(now)) {
                entry.reveal = None;
            }
            match entry.style {
                EdgeStyleAnim::Pulsing(pulse) if pulse.cancelled => {
                    entry.style = EdgeStyleAnim::Easing {
                        from: pulse.style(config, now),
                        tween: Tween::new(now, config.depulse_secs),
                    };
                }
                EdgeStyleAnim::Easing { tween, .. } if tween.is_finished(now) => {
                    entry.style = EdgeStyleAnim::Resting;
                }
                _ => {}
            }
            animating |= entry.reveal.is_some()
                || entry.leaving.is_some()
                || !matches!(entry.style, EdgeStyleAnim::Resting);
        }
        animating
    }

    /// Project every entry for drawing.
    pub fn sprites(&self, projection: &Projection, now: f64) -> Vec<EdgeSprite> {
        self.entries
            .iter()
            .map(|entry| {
                let runs = projection.project_polyline(entry.geometry.points());
                let reveal = entry.reveal_at(now);
                let runs = if reveal < 1.0 {
                    truncate_runs(&runs, reveal)
                } else {
                    runs
                };
                EdgeSprite {
                    key: entry.key,
                    runs,
                    style: entry.style_at(&self.config, now),
                    opacity: entry.opacity_at(now),
                    pulsing: entry.is_pulsing(),
                    easing: entry.is_easing(),
                }
            })
            .collect()
    }

    /// Edges in scope, excluding ones fading out.
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|e| e.leaving.is_none()).count()
    }

    pub fn leaving_count(&self) -> usize {
        self.entries.iter().filter(|e| e.leaving.is_some()).count()
    }

    pub fn pulsing_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.leaving.is_none() && e.is_pulsing())
            .count()
    }

    pub fn is_drawing_in(&self, key: EdgeKey) -> bool {
        self.entries
            .iter()
            .any(|e| e.key == key && e.reveal.is_some())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Total on-screen length of a set of runs.
pub fn polyline_length(runs: &[Vec<DVec2>]) -> f64 {
    runs.iter()
        .flat_map(|run| run.windows(2))
        .map(|w| w[0].distance(w[1]))
        .sum()
}

/// Keep the first `fraction` of the total run length, cutting the last
/// segment where the budget runs out.
pub fn truncate_runs(runs: &[Vec<DVec2>], fraction: f64) -> Vec<Vec<DVec2>> {
    let mut budget = polyline_length(runs) * fraction.clamp(0.0, 1.0);
    let mut out = Vec::new();
    for run in runs {
        let Some(&first) = run.first() else {
            continue;
        };
        if budget <= 0.0 {
            break;
        }
        let mut kept = vec![first];
        for w in run.windows(2) {
            let d = w[0].distance(w[1]);
            if d <= budget {
                kept.push(w[1]);
                budget -= d;
            } else {
                kept.push(w[0].lerp(w[1], budget / d));
                budget = 0.0;
                break;
            }
        }
        if kept.len() >= 2 {
            out.push(kept);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::Rotation;

    const EPSILON: f64 = 1e-9;

    const JFK: GeoPoint = GeoPoint::new(-74.0, 40.7);
    const CDG: GeoPoint = GeoPoint::new(2.3, 48.9);
    const LHR: GeoPoint = GeoPoint::new(-0.45, 51.47);

    fn projection() -> Projection {
        Projection::orthographic()
            .with_scale(300.0)
            .with_translate(DVec2::new(400.0, 300.0))
            .with_rotation(Rotation::new(40.0, -45.0, 0.0))
    }

    fn scene() -> EdgeScene {
        EdgeScene::new(EdgeStyleConfig::default())
    }

    #[test]
    fn test_new_edge_draws_in_then_becomes_static() {
        let mut edges = scene();
        let spec = EdgeSpec::new(JFK, CDG);
        edges.reconcile(&[spec], None, &projection(), 0.0);
        assert!(edges.is_drawing_in(spec.key()));

        let path = densify_great_circle(JFK, CDG);
        let full = polyline_length(&projection().project_polyline(path.points()));
        let half = polyline_length(&edges.sprites(&projection(), 0.5)[0].runs);
        assert!((half - full * 0.5).abs() < 1e-6);

        edges.tick(1.5);
        assert!(!edges.is_drawing_in(spec.key()));
        let drawn = polyline_length(&edges.sprites(&projection(), 1.5)[0].runs);
        assert!((drawn - full).abs() < 1e-6);
    }

    #[test]
    fn test_persisting_edge_keeps_identity() {
        let mut edges = scene();
        let spec = EdgeSpec::new(JFK, CDG);
        edges.reconcile(&[spec], None, &projection(), 0.0);
        edges.tick(2.0);
        edges.reconcile(&[spec], None, &projection(), 3.0);
        assert!(!edges.is_drawing_in(spec.key()));
        assert_eq!(edges.live_count(), 1);
    }

    #[test]
    fn test_removed_edge_fades_then_drops() {
        let mut edges = scene();
        edges.reconcile(&[EdgeSpec::new(JFK, CDG), EdgeSpec::new(JFK, LHR)], None, &projection(), 0.0);
        edges.reconcile(&[EdgeSpec::new(JFK, LHR)], None, &projection(), 1.0);
        assert_eq!(edges.live_count(), 1);
        assert_eq!(edges.leaving_count(), 1);

        let fading = edges
            .sprites(&projection(), 1.15)
            .into_iter()
            .find(|s| s.key == EdgeKey::new(JFK, CDG))
            .unwrap();
        assert!(fading.opacity > 0.0 && fading.opacity < 1.0);

        edges.tick(1.4);
        assert_eq!(edges.leaving_count(), 0);
    }

    #[test]
    fn test_reentering_edge_draws_in_again() {
        let mut edges = scene();
        let spec = EdgeSpec::new(JFK, CDG);
        edges.reconcile(&[spec], None, &projection(), 0.0);
        edges.tick(2.0);
        edges.reconcile(&[], None, &projection(), 2.0);
        edges.reconcile(&[spec], None, &projection(), 2.1);
        assert_eq!(edges.live_count(), 1);
        assert_eq!(edges.leaving_count(), 0);
        assert!(edges.is_drawing_in(spec.key()));
    }

    #[test]
    fn test_selected_edge_pulses_between_styles() {
        let config = EdgeStyleConfig::default();
        let mut edges = scene();
        let spec = EdgeSpec::new(JFK, CDG);
        edges.reconcile(&[spec], Some(spec.key()), &projection(), 0.0);
        assert_eq!(edges.pulsing_count(), 1);

        let peak = edges.sprites(&projection(), 1.2)[0].style;
        assert!((peak.width - config.emphasized.width).abs() < 1e-5);
        let trough = edges.sprites(&projection(), 2.4)[0].style;
        assert!((trough.width - config.resting.width).abs() < 1e-5);
        let next_peak = edges.sprites(&projection(), 3.6)[0].style;
        assert!((next_peak.width - config.emphasized.width).abs() < 1e-5);
    }

    #[test]
    fn test_cancelled_pulse_eases_back_to_rest() {
        let config = EdgeStyleConfig::default();
        let mut edges = scene();
        let spec = EdgeSpec::new(JFK, CDG);
        edges.reconcile(&[spec], Some(spec.key()), &projection(), 0.0);
        edges.reconcile(&[spec], None, &projection(), 0.6);
        assert_eq!(edges.pulsing_count(), 0);

        edges.tick(0.6);
        let mid = edges.sprites(&projection(), 0.6)[0].style;
        assert!(mid.width > config.resting.width);

        edges.tick(1.0);
        let rest = edges.sprites(&projection(), 1.0)[0].style;
        assert_eq!(rest, config.resting);
    }

    #[test]
    fn test_depulsing_sprite_is_flagged_while_width_moves() {
        let config = EdgeStyleConfig::default();
        let mut edges = scene();
        let spec = EdgeSpec::new(JFK, CDG);
        edges.reconcile(&[spec], Some(spec.key()), &projection(), 0.0);
        edges.reconcile(&[spec], None, &projection(), 0.6);
        edges.tick(0.6);

        let sprite = &edges.sprites(&projection(), 0.7)[0];
        assert!(sprite.easing);
        assert!(!sprite.pulsing);
        assert!(sprite.style.width > config.resting.width);
        assert!(sprite.style.width < config.emphasized.width);

        edges.tick(1.0);
        let sprite = &edges.sprites(&projection(), 1.0)[0];
        assert!(!sprite.easing);
        assert!(!sprite.pulsing);
    }

    #[test]
    fn test_tiny_edge_skips_draw_in() {
        let mut edges = scene();
        let a = GeoPoint::new(10.0, 10.0);
        let b = GeoPoint::new(10.000001, 10.0);
        let proj = Projection::orthographic().with_scale(100.0).with_rotation(Rotation::new(-10.0, -10.0, 0.0));
        edges.reconcile(&[EdgeSpec::new(a, b)], None, &proj, 0.0);
        assert!(!edges.is_drawing_in(EdgeKey::new(a, b)));
    }

    #[test]
    fn test_duplicate_specs_collapse() {
        let mut edges = scene();
        let spec = EdgeSpec::new(JFK, CDG);
        edges.reconcile(&[spec, spec], None, &projection(), 0.0);
        assert_eq!(edges.live_count(), 1);
    }

    #[test]
    fn test_truncate_runs_spans_breaks() {
        let runs = vec![
            vec![DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)],
            vec![DVec2::new(20.0, 0.0), DVec2::new(30.0, 0.0)],
        ];
        let cut = truncate_runs(&runs, 0.75);
        assert_eq!(cut.len(), 2);
        assert!((cut[1][1].x - 25.0).abs() < EPSILON);
        assert!(truncate_runs(&runs, 0.0).is_empty());
    }
}
