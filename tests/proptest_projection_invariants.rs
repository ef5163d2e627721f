//! Property tests for the projection and gesture invariants:
//!
//! 1. Densified paths keep their endpoints and advance monotonically
//! 2. No gesture sequence leaves the scale outside its extent
//! 3. Globe tilt stays within [-90, 90] under arbitrary drags
//! 4. Anchored globe zoom keeps the point under the cursor

use bevy::math::DVec2;
use proptest::prelude::*;
use routeglobe::camera::{InteractionController, ProjectionState};
use routeglobe::core::config::{CameraConfig, InteractionConfig};
use routeglobe::core::coordinates::{GeoPoint, wrap_degrees};
use routeglobe::core::geo::{PATH_SEGMENTS, angular_distance, densify_great_circle};
use routeglobe::core::projection::ProjectionMode;
use routeglobe::core::view_state::{ViewStateStore, ViewportSize};
use routeglobe::network::WorldGeometry;

const EPSILON: f64 = 1e-9;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Gesture {
    Drag(f64, f64),
    Wheel(f64, f64, f64),
    Pinch(f64, f64, f64),
}

fn geo_strategy() -> impl Strategy<Value = GeoPoint> {
    (-180.0f64..=180.0, -89.0f64..=89.0).prop_map(|(lon, lat)| GeoPoint::new(lon, lat))
}

fn gesture_strategy() -> impl Strategy<Value = Gesture> {
    prop_oneof![
        (-400.0f64..400.0, -400.0f64..400.0).prop_map(|(dx, dy)| Gesture::Drag(dx, dy)),
        (0.0f64..800.0, 0.0f64..600.0, -2000.0f64..2000.0)
            .prop_map(|(x, y, dy)| Gesture::Wheel(x, y, dy)),
        (0.0f64..800.0, 0.0f64..600.0, 0.05f64..20.0)
            .prop_map(|(x, y, f)| Gesture::Pinch(x, y, f)),
    ]
}

fn mode_strategy() -> impl Strategy<Value = ProjectionMode> {
    prop_oneof![Just(ProjectionMode::Globe), Just(ProjectionMode::Flat)]
}

fn state(mode: ProjectionMode) -> ProjectionState {
    let config = CameraConfig::default();
    let store = ViewStateStore::new(
        ViewportSize::new(800.0, 600.0),
        &WorldGeometry::default(),
        &config,
    );
    ProjectionState::activate(mode, &store, &config)
}

fn apply(controller: &InteractionController, gesture: &Gesture, state: &mut ProjectionState) {
    match *gesture {
        Gesture::Drag(dx, dy) => controller.drag(DVec2::new(dx, dy), state),
        Gesture::Wheel(x, y, dy) => {
            controller.wheel(DVec2::new(x, y), dy, state);
        }
        Gesture::Pinch(x, y, f) => {
            controller.zoom_by(DVec2::new(x, y), f, state);
        }
    }
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn densified_path_keeps_endpoints(a in geo_strategy(), b in geo_strategy()) {
        let path = densify_great_circle(a, b);
        prop_assert_eq!(path.len(), PATH_SEGMENTS + 1);
        prop_assert_eq!(path.first(), Some(a));
        prop_assert_eq!(path.last(), Some(b));
        for p in path.points() {
            prop_assert!(p.is_finite());
        }
    }

    #[test]
    fn densified_path_advances_away_from_source(a in geo_strategy(), b in geo_strategy()) {
        prop_assume!(angular_distance(a, b) < std::f64::consts::PI - 1e-3);
        let path = densify_great_circle(a, b);
        let distances: Vec<f64> = path.points().iter().map(|p| angular_distance(a, *p)).collect();
        for pair in distances.windows(2) {
            prop_assert!(pair[1] + 1e-7 >= pair[0], "{} then {}", pair[0], pair[1]);
        }
        let remaining: Vec<f64> = path.points().iter().map(|p| angular_distance(*p, b)).collect();
        for pair in remaining.windows(2) {
            prop_assert!(pair[1] <= pair[0] + 1e-7, "{} then {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn gestures_keep_scale_within_extent(
        mode in mode_strategy(),
        gestures in prop::collection::vec(gesture_strategy(), 1..40),
    ) {
        let controller = InteractionController::new(InteractionConfig::default());
        let mut s = state(mode);
        let extent = s.scale_extent();
        for gesture in &gestures {
            apply(&controller, gesture, &mut s);
            let scale = s.projection().scale();
            prop_assert!(scale >= extent.min * (1.0 - EPSILON), "{scale} < {}", extent.min);
            prop_assert!(scale <= extent.max * (1.0 + EPSILON), "{scale} > {}", extent.max);
        }
    }

    #[test]
    fn drags_keep_tilt_in_range(
        drags in prop::collection::vec((-2000.0f64..2000.0, -2000.0f64..2000.0), 1..30),
    ) {
        let controller = InteractionController::new(InteractionConfig::default());
        let mut s = state(ProjectionMode::Globe);
        for (dx, dy) in drags {
            controller.drag(DVec2::new(dx, dy), &mut s);
            let phi = s.projection().rotation().phi;
            prop_assert!((-90.0..=90.0).contains(&phi), "tilt {phi}");
        }
    }

    #[test]
    fn anchored_globe_zoom_keeps_cursor_point(
        angle in 0.0f64..std::f64::consts::TAU,
        radius in 0.0f64..0.6,
        factor in 1.05f64..3.0,
    ) {
        let controller = InteractionController::new(InteractionConfig::default());
        let mut s = state(ProjectionMode::Globe);
        let center = s.viewport().center();
        let pos = center + DVec2::from_angle(angle) * radius * s.projection().scale();
        let Some(before) = s.projection().invert(pos) else {
            return Err(TestCaseError::reject("cursor off the disc"));
        };
        prop_assert!(controller.zoom_by(pos, factor, &mut s));
        let after = s.projection().invert(pos);
        prop_assert!(after.is_some());
        if let Some(after) = after {
            prop_assert!(wrap_degrees(after.lon - before.lon).abs() < 1e-6);
            prop_assert!((after.lat - before.lat).abs() < 1e-6);
        }
    }
}
