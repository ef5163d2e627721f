//! End-to-end selection scenarios driven through the engine, the way a host
//! would: push the selection, feed pointer events, tick the clock.

use bevy::math::DVec2;
use routeglobe::core::config::GlobeConfig;
use routeglobe::core::geo::{angular_distance, centroid};
use routeglobe::core::projection::ProjectionMode;
use routeglobe::core::view_state::ViewportSize;
use routeglobe::engine::GlobeEngine;
use routeglobe::network::{Edge, Node, NodeId, RouteNetwork, Selection, WorldGeometry};

const EPSILON: f64 = 1e-6;
const SETTLED: f64 = 10.0;

fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

fn network() -> RouteNetwork {
    RouteNetwork::new(
        vec![
            Node::new("JFK", "John F. Kennedy", -73.78, 40.64),
            Node::new("CDG", "Charles de Gaulle", 2.55, 49.01),
            Node::new("LHR", "Heathrow", -0.45, 51.47),
            Node::new("FRA", "Frankfurt", 8.56, 50.04),
            Node::new("NRT", "Narita", 140.39, 35.77),
        ],
        vec![
            Edge::new("JFK", "CDG"),
            Edge::new("JFK", "LHR"),
            Edge::new("JFK", "FRA"),
            // Duplicate route: still one candidate.
            Edge::new("JFK", "FRA"),
            Edge::new("CDG", "NRT"),
        ],
    )
}

fn engine(mode: ProjectionMode) -> GlobeEngine {
    GlobeEngine::new(
        GlobeConfig::default(),
        WorldGeometry::default(),
        network(),
        mode,
        ViewportSize::new(800.0, 600.0),
    )
}

fn both(origin: &str, destination: &str) -> Selection {
    Selection::new(Some(id(origin)), Some(id(destination)))
}

fn origin(origin: &str) -> Selection {
    Selection::new(Some(id(origin)), None)
}

#[test]
fn test_route_selection_frames_and_pulses_single_path() {
    let mut e = engine(ProjectionMode::Globe);
    e.sync_selection(&both("JFK", "CDG"), 0.0);

    assert_eq!(e.edges().live_count(), 1);
    assert_eq!(e.edges().pulsing_count(), 1);
    assert!(e.is_transitioning());

    e.tick(SETTLED);
    assert!(!e.is_transitioning());

    let positions = [e.network().node(&id("JFK")), e.network().node(&id("CDG"))]
        .map(|n| n.map(|n| n.position).unwrap());
    let middle = centroid(&positions).unwrap();
    let center = e.projection().sub_camera_point();
    assert!(angular_distance(center, middle) < EPSILON);

    let frame = e.frame(SETTLED);
    assert_eq!(frame.edges.len(), 1);
    assert!(frame.edges[0].pulsing);
    assert!(!frame.marker(&id("JFK")).unwrap().culled);
    assert!(!frame.marker(&id("CDG")).unwrap().culled);
}

#[test]
fn test_clearing_destination_returns_to_fan() {
    let mut e = engine(ProjectionMode::Globe);
    e.sync_selection(&both("JFK", "CDG"), 0.0);
    e.tick(SETTLED);

    e.sync_selection(&origin("JFK"), SETTLED);
    assert_eq!(e.edges().pulsing_count(), 0);
    assert_eq!(e.edges().live_count(), 3);
    assert_eq!(e.candidates().len(), 3);

    e.tick(2.0 * SETTLED);
    let frame = e.frame(2.0 * SETTLED);
    assert_eq!(frame.edges.len(), 3);
    assert!(frame.edges.iter().all(|edge| !edge.pulsing));
}

#[test]
fn test_origin_only_hides_unrelated_nodes() {
    let mut e = engine(ProjectionMode::Flat);
    e.sync_selection(&origin("JFK"), 0.0);
    let frame = e.frame(0.0);

    let nrt = frame.marker(&id("NRT")).unwrap();
    assert_eq!(nrt.opacity, 0.0);
    assert!(!nrt.interactive);
    for code in ["JFK", "CDG", "LHR", "FRA"] {
        let marker = frame.marker(&id(code)).unwrap();
        assert_eq!(marker.opacity, 1.0, "{code}");
        assert!(marker.interactive, "{code}");
    }
}

#[test]
fn test_repeated_selection_does_not_restart_camera() {
    let mut e = engine(ProjectionMode::Globe);
    e.sync_selection(&origin("JFK"), 0.0);
    let started = e.transitions().started();
    assert_eq!(started, 1);

    e.sync_selection(&origin("JFK"), 0.5);
    e.tick(SETTLED);
    e.sync_selection(&origin("JFK"), SETTLED);
    assert_eq!(e.transitions().started(), started);
}

#[test]
fn test_resize_mid_transition_stays_within_new_bounds() {
    let mut e = engine(ProjectionMode::Globe);
    e.sync_selection(&both("JFK", "NRT"), 0.0);
    e.tick(0.4);
    assert!(e.is_transitioning());
    let stale = e.transitions().previous_view().unwrap();

    e.set_viewport(ViewportSize::new(400.0, 300.0), 0.4);
    // The refit starts a fresh sequence from the new baseline.
    let baseline = *e.state().baseline();
    let snapshot = e.transitions().previous_view().unwrap();
    assert_ne!(snapshot, stale);
    assert!((snapshot.scale - baseline.scale).abs() < EPSILON);
    assert_eq!(snapshot.rotation, baseline.rotation);
    let extent = e.state().scale_extent();
    let mut now = 0.4;
    while now < 3.0 {
        now += 0.05;
        e.tick(now);
        let scale = e.projection().scale();
        assert!(extent.contains(scale), "{scale} outside {extent:?}");
    }
    assert!(!e.is_transitioning());
}

#[test]
fn test_origin_without_routes_centers_flat_map() {
    let mut e = engine(ProjectionMode::Flat);
    e.sync_selection(&origin("NRT"), 0.0);
    e.tick(SETTLED);

    assert!((e.state().zoom().k - 4.0).abs() < EPSILON);
    let frame = e.frame(SETTLED);
    let nrt = frame.marker(&id("NRT")).unwrap().position;
    assert!((nrt - e.viewport().center()).length() < EPSILON);
}

#[test]
fn test_clicks_walk_the_selection_states() {
    let mut e = engine(ProjectionMode::Flat);
    let mut selection = Selection::default();

    let jfk = e.frame(0.0).marker(&id("JFK")).unwrap().position;
    e.click(jfk, &mut selection);
    assert_eq!(selection, origin("JFK"));
    e.sync_selection(&selection, 0.0);

    let cdg = e.frame(0.0).marker(&id("CDG")).unwrap().position;
    e.click(cdg, &mut selection);
    assert_eq!(selection, both("JFK", "CDG"));
    e.sync_selection(&selection, 0.0);

    // Another candidate replaces the destination.
    let lhr = e.frame(0.0).marker(&id("LHR")).unwrap().position;
    e.click(lhr + DVec2::new(1.0, 1.0), &mut selection);
    assert_eq!(selection, both("JFK", "LHR"));
    e.sync_selection(&selection, 0.0);

    let jfk = e.frame(0.0).marker(&id("JFK")).unwrap().position;
    e.click(jfk, &mut selection);
    assert!(selection.is_empty());
}

#[test]
fn test_background_click_clears_selection() {
    let mut e = engine(ProjectionMode::Flat);
    let mut selection = both("JFK", "CDG");
    e.sync_selection(&selection, 0.0);
    e.tick(SETTLED);

    e.click(DVec2::new(2.0, 598.0), &mut selection);
    assert!(selection.is_empty());
}

#[test]
fn test_drag_after_fit_cancels_camera_motion() {
    let mut e = engine(ProjectionMode::Globe);
    e.sync_selection(&origin("JFK"), 0.0);
    assert!(e.is_transitioning());

    e.pointer_down(DVec2::new(400.0, 300.0));
    e.pointer_move(DVec2::new(440.0, 300.0));
    assert!(!e.is_transitioning());
    assert!(e.transitions().previous_view().is_none());
}
