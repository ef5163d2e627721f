//! The globe engine
//!
//! Owns the live projection and everything that writes to it. A host feeds it
//! viewport sizes, the mode flag, the caller-owned selection and pointer
//! events, advances it with a clock, and asks for a [`RenderFrame`] to draw.
//! All calls are expected from one thread, in event order.

use std::collections::HashSet;

use bevy::log::{debug, info};
use bevy::math::DVec2;

use crate::camera::interaction::{InteractionController, PointerRelease};
use crate::camera::state::ProjectionState;
use crate::camera::transition::{CameraTransitions, FitGoal, FitOutcome, FitSignature};
use crate::core::config::GlobeConfig;
use crate::core::coordinates::GeoPoint;
use crate::core::projection::{Projection, ProjectionMode};
use crate::core::view_state::{ViewStateStore, ViewportSize};
use crate::network::selection::{apply_background_click, apply_node_click};
use crate::network::{NodeId, RouteNetwork, Selection, SelectionHandler, SelectionPhase, WorldGeometry};
use crate::render::edges::{EdgeKey, EdgeScene, EdgeSpec};
use crate::render::frame::{
    Backdrop, NodeMarker, RenderFrame, Tooltip, hit_test, is_in_scope, node_marker, outline_runs,
};

pub struct GlobeEngine {
    config: GlobeConfig,
    world: WorldGeometry,
    network: RouteNetwork,
    store: ViewStateStore,
    state: ProjectionState,
    interaction: InteractionController,
    transitions: CameraTransitions,
    edges: EdgeScene,
    /// Latest selection pushed by the caller; click handling reads this.
    selection: Selection,
    /// Candidates of `selection.origin`, recomputed only when the origin changes.
    candidates: HashSet<NodeId>,
    candidates_origin: Option<NodeId>,
    hovered: Option<NodeId>,
}

impl GlobeEngine {
    pub fn new(
        config: GlobeConfig,
        world: WorldGeometry,
        network: RouteNetwork,
        mode: ProjectionMode,
        viewport: ViewportSize,
    ) -> Self {
        let store = ViewStateStore::new(viewport, &world, &config.camera);
        let state = ProjectionState::activate(mode, &store, &config.camera);
        info!(
            "Globe engine ready: {} nodes, {} edges, {mode:?} at {}x{}",
            network.nodes().len(),
            network.edges().len(),
            viewport.width,
            viewport.height
        );
        Self {
            interaction: InteractionController::new(config.interaction.clone()),
            edges: EdgeScene::new(config.edges.clone()),
            config,
            world,
            network,
            store,
            state,
            transitions: CameraTransitions::default(),
            selection: Selection::default(),
            candidates: HashSet::new(),
            candidates_origin: None,
            hovered: None,
        }
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn network(&self) -> &RouteNetwork {
        &self.network
    }

    pub fn mode(&self) -> ProjectionMode {
        self.state.mode()
    }

    pub fn viewport(&self) -> ViewportSize {
        self.store.viewport()
    }

    pub fn state(&self) -> &ProjectionState {
        &self.state
    }

    pub fn projection(&self) -> &Projection {
        self.state.projection()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn candidates(&self) -> &HashSet<NodeId> {
        &self.candidates
    }

    pub fn transitions(&self) -> &CameraTransitions {
        &self.transitions
    }

    pub fn edges(&self) -> &EdgeScene {
        &self.edges
    }

    pub fn hovered(&self) -> Option<&NodeId> {
        self.hovered.as_ref()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitions.is_active()
    }

    /// Resize: rebuild baselines and the live projection, then frame the
    /// current selection again for the new size.
    pub fn set_viewport(&mut self, viewport: ViewportSize, now: f64) {
        if viewport == self.store.viewport() {
            return;
        }
        info!("Viewport resized to {}x{}", viewport.width, viewport.height);
        self.store.refit(viewport, &self.world, &self.config.camera);
        self.rebuild(self.mode(), now);
    }

    /// Switch projection family. Nothing carries over between the two.
    pub fn set_mode(&mut self, mode: ProjectionMode, now: f64) {
        if mode == self.mode() {
            return;
        }
        info!("Projection mode switched to {mode:?}");
        self.rebuild(mode, now);
    }

    fn rebuild(&mut self, mode: ProjectionMode, now: f64) {
        self.transitions.interrupt();
        self.transitions.invalidate();
        self.interaction.cancel();
        self.state = ProjectionState::activate(mode, &self.store, &self.config.camera);
        self.edges.clear();
        self.reconcile_edges(now);
        self.fit(now);
    }

    /// Take in the caller's current selection. Unchanged selections are a no-op.
    pub fn sync_selection(&mut self, selection: &Selection, now: f64) {
        if *selection == self.selection {
            return;
        }
        debug!(
            "Selection: origin {:?}, destination {:?}",
            selection.origin.as_ref().map(NodeId::as_str),
            selection.destination.as_ref().map(NodeId::as_str)
        );
        self.selection = selection.clone();
        self.refresh_candidates();
        self.reconcile_edges(now);
        self.fit(now);
        if let Some(hovered) = &self.hovered
            && !is_in_scope(hovered, &self.selection, &self.candidates)
        {
            self.hovered = None;
        }
    }

    fn refresh_candidates(&mut self) {
        if self.candidates_origin == self.selection.origin {
            return;
        }
        self.candidates = match &self.selection.origin {
            Some(origin) => self.network.candidate_ids(origin),
            None => HashSet::new(),
        };
        self.candidates_origin = self.selection.origin.clone();
    }

    fn position(&self, id: &Option<NodeId>) -> Option<GeoPoint> {
        id.as_ref()
            .and_then(|id| self.network.node(id))
            .map(|n| n.position)
    }

    /// Edges in scope and the one that should pulse.
    fn edge_specs(&self) -> (Vec<EdgeSpec>, Option<EdgeKey>) {
        let Some(origin) = &self.selection.origin else {
            return (Vec::new(), None);
        };
        let Some(from) = self.position(&self.selection.origin) else {
            return (Vec::new(), None);
        };
        match &self.selection.destination {
            Some(destination) => {
                let to = self.position(&self.selection.destination);
                match to {
                    Some(to) if self.network.has_edge(origin, destination) => {
                        let spec = EdgeSpec::new(from, to);
                        (vec![spec], Some(spec.key()))
                    }
                    _ => (Vec::new(), None),
                }
            }
            None => {
                let specs = self
                    .network
                    .candidates(origin)
                    .map(|n| EdgeSpec::new(from, n.position))
                    .collect();
                (specs, None)
            }
        }
    }

    fn reconcile_edges(&mut self, now: f64) {
        let (specs, selected) = self.edge_specs();
        self.edges
            .reconcile(&specs, selected, self.state.projection(), now);
    }

    /// Points the camera should frame for the current selection.
    fn fit_points(&self) -> Vec<GeoPoint> {
        match self.selection.phase() {
            SelectionPhase::Both => [&self.selection.origin, &self.selection.destination]
                .into_iter()
                .filter_map(|id| self.position(id))
                .collect(),
            SelectionPhase::OriginOnly => {
                let Some(origin) = &self.selection.origin else {
                    return Vec::new();
                };
                self.position(&self.selection.origin)
                    .into_iter()
                    .chain(self.network.candidates(origin).map(|n| n.position))
                    .collect()
            }
            SelectionPhase::None | SelectionPhase::DestinationOnly => Vec::new(),
        }
    }

    fn fit(&mut self, now: f64) -> FitOutcome {
        let signature = FitSignature {
            mode: self.mode(),
            origin: self.selection.origin.clone(),
            destination: self.selection.destination.clone(),
        };
        let points = self.fit_points();
        let goal = if self.selection.is_empty() {
            FitGoal::Neutral
        } else {
            FitGoal::Frame(&points)
        };
        self.transitions
            .on_selection(signature, goal, &mut self.state, &self.config.camera, now)
    }

    pub fn pointer_down(&mut self, pos: DVec2) {
        self.interaction.pointer_down(pos);
    }

    pub fn pointer_move(&mut self, pos: DVec2) {
        if self.interaction.is_pressed() {
            // Jitter under the click tolerance leaves the camera flight alone.
            self.interaction.pointer_move(pos, &mut self.state);
            if self.interaction.is_dragging() {
                self.transitions.interrupt();
                return;
            }
        }
        self.update_hover(pos);
    }

    /// Release the pointer. A click goes through `handler` to the caller's
    /// selection.
    pub fn pointer_up(&mut self, pos: DVec2, handler: &mut dyn SelectionHandler) {
        if let PointerRelease::Click(pos) = self.interaction.pointer_up(pos) {
            self.click(pos, handler);
        }
        self.update_hover(pos);
    }

    pub fn pointer_leave(&mut self) {
        self.interaction.cancel();
        self.hovered = None;
    }

    /// Wheel zoom; `delta_y` in pixels.
    pub fn wheel(&mut self, pos: DVec2, delta_y: f64) {
        self.transitions.interrupt();
        self.interaction.wheel(pos, delta_y, &mut self.state);
        self.update_hover(pos);
    }

    /// Pinch zoom by a multiplicative `factor`.
    pub fn pinch(&mut self, pos: DVec2, factor: f64) {
        self.transitions.interrupt();
        self.interaction.zoom_by(pos, factor, &mut self.state);
        self.update_hover(pos);
    }

    /// Resolve a click: a node updates the selection, the background clears it.
    pub fn click(&mut self, pos: DVec2, handler: &mut dyn SelectionHandler) {
        let markers = self.markers();
        let radius = self.config.interaction.hit_radius_px;
        if let Some(marker) = hit_test(&markers, pos, radius) {
            debug!("Clicked node {}", marker.id);
            apply_node_click(&self.selection, &marker.id, handler);
            return;
        }
        let on_map = match self.mode() {
            ProjectionMode::Globe => self.state.projection().invert(pos).is_some(),
            ProjectionMode::Flat => true,
        };
        if on_map {
            apply_background_click(handler);
        }
    }

    fn update_hover(&mut self, pos: DVec2) {
        if self.mode() == ProjectionMode::Globe && self.state.projection().invert(pos).is_none() {
            self.hovered = None;
            return;
        }
        let markers = self.markers();
        self.hovered = hit_test(&markers, pos, self.config.interaction.hit_radius_px).map(|m| m.id.clone());
    }

    /// Advance animations to `now`. Returns `true` while anything is moving.
    pub fn tick(&mut self, now: f64) -> bool {
        let camera = self.transitions.tick(now, &mut self.state);
        let edges = self.edges.tick(now);
        camera || edges
    }

    fn markers(&self) -> Vec<NodeMarker> {
        let projection = self.state.projection();
        self.network
            .nodes()
            .iter()
            .map(|node| {
                let mut marker = node_marker(
                    node,
                    &self.selection,
                    &self.candidates,
                    projection,
                    &self.config.markers,
                );
                marker.hovered = self.hovered.as_ref() == Some(&node.id);
                marker
            })
            .collect()
    }

    pub fn frame(&self, now: f64) -> RenderFrame {
        let projection = self.state.projection();
        let markers = self.markers();
        let tooltip = markers
            .iter()
            .find(|m| m.hovered && m.is_hittable())
            .and_then(|m| {
                let name = self.network.name(&m.id)?;
                Some(Tooltip {
                    node: m.id.clone(),
                    name: name.to_string(),
                    anchor: m.position - DVec2::new(0.0, self.config.interaction.tooltip_offset_px),
                })
            });
        RenderFrame {
            mode: self.mode(),
            backdrop: Backdrop::for_projection(projection, self.viewport()),
            outlines: outline_runs(&self.world, projection),
            markers,
            edges: self.edges.sprites(projection, now),
            tooltip,
            hover_ring: self.config.markers.hover_ring,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Edge, Node};

    fn network() -> RouteNetwork {
        RouteNetwork::new(
            vec![
                Node::new("JFK", "John F. Kennedy", -74.0, 40.7),
                Node::new("CDG", "Charles de Gaulle", 2.3, 48.9),
                Node::new("LHR", "Heathrow", -0.45, 51.47),
                Node::new("NRT", "Narita", 140.39, 35.77),
            ],
            vec![Edge::new("JFK", "CDG"), Edge::new("JFK", "LHR"), Edge::new("CDG", "NRT")],
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

    #[test]
    fn test_origin_only_shows_fan() {
        let mut e = engine(ProjectionMode::Globe);
        e.sync_selection(&Selection::new(Some("JFK".into()), None), 0.0);
        assert_eq!(e.edges().live_count(), 2);
        assert_eq!(e.edges().pulsing_count(), 0);
        assert!(e.is_transitioning());
    }

    #[test]
    fn test_manual_destination_without_edge_draws_nothing() {
        let mut e = engine(ProjectionMode::Globe);
        e.sync_selection(&Selection::new(Some("JFK".into()), Some("NRT".into())), 0.0);
        assert_eq!(e.edges().live_count(), 0);
        let frame = e.frame(0.0);
        let nrt = frame.marker(&"NRT".into()).unwrap();
        assert_eq!(nrt.opacity, 1.0);
    }

    #[test]
    fn test_tooltip_follows_hovered_node() {
        let mut e = engine(ProjectionMode::Flat);
        let frame = e.frame(0.0);
        let cdg = frame.marker(&"CDG".into()).unwrap().position;
        e.pointer_move(cdg + DVec2::new(3.0, 0.0));
        assert_eq!(e.hovered(), Some(&NodeId::from("CDG")));
        let tooltip = e.frame(0.0).tooltip.unwrap();
        assert_eq!(tooltip.name, "Charles de Gaulle");
        assert!((tooltip.anchor - (cdg - DVec2::new(0.0, 10.0))).length() < 1e-9);

        e.pointer_leave();
        assert!(e.frame(0.0).tooltip.is_none());
    }

    #[test]
    fn test_gesture_interrupts_transition() {
        let mut e = engine(ProjectionMode::Globe);
        e.sync_selection(&Selection::new(Some("JFK".into()), Some("CDG".into())), 0.0);
        assert!(e.is_transitioning());
        e.wheel(DVec2::new(400.0, 300.0), -50.0);
        assert!(!e.is_transitioning());
        assert!(e.transitions().previous_view().is_none());
    }

    #[test]
    fn test_mode_switch_rebuilds_and_refits() {
        let mut e = engine(ProjectionMode::Globe);
        e.sync_selection(&Selection::new(Some("JFK".into()), Some("CDG".into())), 0.0);
        e.set_mode(ProjectionMode::Flat, 0.5);
        assert_eq!(e.mode(), ProjectionMode::Flat);
        assert!(e.is_transitioning());
        assert_eq!(e.edges().live_count(), 1);
        assert_eq!(e.edges().pulsing_count(), 1);
        assert_eq!(e.frame(0.5).edges.len(), 1);
        assert!(e.transitions().previous_view().is_none());
    }

    #[test]
    fn test_off_disc_pointer_clears_hover() {
        let mut e = engine(ProjectionMode::Globe);
        let frame = e.frame(0.0);
        let jfk = frame.marker(&"JFK".into()).unwrap();
        assert!(jfk.is_hittable());
        let pos = jfk.position;
        e.pointer_move(pos);
        assert_eq!(e.hovered(), Some(&NodeId::from("JFK")));

        let corner = DVec2::new(1.0, 1.0);
        assert!(e.projection().invert(corner).is_none());
        e.pointer_move(corner);
        assert!(e.hovered().is_none());
        assert!(e.frame(0.0).tooltip.is_none());
    }

    #[test]
    fn test_press_jitter_keeps_camera_flight() {
        let mut e = engine(ProjectionMode::Globe);
        e.sync_selection(&Selection::new(Some("JFK".into()), None), 0.0);
        assert!(e.is_transitioning());
        assert!(e.transitions().previous_view().is_some());

        e.pointer_down(DVec2::new(400.0, 300.0));
        e.pointer_move(DVec2::new(401.0, 300.0));
        assert!(e.is_transitioning());
        assert!(e.transitions().previous_view().is_some());
    }

    #[test]
    fn test_off_disc_click_keeps_selection() {
        let mut e = engine(ProjectionMode::Globe);
        let mut selection = Selection::new(Some("JFK".into()), None);
        e.sync_selection(&selection, 0.0);
        e.tick(5.0);
        e.click(DVec2::new(1.0, 1.0), &mut selection);
        assert_eq!(selection.origin, Some("JFK".into()));
    }
}
