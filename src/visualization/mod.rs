//! Bevy host for the globe engine
//!
//! Bridges window, input and time into [`GlobeEngine`] and draws the frames it
//! produces with 2D meshes, gizmos and text.

use bevy::prelude::*;

use crate::core::config::GlobeConfig;
use crate::core::projection::ProjectionMode;
use crate::core::view_state::ViewportSize;
use crate::data::Dataset;
use crate::engine::GlobeEngine;
use crate::network::{NodeId, Selection, SelectionHandler};
use crate::render::frame::RenderFrame;

pub mod draw;
pub mod input;
pub mod tooltip;

pub use draw::{DepulseGizmos, EdgeGizmos, MapGizmos, PulseGizmos};

/// The engine, as the single owner of the live projection.
#[derive(Resource, Deref, DerefMut)]
pub struct GlobeView(pub GlobeEngine);

/// Caller-owned origin/destination selection.
#[derive(Resource, Debug, Clone, Default, PartialEq, Deref)]
pub struct RouteSelection(pub Selection);

impl SelectionHandler for RouteSelection {
    fn set_origin(&mut self, origin: Option<NodeId>) {
        self.0.origin = origin;
    }

    fn set_destination(&mut self, destination: Option<NodeId>) {
        self.0.destination = destination;
    }
}

impl RouteSelection {
    pub fn clear(&mut self) {
        self.0 = Selection::default();
    }
}

/// Caller-owned 3D/2D flag.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct MapMode(pub ProjectionMode);

/// Frame built this update, read by the drawing systems.
#[derive(Resource, Default)]
pub struct GlobeFrame(pub Option<RenderFrame>);

/// Plugin hosting the engine in the primary window.
pub struct GlobePlugin {
    pub config: GlobeConfig,
    pub dataset: Dataset,
    pub mode: ProjectionMode,
}

impl Plugin for GlobePlugin {
    fn build(&self, app: &mut App) {
        let engine = GlobeEngine::new(
            self.config.clone(),
            self.dataset.world.clone(),
            self.dataset.network.clone(),
            self.mode,
            ViewportSize::new(1280.0, 720.0),
        );
        app.insert_resource(GlobeView(engine))
            .insert_resource(MapMode(self.mode))
            .init_resource::<RouteSelection>()
            .init_resource::<GlobeFrame>()
            .init_gizmo_group::<MapGizmos>()
            .init_gizmo_group::<EdgeGizmos>()
            .init_gizmo_group::<PulseGizmos>()
            .init_gizmo_group::<DepulseGizmos>()
            .add_systems(
                Startup,
                (
                    draw::configure_gizmos,
                    draw::spawn_map_entities,
                    tooltip::spawn_tooltip,
                ),
            )
            .add_systems(
                Update,
                (
                    input::track_viewport,
                    input::sync_mode.run_if(resource_changed::<MapMode>),
                    input::sync_selection.run_if(resource_changed::<RouteSelection>),
                    input::pointer_input,
                    input::tick_engine,
                    draw::build_frame,
                    (
                        draw::update_backdrop,
                        draw::update_markers,
                        (draw::update_animated_widths, draw::draw_gizmos).chain(),
                        tooltip::update_tooltip,
                    ),
                )
                    .chain(),
            );
    }
}
