//! Per-frame render description
//!
//! Everything a host needs to draw one frame, in screen pixels: backdrop,
//! country outlines, node markers with their role styling and visibility,
//! edge sprites and the hover tooltip.

use std::collections::HashSet;
use std::f64::consts::FRAC_PI_2;

use bevy::math::DVec2;

use crate::core::config::{MarkerStyle, MarkerStyleConfig, StrokeStyle};
use crate::core::geo::angular_distance;
use crate::core::projection::{Projection, ProjectionMode};
use crate::core::view_state::ViewportSize;
use crate::network::{Node, NodeId, Selection, WorldGeometry};
use crate::render::edges::EdgeSprite;

/// Role of a node under the current selection. Styling depends on this alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Default,
    Candidate,
    Destination,
    Origin,
}

impl NodeRole {
    pub fn of(id: &NodeId, selection: &Selection, candidates: &HashSet<NodeId>) -> Self {
        if selection.origin.as_ref() == Some(id) {
            NodeRole::Origin
        } else if selection.destination.as_ref() == Some(id) {
            NodeRole::Destination
        } else if candidates.contains(id) {
            NodeRole::Candidate
        } else {
            NodeRole::Default
        }
    }

    pub fn style(self, styles: &MarkerStyleConfig) -> MarkerStyle {
        match self {
            NodeRole::Default => styles.default,
            NodeRole::Candidate => styles.candidate,
            NodeRole::Destination => styles.destination,
            NodeRole::Origin => styles.origin,
        }
    }
}

/// Whether selection leaves a node shown and clickable.
///
/// Without an origin everything is in play. With one, only the origin, its
/// candidates and the selected destination are.
pub fn is_in_scope(id: &NodeId, selection: &Selection, candidates: &HashSet<NodeId>) -> bool {
    match &selection.origin {
        None => true,
        Some(origin) => {
            origin == id || candidates.contains(id) || selection.destination.as_ref() == Some(id)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeMarker {
    pub id: NodeId,
    pub position: DVec2,
    pub role: NodeRole,
    pub style: MarkerStyle,
    /// 1 in scope, 0 faded out.
    pub opacity: f32,
    /// Receives hover and clicks.
    pub interactive: bool,
    /// Hidden by the projection: far hemisphere, or no finite image.
    pub culled: bool,
    pub hovered: bool,
}

impl NodeMarker {
    pub fn is_hittable(&self) -> bool {
        self.interactive && !self.culled
    }
}

/// Build the marker for `node`.
pub fn node_marker(
    node: &Node,
    selection: &Selection,
    candidates: &HashSet<NodeId>,
    projection: &Projection,
    styles: &MarkerStyleConfig,
) -> NodeMarker {
    let role = NodeRole::of(&node.id, selection, candidates);
    let in_scope = is_in_scope(&node.id, selection, candidates);
    let far_side = projection.mode() == ProjectionMode::Globe
        && angular_distance(node.position, projection.sub_camera_point()) > FRAC_PI_2;
    let projected = projection.project(node.position);
    NodeMarker {
        id: node.id.clone(),
        position: projected.unwrap_or(DVec2::NAN),
        role,
        style: role.style(styles),
        opacity: if in_scope { 1.0 } else { 0.0 },
        interactive: in_scope,
        culled: far_side || projected.is_none(),
        hovered: false,
    }
}

/// Nearest hittable marker within `radius` of `pos`.
pub fn hit_test(markers: &[NodeMarker], pos: DVec2, radius: f64) -> Option<&NodeMarker> {
    markers
        .iter()
        .filter(|m| m.is_hittable())
        .map(|m| (m, m.position.distance(pos)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(m, _)| m)
}

/// Ocean area behind the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backdrop {
    /// The sphere outline (globe).
    Disc { center: DVec2, radius: f64 },
    /// The whole viewport (flat).
    Rect { min: DVec2, max: DVec2 },
}

impl Backdrop {
    pub fn for_projection(projection: &Projection, viewport: ViewportSize) -> Self {
        match projection.mode() {
            ProjectionMode::Globe => Backdrop::Disc {
                center: projection.translate(),
                radius: projection.scale(),
            },
            ProjectionMode::Flat => Backdrop::Rect {
                min: DVec2::ZERO,
                max: DVec2::new(viewport.width, viewport.height),
            },
        }
    }
}

/// Country outlines as continuous screen runs.
pub fn outline_runs(world: &WorldGeometry, projection: &Projection) -> Vec<Vec<DVec2>> {
    world
        .rings()
        .iter()
        .flat_map(|ring| projection.project_polyline(ring))
        .collect()
}

/// Hover label anchored above a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub node: NodeId,
    pub name: String,
    pub anchor: DVec2,
}

#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub mode: ProjectionMode,
    pub backdrop: Backdrop,
    pub outlines: Vec<Vec<DVec2>>,
    pub markers: Vec<NodeMarker>,
    pub edges: Vec<EdgeSprite>,
    pub tooltip: Option<Tooltip>,
    pub hover_ring: StrokeStyle,
}

impl RenderFrame {
    pub fn marker(&self, id: &NodeId) -> Option<&NodeMarker> {
        self.markers.iter().find(|m| &m.id == id)
    }
}
