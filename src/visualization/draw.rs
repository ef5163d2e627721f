//! Drawing the engine's render frame
//!
//! Screen pixels (origin top-left, y down) map to 2D world space with the
//! default `Camera2d` (origin at the window center, y up).

use bevy::gizmos::config::GizmoConfigStore;
use bevy::math::DVec2;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::core::config::Rgba;
use crate::render::edges::EdgeSprite;
use crate::render::frame::{Backdrop, NodeRole};
use crate::visualization::{GlobeFrame, GlobeView};

/// Country outlines.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct MapGizmos;

/// Non-pulsing edge paths, drawn at the resting width.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct EdgeGizmos;

/// The pulsing path; its line width follows the pulse every frame.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct PulseGizmos;

/// A path whose pulse was just cancelled, easing its width back to rest.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct DepulseGizmos;

/// Which gizmo group an edge goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeLayer {
    Resting,
    Pulse,
    Depulse,
}

impl EdgeLayer {
    fn of(edge: &EdgeSprite) -> Self {
        if edge.pulsing {
            EdgeLayer::Pulse
        } else if edge.easing {
            EdgeLayer::Depulse
        } else {
            EdgeLayer::Resting
        }
    }
}

const BACKDROP_Z: f32 = 0.0;
const MARKER_Z: f32 = 2.0;

#[derive(Component)]
pub struct BackdropDisc;

#[derive(Component)]
pub struct BackdropRect;

/// Marker entity for the node at `index` in the network's node list.
#[derive(Component)]
pub struct NodeSprite {
    pub index: usize,
}

/// One material per marker role.
#[derive(Resource)]
pub struct MarkerMaterials {
    default: Handle<ColorMaterial>,
    candidate: Handle<ColorMaterial>,
    destination: Handle<ColorMaterial>,
    origin: Handle<ColorMaterial>,
}

impl MarkerMaterials {
    fn for_role(&self, role: NodeRole) -> &Handle<ColorMaterial> {
        match role {
            NodeRole::Default => &self.default,
            NodeRole::Candidate => &self.candidate,
            NodeRole::Destination => &self.destination,
            NodeRole::Origin => &self.origin,
        }
    }
}

pub fn to_color(c: Rgba, opacity: f32) -> Color {
    Color::srgba(c.r, c.g, c.b, c.a * opacity)
}

/// Screen pixel position to 2D world coordinates.
pub fn screen_to_world(p: DVec2, window: &Window) -> Vec2 {
    Vec2::new(
        p.x as f32 - window.width() / 2.0,
        window.height() / 2.0 - p.y as f32,
    )
}

pub fn configure_gizmos(mut config_store: ResMut<GizmoConfigStore>, view: Res<GlobeView>) {
    let map = &view.config().map;
    let edges = &view.config().edges;
    let (config, _) = config_store.config_mut::<MapGizmos>();
    config.line.width = map.land_stroke.width.max(1.0);
    let (config, _) = config_store.config_mut::<EdgeGizmos>();
    config.line.width = edges.resting.width;
    let (config, _) = config_store.config_mut::<PulseGizmos>();
    config.line.width = edges.resting.width;
    let (config, _) = config_store.config_mut::<DepulseGizmos>();
    config.line.width = edges.resting.width;
}

pub fn spawn_map_entities(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    view: Res<GlobeView>,
) {
    commands.spawn(Camera2d);

    let map = &view.config().map;
    let ocean = materials.add(ColorMaterial::from_color(to_color(map.ocean_fill, 1.0)));
    commands.spawn((
        Mesh2d(meshes.add(Circle::new(1.0))),
        MeshMaterial2d(ocean.clone()),
        Transform::from_xyz(0.0, 0.0, BACKDROP_Z),
        Visibility::Hidden,
        BackdropDisc,
    ));
    commands.spawn((
        Mesh2d(meshes.add(Rectangle::new(1.0, 1.0))),
        MeshMaterial2d(ocean),
        Transform::from_xyz(0.0, 0.0, BACKDROP_Z),
        Visibility::Hidden,
        BackdropRect,
    ));

    let styles = &view.config().markers;
    let marker_materials = MarkerMaterials {
        default: materials.add(ColorMaterial::from_color(to_color(styles.default.fill, 1.0))),
        candidate: materials.add(ColorMaterial::from_color(to_color(styles.candidate.fill, 1.0))),
        destination: materials.add(ColorMaterial::from_color(to_color(styles.destination.fill, 1.0))),
        origin: materials.add(ColorMaterial::from_color(to_color(styles.origin.fill, 1.0))),
    };

    let dot = meshes.add(Circle::new(1.0));
    for index in 0..view.network().nodes().len() {
        commands.spawn((
            Mesh2d(dot.clone()),
            MeshMaterial2d(marker_materials.default.clone()),
            Transform::from_xyz(0.0, 0.0, MARKER_Z),
            Visibility::Hidden,
            NodeSprite { index },
        ));
    }
    commands.insert_resource(marker_materials);
}

pub fn build_frame(time: Res<Time>, view: Res<GlobeView>, mut frame: ResMut<GlobeFrame>) {
    frame.0 = Some(view.frame(time.elapsed_secs_f64()));
}

pub fn update_backdrop(
    window: Single<&Window, With<PrimaryWindow>>,
    frame: Res<GlobeFrame>,
    mut disc: Query<(&mut Transform, &mut Visibility), (With<BackdropDisc>, Without<BackdropRect>)>,
    mut rect: Query<(&mut Transform, &mut Visibility), (With<BackdropRect>, Without<BackdropDisc>)>,
) {
    let Some(frame) = &frame.0 else {
        return;
    };
    let (Ok((mut disc_tf, mut disc_vis)), Ok((mut rect_tf, mut rect_vis))) =
        (disc.single_mut(), rect.single_mut())
    else {
        return;
    };
    match frame.backdrop {
        Backdrop::Disc { center, radius } => {
            let c = screen_to_world(center, &window);
            disc_tf.translation = c.extend(BACKDROP_Z);
            disc_tf.scale = Vec3::splat(radius as f32);
            *disc_vis = Visibility::Visible;
            *rect_vis = Visibility::Hidden;
        }
        Backdrop::Rect { min, max } => {
            let c = screen_to_world((min + max) / 2.0, &window);
            rect_tf.translation = c.extend(BACKDROP_Z);
            rect_tf.scale = Vec3::new((max.x - min.x) as f32, (max.y - min.y) as f32, 1.0);
            *rect_vis = Visibility::Visible;
            *disc_vis = Visibility::Hidden;
        }
    }
}

pub fn update_markers(
    window: Single<&Window, With<PrimaryWindow>>,
    frame: Res<GlobeFrame>,
    materials: Res<MarkerMaterials>,
    mut sprites: Query<(
        &NodeSprite,
        &mut Transform,
        &mut Visibility,
        &mut MeshMaterial2d<ColorMaterial>,
    )>,
) {
    let Some(frame) = &frame.0 else {
        return;
    };
    for (sprite, mut transform, mut visibility, mut material) in &mut sprites {
        let Some(marker) = frame.markers.get(sprite.index) else {
            continue;
        };
        if marker.culled || marker.opacity <= 0.0 {
            *visibility = Visibility::Hidden;
            continue;
        }
        *visibility = Visibility::Visible;
        transform.translation = screen_to_world(marker.position, &window).extend(MARKER_Z);
        transform.scale = Vec3::splat(marker.style.radius);
        let handle = materials.for_role(marker.role);
        if material.0 != *handle {
            material.0 = handle.clone();
        }
    }
}

/// Line widths for the pulsing and de-pulsing paths. Runs ahead of
/// [`draw_gizmos`], which only reads the config store through its gizmo params.
pub fn update_animated_widths(frame: Res<GlobeFrame>, mut config_store: ResMut<GizmoConfigStore>) {
    let Some(frame) = &frame.0 else {
        return;
    };
    let first = |layer: EdgeLayer| frame.edges.iter().find(|e| EdgeLayer::of(e) == layer);
    if let Some(edge) = first(EdgeLayer::Pulse) {
        let (config, _) = config_store.config_mut::<PulseGizmos>();
        config.line.width = edge.style.width;
    }
    if let Some(edge) = first(EdgeLayer::Depulse) {
        let (config, _) = config_store.config_mut::<DepulseGizmos>();
        config.line.width = edge.style.width;
    }
}

pub fn draw_gizmos(
    window: Single<&Window, With<PrimaryWindow>>,
    frame: Res<GlobeFrame>,
    view: Res<GlobeView>,
    mut gizmos: Gizmos,
    mut map_gizmos: Gizmos<MapGizmos>,
    mut edge_gizmos: Gizmos<EdgeGizmos>,
    mut pulse_gizmos: Gizmos<PulseGizmos>,
    mut depulse_gizmos: Gizmos<DepulseGizmos>,
) {
    let Some(frame) = &frame.0 else {
        return;
    };
    let to_world = |p: &DVec2| screen_to_world(*p, &window);

    let land = to_color(view.config().map.land_stroke.color, 1.0);
    for run in &frame.outlines {
        map_gizmos.linestrip_2d(run.iter().map(to_world), land);
    }

    for edge in &frame.edges {
        let color = to_color(edge.style.color, edge.opacity);
        let layer = EdgeLayer::of(edge);
        for run in &edge.runs {
            let points = run.iter().map(to_world);
            match layer {
                EdgeLayer::Pulse => pulse_gizmos.linestrip_2d(points, color),
                EdgeLayer::Depulse => depulse_gizmos.linestrip_2d(points, color),
                EdgeLayer::Resting => edge_gizmos.linestrip_2d(points, color),
            }
        }
    }

    if let Backdrop::Disc { center, radius } = frame.backdrop {
        let stroke = view.config().map.ocean_stroke.color;
        gizmos.circle_2d(to_world(&center), radius as f32, to_color(stroke, 1.0));
    }

    let ring = to_color(frame.hover_ring.color, 1.0);
    for marker in frame.markers.iter().filter(|m| m.hovered && m.is_hittable()) {
        gizmos.circle_2d(to_world(&marker.position), marker.style.radius, ring);
    }
}
