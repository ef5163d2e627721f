//! Hover tooltip
//!
//! One `Text2d` label, spawned hidden, that shows the hovered node's name
//! just above its marker.

use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy::window::PrimaryWindow;

use crate::visualization::draw::screen_to_world;
use crate::visualization::GlobeFrame;

const TOOLTIP_Z: f32 = 10.0;
const TOOLTIP_FONT_SIZE: f32 = 14.0;

/// Name label for the hovered node.
#[derive(Component)]
pub struct TooltipLabel;

pub fn spawn_tooltip(mut commands: Commands) {
    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: TOOLTIP_FONT_SIZE,
            ..default()
        },
        TextColor(Color::WHITE),
        Anchor::BOTTOM_CENTER,
        Transform::from_xyz(0.0, 0.0, TOOLTIP_Z),
        Visibility::Hidden,
        TooltipLabel,
    ));
}

/// Follow the hovered marker; hide when nothing is hovered.
pub fn update_tooltip(
    window: Single<&Window, With<PrimaryWindow>>,
    frame: Res<GlobeFrame>,
    mut label: Query<(&mut Text2d, &mut Transform, &mut Visibility), With<TooltipLabel>>,
) {
    let Ok((mut text, mut transform, mut visibility)) = label.single_mut() else {
        return;
    };
    match frame.0.as_ref().and_then(|f| f.tooltip.as_ref()) {
        Some(tooltip) => {
            if text.0 != tooltip.name {
                text.0.clone_from(&tooltip.name);
            }
            transform.translation = screen_to_world(tooltip.anchor, &window).extend(TOOLTIP_Z);
            *visibility = Visibility::Visible;
        }
        None => *visibility = Visibility::Hidden,
    }
}
