//! Window, input and clock bridging

use bevy::input::gestures::PinchGesture;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::math::DVec2;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::core::view_state::ViewportSize;
use crate::visualization::{GlobeView, MapMode, RouteSelection};

pub fn track_viewport(
    window: Single<&Window, With<PrimaryWindow>>,
    time: Res<Time>,
    mut view: ResMut<GlobeView>,
) {
    let viewport = ViewportSize::new(window.width() as f64, window.height() as f64);
    // Only touch the resource when the size actually changed.
    if view.viewport() != viewport {
        view.set_viewport(viewport, time.elapsed_secs_f64());
    }
}

pub fn sync_mode(mode: Res<MapMode>, time: Res<Time>, mut view: ResMut<GlobeView>) {
    view.set_mode(mode.0, time.elapsed_secs_f64());
}

pub fn sync_selection(selection: Res<RouteSelection>, time: Res<Time>, mut view: ResMut<GlobeView>) {
    view.sync_selection(&selection.0, time.elapsed_secs_f64());
}

/// Feed pointer, wheel and pinch input to the engine. Clicks write into
/// [`RouteSelection`], which the selection sync picks up next frame.
pub fn pointer_input(
    window: Single<&Window, With<PrimaryWindow>>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut wheel: MessageReader<MouseWheel>,
    mut pinch: MessageReader<PinchGesture>,
    mut selection: ResMut<RouteSelection>,
    mut view: ResMut<GlobeView>,
    mut last_cursor: Local<Option<Vec2>>,
) {
    let Some(cursor) = window.cursor_position() else {
        if last_cursor.take().is_some() {
            view.pointer_leave();
        }
        wheel.clear();
        pinch.clear();
        return;
    };
    let pos = DVec2::new(cursor.x as f64, cursor.y as f64);

    if *last_cursor != Some(cursor) {
        *last_cursor = Some(cursor);
        view.pointer_move(pos);
    }
    if buttons.just_pressed(MouseButton::Left) {
        view.pointer_down(pos);
    }
    if buttons.just_released(MouseButton::Left) {
        let before = selection.0.clone();
        view.pointer_up(pos, selection.bypass_change_detection());
        if selection.0 != before {
            selection.set_changed();
        }
    }

    let line_pixels = view.config().interaction.wheel_line_pixels;
    for event in wheel.read() {
        // Wheel up zooms in; the engine takes screen-style deltas where
        // positive means zoom out.
        let delta_y = match event.unit {
            MouseScrollUnit::Line => -(event.y as f64) * line_pixels,
            MouseScrollUnit::Pixel => -(event.y as f64),
        };
        if delta_y != 0.0 {
            view.wheel(pos, delta_y);
        }
    }
    for gesture in pinch.read() {
        view.pinch(pos, 1.0 + gesture.0 as f64);
    }
}

pub fn tick_engine(time: Res<Time>, mut view: ResMut<GlobeView>) {
    view.tick(time.elapsed_secs_f64());
}
