use bevy::log::{info, warn};
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};

#[cfg(feature = "dev")]
use bevy::dev_tools::fps_overlay::FpsOverlayPlugin;

use routeglobe::core::config::GlobeConfig;
use routeglobe::core::projection::ProjectionMode;
use routeglobe::data::{Dataset, load_dataset, sample_dataset};
use routeglobe::visualization::{GlobePlugin, MapMode, RouteSelection};

fn load_startup_dataset(config: &GlobeConfig) -> Dataset {
    let Some(dir) = &config.data_dir else {
        info!("No data directory configured; using the built-in sample network");
        return sample_dataset();
    };
    match load_dataset(dir) {
        Ok(dataset) => dataset,
        Err(e) => {
            warn!("Falling back to the sample network: {e:#}");
            sample_dataset()
        }
    }
}

/// `M` toggles globe and map, `Escape` clears the selection.
fn keyboard_shortcuts(
    input: Res<ButtonInput<KeyCode>>,
    mut mode: ResMut<MapMode>,
    mut selection: ResMut<RouteSelection>,
) {
    if input.just_pressed(KeyCode::KeyM) {
        mode.0 = mode.0.toggled();
        info!("Projection mode: {:?}", mode.0);
    }
    if input.just_pressed(KeyCode::Escape) && !selection.is_empty() {
        selection.clear();
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Route Globe".to_string(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }));

    #[cfg(feature = "dev")]
    app.add_plugins(FpsOverlayPlugin::default());

    // Loaded after DefaultPlugins so the log subscriber is installed.
    let config = GlobeConfig::load_or_default();
    let dataset = load_startup_dataset(&config);

    app.insert_resource(ClearColor(Color::srgb(0.06, 0.07, 0.09)));
    app.add_plugins(GlobePlugin {
        config,
        dataset,
        mode: ProjectionMode::Globe,
    });
    app.add_systems(Update, keyboard_shortcuts);

    app.run();
}
