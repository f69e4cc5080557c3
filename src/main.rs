mod assets_map;
mod config;
mod game;
mod plugins;

use bevy::prelude::*;

use config::tuning::Tuning;
use plugins::{forge_plugin::ForgePlugin, render_plugin::RenderPlugin, ui_plugin::UiPlugin};

fn main() {
    let tuning = Tuning::load_or_default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Sword Forge".into(),
                resolution: (tuning.window_width, tuning.window_height).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(tuning)
        .add_plugins(ForgePlugin)
        .add_plugins(UiPlugin)
        .add_plugins(RenderPlugin)
        .run();
}
