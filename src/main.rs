use bevy::prelude::*;

use crate::args::ARGS;
use crate::backdrop::BackdropPlugin;
use crate::keyboard::KeyboardPlugin;
use crate::overlay::OverlayPlugin;
use crate::page_ui::PageUiPlugin;
use crate::render::RenderPlugin;
use crate::settings::Settings;

mod args;
mod backdrop;
mod digit_keys;
mod field;
mod grid;
mod helix;
mod keyboard;
mod math;
mod network;
mod overlay;
mod page;
mod page_ui;
mod render;
mod reveal;
mod settings;

fn main() {
    let (settings, problems) = Settings::from_args(&ARGS);
    let problems: Vec<String> = problems.iter().map(ToString::to_string).collect();
    let (width, height) = settings.window;

    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "NETiX".into(),
                    resolution: (u32::from(width), u32::from(height)).into(),
                    ..default()
                }),
                ..default()
            }),
            BackdropPlugin {
                settings: settings.clone(),
                initial: ARGS.backdrop,
            },
            RenderPlugin,
            PageUiPlugin,
            OverlayPlugin,
            KeyboardPlugin,
        ))
        .add_systems(Startup, move || {
            info!("{:?}", settings);
            for problem in &problems {
                warn!("{problem}; using the default");
            }
        })
        .run();
}
