// Hide console window on Windows for release builds (GUI app).
// In debug builds, keep the console so panics/backtraces are visible.
#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use dado::dice::{DicePlugin, DieConfig, RollHistory, RollRng, Theme};

/// Roll a physics-simulated d20 in a 3D window
#[derive(Parser, Debug)]
#[command(name = "dado", version, about)]
struct Cli {
    /// Hide the roll history panel
    #[arg(long)]
    no_history: bool,

    /// Maximum number of rolls kept in the history panel
    #[arg(long, default_value_t = 10)]
    max_history: usize,

    /// Seed for the launch spin (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Path to a RON theme file overriding panel and die colors
    #[arg(long)]
    theme: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let theme = match &cli.theme {
        Some(path) => Theme::load(path),
        None => Theme::default(),
    };

    let config = DieConfig {
        show_history: !cli.no_history,
        max_history: cli.max_history,
        theme,
    };

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Dado".to_string(),
                resolution: (900, 900).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .insert_resource(RollHistory::with_cap(config.max_history))
        .insert_resource(config)
        .insert_resource(RollRng(rng))
        .add_plugins(DicePlugin)
        .run();
}
