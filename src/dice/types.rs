//! Components, resources, and messages shared across the die systems.

use std::collections::HashMap;

use bevy::prelude::*;
use rand::rngs::StdRng;
use serde::Deserialize;

/// The rolling die. Face data is fixed at construction and never reassigned.
#[derive(Component)]
pub struct Die {
    pub faces: Vec<DieFace>,
}

/// Per-face data derived once from the icosahedron geometry, in the die's
/// local frame.
#[derive(Clone, Copy, Debug)]
pub struct DieFace {
    /// Face label, 1 through 20.
    pub label: u32,
    /// Mean of the face's three vertices.
    pub centroid: Vec3,
    /// Outward normal; the centroid normalized, valid because the die is
    /// regular and centered at the origin.
    pub normal: Vec3,
}

/// Marker for the wireframe edge overlay child entities.
#[derive(Component)]
pub struct DieOutline;

/// A decal group holding the seven-segment digits for one face.
#[derive(Component)]
pub struct FaceLabel {
    pub label: u32,
}

/// Marker for the static ground body.
#[derive(Component)]
pub struct Ground;

#[derive(Component)]
pub struct MainCamera;

#[derive(Component)]
pub struct RollButton;

#[derive(Component)]
pub struct HistoryPanel;

#[derive(Component)]
pub struct HistoryText;

#[derive(Component)]
pub struct ClearHistoryButton;

/// User asked for a roll. Ignored unless the die is idle.
#[derive(Message, Default)]
pub struct RollRequested;

/// Written exactly once per completed roll with the winning face.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollCompleted {
    pub face: u32,
}

/// Written when the user clears the history panel.
#[derive(Message, Default)]
pub struct HistoryCleared;

/// Handles to the die's materials, used for highlighting and fading.
#[derive(Resource)]
pub struct DieAssets {
    pub die_material: Handle<StandardMaterial>,
    pub outline_material: Handle<StandardMaterial>,
    /// One material per face label; every segment of a label shares it.
    pub label_materials: HashMap<u32, Handle<StandardMaterial>>,
}

/// Seedable source for the launch spin.
#[derive(Resource)]
pub struct RollRng(pub StdRng);

/// Runtime configuration, assembled from CLI flags in `main`.
#[derive(Resource, Clone)]
pub struct DieConfig {
    pub show_history: bool,
    pub max_history: usize,
    pub theme: Theme,
}

impl Default for DieConfig {
    fn default() -> Self {
        Self {
            show_history: true,
            max_history: 10,
            theme: Theme::default(),
        }
    }
}

/// Visual overrides. Purely cosmetic; no effect on roll logic.
#[derive(Clone, Debug)]
pub struct Theme {
    pub die_color: Color,
    pub label_color: Color,
    pub panel_background: Color,
    pub panel_text: Color,
    pub button_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            die_color: Color::srgb_u8(0x44, 0xaa, 0x88),
            label_color: Color::srgb_u8(0x00, 0xff, 0x00),
            panel_background: Color::srgba(1.0, 1.0, 1.0, 0.92),
            panel_text: Color::srgb(0.1, 0.1, 0.1),
            button_color: Color::srgb_u8(0x44, 0xaa, 0x88),
        }
    }
}

/// On-disk theme format. All fields optional CSS color strings.
#[derive(Deserialize, Default)]
pub struct ThemeFile {
    pub die_color: Option<String>,
    pub label_color: Option<String>,
    pub panel_background: Option<String>,
    pub panel_text: Option<String>,
    pub button_color: Option<String>,
}

impl Theme {
    /// Load a theme from a RON file, falling back to defaults for missing
    /// or unparsable entries. A missing file logs a warning and yields the
    /// default theme.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match ron::from_str::<ThemeFile>(&contents) {
                Ok(file) => Self::from_file(&file),
                Err(e) => {
                    warn!("failed to parse theme {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("failed to read theme {}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn from_file(file: &ThemeFile) -> Self {
        let base = Self::default();
        Self {
            die_color: parse_color(&file.die_color).unwrap_or(base.die_color),
            label_color: parse_color(&file.label_color).unwrap_or(base.label_color),
            panel_background: parse_color(&file.panel_background).unwrap_or(base.panel_background),
            panel_text: parse_color(&file.panel_text).unwrap_or(base.panel_text),
            button_color: parse_color(&file.button_color).unwrap_or(base.button_color),
        }
    }
}

fn parse_color(field: &Option<String>) -> Option<Color> {
    let text = field.as_ref()?;
    match csscolorparser::parse(text) {
        Ok(c) => Some(Color::srgba(c.r, c.g, c.b, c.a)),
        Err(e) => {
            warn!("ignoring theme color {:?}: {}", text, e);
            None
        }
    }
}
