//! Scene setup and UI systems: camera, lights, die spawning, the Roll
//! button, and the history panel.

use bevy::prelude::*;

use crate::dice::history::RollHistory;
use crate::dice::labels::{
    label_materials, label_orientation, label_segments, LabelMeshes, LABEL_OFFSET,
};
use crate::dice::mesh::{create_die_mesh, die_faces, icosahedron_edges};
use crate::dice::physics::{die_body, spawn_ground, LAUNCH_POSITION};
use crate::dice::types::*;

/// Radius of the wireframe edge cylinders.
const OUTLINE_RADIUS: f32 = 0.02;

/// Build the whole scene: camera, lights, ground, the die with its decals
/// and outline, and the UI.
pub fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<DieConfig>,
) {
    // Camera looking slightly downward at the origin.
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 10.0, 18.0).looking_at(Vec3::new(0.0, -1.0, 0.0), Vec3::Y),
        MainCamera,
    ));

    // Key light and a dimmer fill from the opposite side.
    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(2.0, 2.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 4_000.0,
            ..default()
        },
        Transform::from_xyz(-1.0, -1.0, 1.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        ..default()
    });

    spawn_ground(&mut commands);

    let die_material = materials.add(StandardMaterial {
        base_color: config.theme.die_color,
        perceptual_roughness: 0.3,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    let outline_material = materials.add(StandardMaterial {
        base_color: Color::BLACK,
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    let label_handles = label_materials(&mut materials, &config.theme);
    let label_meshes = LabelMeshes::new(&mut meshes);
    let edge_mesh = meshes.add(Cylinder::new(OUTLINE_RADIUS, 1.0));
    let faces = die_faces();

    commands
        .spawn((
            Mesh3d(meshes.add(create_die_mesh())),
            MeshMaterial3d(die_material.clone()),
            Transform::from_translation(LAUNCH_POSITION),
            Visibility::Hidden,
            die_body(),
        ))
        .with_children(|die| {
            // Wireframe edge overlay: one thin cylinder per edge.
            for (a, b) in icosahedron_edges() {
                let offset = b - a;
                let length = offset.length();
                die.spawn((
                    Mesh3d(edge_mesh.clone()),
                    MeshMaterial3d(outline_material.clone()),
                    Transform::from_translation((a + b) / 2.0)
                        .with_rotation(Quat::from_rotation_arc(Vec3::Y, offset / length))
                        .with_scale(Vec3::new(1.0, length, 1.0)),
                    DieOutline,
                ));
            }

            // One decal group per face, on the surface, facing outward.
            for face in &faces {
                let material = label_handles
                    .get(&face.label)
                    .cloned()
                    .unwrap_or_else(|| die_material.clone());
                die.spawn((
                    Transform::from_translation(face.normal * LABEL_OFFSET)
                        .with_rotation(label_orientation(face.normal)),
                    Visibility::Inherited,
                    FaceLabel { label: face.label },
                ))
                .with_children(|group| {
                    for segment in label_segments(face.label) {
                        group.spawn((
                            Mesh3d(label_meshes.handle(segment.shape)),
                            MeshMaterial3d(material.clone()),
                            Transform::from_translation(segment.position)
                                .with_rotation(segment.rotation),
                        ));
                    }
                });
            }
        });

    commands.insert_resource(DieAssets {
        die_material,
        outline_material,
        label_materials: label_handles,
    });

    spawn_ui(&mut commands, &config);
}

fn spawn_ui(commands: &mut Commands, config: &DieConfig) {
    // Roll button, bottom right.
    commands
        .spawn((
            Button,
            Interaction::None,
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(50.0),
                right: Val::Px(50.0),
                padding: UiRect::axes(Val::Px(30.0), Val::Px(15.0)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(config.theme.button_color),
            BorderRadius::all(Val::Px(8.0)),
            RollButton,
        ))
        .with_children(|button| {
            button.spawn((
                Text::new("Roll"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });

    // History panel, top left. Hidden until there is something to show.
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(20.0),
                left: Val::Px(20.0),
                max_width: Val::Px(220.0),
                padding: UiRect::all(Val::Px(15.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(10.0),
                ..default()
            },
            BackgroundColor(config.theme.panel_background),
            BorderRadius::all(Val::Px(10.0)),
            Visibility::Hidden,
            HistoryPanel,
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new("Roll History"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(config.theme.panel_text),
            ));
            panel.spawn((
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(config.theme.panel_text),
                HistoryText,
            ));
            panel
                .spawn((
                    Button,
                    Interaction::None,
                    Node {
                        padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                        justify_content: JustifyContent::Center,
                        ..default()
                    },
                    BackgroundColor(Color::srgb_u8(0xdc, 0x35, 0x45)),
                    BorderRadius::all(Val::Px(4.0)),
                    ClearHistoryButton,
                ))
                .with_children(|button| {
                    button.spawn((
                        Text::new("Clear History"),
                        TextFont {
                            font_size: 12.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                });
        });
}

/// Space rolls the die.
pub fn handle_roll_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut requests: MessageWriter<RollRequested>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        requests.write(RollRequested);
    }
}

pub fn handle_roll_button(
    interactions: Query<&Interaction, (Changed<Interaction>, With<RollButton>)>,
    mut requests: MessageWriter<RollRequested>,
) {
    for interaction in interactions.iter() {
        if *interaction == Interaction::Pressed {
            requests.write(RollRequested);
        }
    }
}

/// Append each completed roll to the history.
pub fn record_results(
    mut completed: MessageReader<RollCompleted>,
    mut history: ResMut<RollHistory>,
) {
    for result in completed.read() {
        history.record(result.face);
    }
}

pub fn handle_clear_button(
    interactions: Query<&Interaction, (Changed<Interaction>, With<ClearHistoryButton>)>,
    mut history: ResMut<RollHistory>,
    mut cleared: MessageWriter<HistoryCleared>,
) {
    for interaction in interactions.iter() {
        if *interaction == Interaction::Pressed && !history.is_empty() {
            history.clear();
            cleared.write(HistoryCleared);
            info!("roll history cleared");
        }
    }
}

/// Re-render the panel whenever the history changes. The panel disappears
/// entirely when the list is empty or disabled by configuration.
pub fn update_history_panel(
    history: Res<RollHistory>,
    config: Res<DieConfig>,
    mut panel: Query<&mut Visibility, With<HistoryPanel>>,
    mut text: Query<&mut Text, With<HistoryText>>,
) {
    if !history.is_changed() {
        return;
    }

    let Ok(mut visibility) = panel.single_mut() else {
        return;
    };
    *visibility = if config.show_history && !history.is_empty() {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };

    if let Ok(mut text) = text.single_mut() {
        text.0 = format_history(&history);
    }
}

/// Newest first, with the most recent roll marked.
fn format_history(history: &RollHistory) -> String {
    history
        .iter()
        .enumerate()
        .map(|(i, face)| {
            if i == 0 {
                format!("[{}]", face)
            } else {
                face.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_button_empties_history_and_notifies() {
        let mut app = App::new();
        app.add_message::<HistoryCleared>();

        let mut history = RollHistory::default();
        history.record(12);
        history.record(7);
        app.insert_resource(history);

        app.world_mut().spawn((Interaction::Pressed, ClearHistoryButton));
        app.add_systems(Update, handle_clear_button);
        app.update();

        assert!(app.world().resource::<RollHistory>().is_empty());
        let cleared = app.world().resource::<Messages<HistoryCleared>>();
        assert_eq!(cleared.len(), 1);
    }

    #[test]
    fn test_clear_button_on_empty_history_stays_quiet() {
        let mut app = App::new();
        app.add_message::<HistoryCleared>();
        app.insert_resource(RollHistory::default());

        app.world_mut().spawn((Interaction::Pressed, ClearHistoryButton));
        app.add_systems(Update, handle_clear_button);
        app.update();

        let cleared = app.world().resource::<Messages<HistoryCleared>>();
        assert!(cleared.is_empty());
    }

    #[test]
    fn test_format_history_marks_latest() {
        let mut history = RollHistory::default();
        history.record(3);
        history.record(20);
        assert_eq!(format_history(&history), "[20]  3");
    }

    #[test]
    fn test_format_history_empty() {
        assert_eq!(format_history(&RollHistory::default()), "");
    }
}
