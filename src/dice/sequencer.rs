//! The roll sequencer.
//!
//! A single die cycles through
//! `hidden → rolling → settled → transitioning → floating → fading → hidden`.
//! The transition logic lives in [`RollPhase::step`], a pure function of
//! (phase, wall-clock seconds, simulation readout), so it can be tested
//! without a running app or a mocked clock. The systems at the bottom of
//! this module apply its side effects to the ECS world.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::dice::physics::{freeze_die, launch_die};
use crate::dice::types::{
    Die, DieAssets, DieConfig, DieFace, RollCompleted, RollRequested, RollRng, Theme,
};

/// Linear speed below which the die counts as settling.
pub const SETTLE_LINEAR_SPEED: f32 = 0.1;
/// Angular speed below which the die counts as settling.
pub const SETTLE_ANGULAR_SPEED: f32 = 0.1;
/// How long the die must sit settled before the result is read.
pub const SETTLE_HOLD_SECS: f64 = 2.0;
/// Duration of the eased move from the settled pose to the float pose.
pub const TRANSITION_SECS: f64 = 1.0;
/// How long the result floats before fading out.
pub const FLOAT_SECS: f64 = 3.0;
/// Duration of the fade-out.
pub const FADE_SECS: f64 = 0.3;

/// Where the die floats while presenting its result.
pub const FLOAT_POINT: Vec3 = Vec3::new(0.0, 0.5, 0.0);
/// Bobbing amplitude around the float height.
pub const BOB_AMPLITUDE: f32 = 0.2;
/// Bobbing angular rate in radians per second.
pub const BOB_RATE: f32 = 2.0;
/// Hue rotation speed of the winning-face highlight: a full cycle every 2 s.
pub const HUE_DEGREES_PER_SEC: f32 = 180.0;
/// Direction the winning face is turned toward while floating.
pub const FACE_VIEW_DIRECTION: Vec3 = Vec3::new(0.0, 0.4, 0.95);

/// Instantaneous speed magnitudes read from the simulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimReadout {
    pub linear_speed: f32,
    pub angular_speed: f32,
}

impl SimReadout {
    pub fn of(velocity: &Velocity) -> Self {
        Self {
            linear_speed: velocity.linvel.length(),
            angular_speed: velocity.angvel.length(),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.linear_speed < SETTLE_LINEAR_SPEED && self.angular_speed < SETTLE_ANGULAR_SPEED
    }
}

/// Current phase of the roll cycle. Timestamps are wall-clock seconds as
/// reported by the caller, so tests can drive the machine with plain
/// numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RollPhase {
    #[default]
    Hidden,
    Rolling,
    Settled {
        since: f64,
    },
    Transitioning {
        started: f64,
    },
    Floating {
        since: f64,
    },
    Fading {
        started: f64,
    },
}

/// Side effect a phase transition asks the surrounding system to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseChange {
    /// The die dropped below the settle thresholds.
    Settled,
    /// The settle hold elapsed: read the top face, freeze the body,
    /// snapshot the pose, and emit the result.
    Resolved,
    /// The eased move finished; the float display begins.
    FloatStarted,
    /// The float display elapsed; the fade-out begins.
    FadeStarted,
    /// The fade finished; hide the die.
    Hidden,
}

impl RollPhase {
    /// Advance the machine one tick. Pure: no clocks, no ECS.
    ///
    /// If the simulation never drops below the settle thresholds the phase
    /// stays `Rolling` forever; that is accepted, not an error.
    pub fn step(self, now: f64, readout: SimReadout) -> (RollPhase, Option<PhaseChange>) {
        match self {
            RollPhase::Hidden => (self, None),
            RollPhase::Rolling => {
                if readout.is_settled() {
                    (RollPhase::Settled { since: now }, Some(PhaseChange::Settled))
                } else {
                    (self, None)
                }
            }
            RollPhase::Settled { since } => {
                if now - since >= SETTLE_HOLD_SECS {
                    (
                        RollPhase::Transitioning { started: now },
                        Some(PhaseChange::Resolved),
                    )
                } else {
                    (self, None)
                }
            }
            RollPhase::Transitioning { started } => {
                if now - started >= TRANSITION_SECS {
                    (
                        RollPhase::Floating { since: now },
                        Some(PhaseChange::FloatStarted),
                    )
                } else {
                    (self, None)
                }
            }
            RollPhase::Floating { since } => {
                if now - since >= FLOAT_SECS {
                    (
                        RollPhase::Fading { started: now },
                        Some(PhaseChange::FadeStarted),
                    )
                } else {
                    (self, None)
                }
            }
            RollPhase::Fading { started } => {
                if now - started >= FADE_SECS {
                    (RollPhase::Hidden, Some(PhaseChange::Hidden))
                } else {
                    (self, None)
                }
            }
        }
    }
}

/// Sequencer state. Owns no entities; it mutates the die it is given.
#[derive(Resource, Default)]
pub struct RollSequencer {
    pub phase: RollPhase,
    /// Label of the face that won the most recent roll.
    pub winning_face: Option<u32>,
    /// Pose snapshotted when the result was read, the start of the eased
    /// move toward the float pose.
    pub settled_pose: Option<(Vec3, Quat)>,
}

impl RollSequencer {
    /// Start a roll if the die is idle. Requests during a running sequence
    /// are ignored so the display cannot be interrupted.
    pub fn begin_roll(&mut self) -> bool {
        if self.phase != RollPhase::Hidden {
            return false;
        }
        self.phase = RollPhase::Rolling;
        self.winning_face = None;
        self.settled_pose = None;
        true
    }
}

/// The label whose rotated centroid sits highest. Ties break strictly to
/// the earlier face in enumeration order.
pub fn top_face(rotation: Quat, faces: &[DieFace]) -> u32 {
    let mut best_label = 1;
    let mut best_height = f32::NEG_INFINITY;

    for face in faces {
        let height = (rotation * face.centroid).y;
        if height > best_height {
            best_height = height;
            best_label = face.label;
        }
    }

    best_label
}

/// Rotation that turns a face normal toward the viewer-facing direction.
pub fn facing_rotation(normal: Vec3) -> Quat {
    Quat::from_rotation_arc(normal.normalize(), FACE_VIEW_DIRECTION.normalize())
}

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Opacity during the fade: quadratic ease-in from 1 down to 0.
pub fn fade_opacity(progress: f32) -> f32 {
    1.0 - progress.clamp(0.0, 1.0).powi(2)
}

/// Interpolated pose for the settled-to-floating move.
pub fn transition_pose(from: (Vec3, Quat), to: (Vec3, Quat), progress: f32) -> (Vec3, Quat) {
    let t = ease_out_cubic(progress.clamp(0.0, 1.0));
    (from.0.lerp(to.0, t), from.1.slerp(to.1, t))
}

/// Gentle vertical bobbing around the float height.
pub fn bob_height(now: f64) -> f32 {
    FLOAT_POINT.y + BOB_AMPLITUDE * (BOB_RATE * now as f32).sin()
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Start a roll on request: show the die, reset its materials, and launch
/// the body with a fresh random tumble.
pub fn start_requested_rolls(
    mut requests: MessageReader<RollRequested>,
    mut sequencer: ResMut<RollSequencer>,
    mut rng: ResMut<RollRng>,
    assets: Res<DieAssets>,
    config: Res<DieConfig>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut die_query: Query<(&mut Transform, &mut Velocity, &mut RigidBody, &mut Visibility), With<Die>>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();

    let Ok((mut transform, mut velocity, mut body, mut visibility)) = die_query.single_mut()
    else {
        return;
    };

    if !sequencer.begin_roll() {
        debug!("roll request ignored: sequence already running");
        return;
    }

    *visibility = Visibility::Visible;
    reset_roll_materials(&assets, &mut materials, &config.theme);
    launch_die(&mut transform, &mut velocity, &mut body, &mut rng.0);
    info!("die rolled");
}

/// Drive the phase machine from the freshest simulation readout and apply
/// the side effects of each transition.
pub fn advance_sequencer(
    time: Res<Time>,
    mut sequencer: ResMut<RollSequencer>,
    mut completed: MessageWriter<RollCompleted>,
    mut die_query: Query<(&Die, &Transform, &mut Velocity, &mut RigidBody, &mut Visibility)>,
) {
    let Ok((die, transform, mut velocity, mut body, mut visibility)) = die_query.single_mut()
    else {
        return;
    };

    let now = time.elapsed_secs_f64();
    let readout = SimReadout::of(&velocity);
    let (phase, change) = sequencer.phase.step(now, readout);
    sequencer.phase = phase;

    match change {
        Some(PhaseChange::Settled) => {
            info!("die settled");
        }
        Some(PhaseChange::Resolved) => {
            let face = top_face(transform.rotation, &die.faces);
            sequencer.winning_face = Some(face);
            sequencer.settled_pose = Some((transform.translation, transform.rotation));
            freeze_die(&mut velocity, &mut body);
            info!("top face: {}", face);
            completed.write(RollCompleted { face });
        }
        Some(PhaseChange::FloatStarted) => {
            debug!("float display started");
        }
        Some(PhaseChange::FadeStarted) => {
            debug!("fade out started");
        }
        Some(PhaseChange::Hidden) => {
            *visibility = Visibility::Hidden;
            info!("die hidden after fade");
        }
        None => {}
    }
}

/// Manual animation for the scripted phases. While the die is rolling or
/// settled the dynamic body owns the pose and this system leaves it alone.
pub fn animate_presentation(
    time: Res<Time>,
    sequencer: Res<RollSequencer>,
    assets: Res<DieAssets>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut die_query: Query<(&Die, &mut Transform, &mut Visibility), With<Die>>,
) {
    let Ok((die, mut transform, mut visibility)) = die_query.single_mut() else {
        return;
    };
    let now = time.elapsed_secs_f64();

    match sequencer.phase {
        RollPhase::Transitioning { started } => {
            let progress = (((now - started) / TRANSITION_SECS) as f32).clamp(0.0, 1.0);
            let Some(from) = sequencer.settled_pose else {
                return;
            };
            let target_rotation = sequencer
                .winning_face
                .and_then(|label| die.faces.iter().find(|f| f.label == label))
                .map(|f| facing_rotation(f.normal))
                .unwrap_or(Quat::IDENTITY);

            let (translation, rotation) =
                transition_pose(from, (FLOAT_POINT, target_rotation), progress);
            transform.translation = translation;
            transform.rotation = rotation;

            ensure_visible(&mut visibility, "transition");
        }
        RollPhase::Floating { .. } => {
            transform.translation.y = bob_height(now);
            ensure_visible(&mut visibility, "float");

            if let Some(label) = sequencer.winning_face {
                if let Some(handle) = assets.label_materials.get(&label) {
                    if let Some(material) = materials.get_mut(handle) {
                        let hue = (now as f32 * HUE_DEGREES_PER_SEC) % 360.0;
                        let color = Color::hsl(hue, 1.0, 0.6);
                        material.base_color = color;
                        material.emissive = LinearRgba::from(color) * 0.3;
                    }
                }
            }
        }
        RollPhase::Fading { started } => {
            transform.translation.y = bob_height(now);

            let progress = (((now - started) / FADE_SECS) as f32).clamp(0.0, 1.0);
            let opacity = fade_opacity(progress);
            set_die_opacity(&assets, &mut materials, opacity);
        }
        _ => {}
    }
}

fn ensure_visible(visibility: &mut Visibility, phase_name: &str) {
    if *visibility == Visibility::Hidden {
        warn!("die became invisible during {}; forcing visible", phase_name);
        *visibility = Visibility::Visible;
    }
}

/// Restore full opacity and base decal colors for a new roll.
pub fn reset_roll_materials(
    assets: &DieAssets,
    materials: &mut Assets<StandardMaterial>,
    theme: &Theme,
) {
    if let Some(material) = materials.get_mut(&assets.die_material) {
        material.base_color = theme.die_color.with_alpha(1.0);
    }
    if let Some(material) = materials.get_mut(&assets.outline_material) {
        material.base_color = material.base_color.with_alpha(1.0);
    }
    for handle in assets.label_materials.values() {
        if let Some(material) = materials.get_mut(handle) {
            material.base_color = theme.label_color.with_alpha(1.0);
            material.emissive = LinearRgba::BLACK;
        }
    }
}

/// Apply one opacity to the die surface and every decal sub-material.
pub fn set_die_opacity(
    assets: &DieAssets,
    materials: &mut Assets<StandardMaterial>,
    opacity: f32,
) {
    for handle in [&assets.die_material, &assets.outline_material]
        .into_iter()
        .chain(assets.label_materials.values())
    {
        if let Some(material) = materials.get_mut(handle) {
            material.base_color = material.base_color.with_alpha(opacity);
        }
    }
}
