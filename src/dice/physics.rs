//! Rigid-body glue for the die and ground.
//!
//! The die is dynamic only while a roll is in flight; the sequencer flips it
//! to kinematic for the scripted display phases, after which the body simply
//! follows whatever pose the presentation systems write into `Transform`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;

use crate::dice::mesh::{create_die_collider, die_faces};
use crate::dice::types::{Die, Ground};

/// Where the die is re-launched from: above and behind the origin.
pub const LAUNCH_POSITION: Vec3 = Vec3::new(0.0, 2.0, -4.0);

/// Upward launch velocity.
pub const LAUNCH_VELOCITY: Vec3 = Vec3::new(0.0, 13.0, 0.0);

/// Per-axis angular velocity is drawn uniformly from ±`SPIN_SCALE / 2`.
pub const SPIN_SCALE: f32 = 12.0;

pub const GROUND_Y: f32 = -3.0;
pub const DIE_MASS: f32 = 1.0;
pub const DIE_FRICTION: f32 = 0.4;
pub const DIE_RESTITUTION: f32 = 0.3;

/// Uniform random tumble, one component per axis.
pub fn random_spin(rng: &mut impl Rng) -> Vec3 {
    let half = SPIN_SCALE / 2.0;
    Vec3::new(
        rng.gen_range(-half..half),
        rng.gen_range(-half..half),
        rng.gen_range(-half..half),
    )
}

/// Physics components for the die entity. Spawned kinematic: the body only
/// becomes dynamic when a roll launches it.
pub fn die_body() -> impl Bundle {
    (
        Die { faces: die_faces() },
        RigidBody::KinematicPositionBased,
        create_die_collider(),
        ColliderMassProperties::Mass(DIE_MASS),
        Friction::coefficient(DIE_FRICTION),
        Restitution::coefficient(DIE_RESTITUTION),
        Velocity::zero(),
    )
}

/// Spawn the static, infinite ground plane below the die.
pub fn spawn_ground(commands: &mut Commands) {
    commands.spawn((
        Ground,
        RigidBody::Fixed,
        Collider::halfspace(Vec3::Y).unwrap_or(Collider::cuboid(100.0, 0.1, 100.0)),
        Friction::coefficient(DIE_FRICTION),
        Restitution::coefficient(DIE_RESTITUTION),
        Transform::from_xyz(0.0, GROUND_Y, 0.0),
    ));
}

/// Reset the die to the launch point with a fresh upward throw and tumble.
pub fn launch_die(
    transform: &mut Transform,
    velocity: &mut Velocity,
    body: &mut RigidBody,
    rng: &mut impl Rng,
) {
    *body = RigidBody::Dynamic;
    transform.translation = LAUNCH_POSITION;
    velocity.linvel = LAUNCH_VELOCITY;
    velocity.angvel = random_spin(rng);
}

/// Halt simulation response so the pose can be animated by hand.
pub fn freeze_die(velocity: &mut Velocity, body: &mut RigidBody) {
    *body = RigidBody::KinematicPositionBased;
    velocity.linvel = Vec3::ZERO;
    velocity.angvel = Vec3::ZERO;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_spin_bounded_and_nonzero() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let spin = random_spin(&mut rng);
            for component in spin.to_array() {
                assert!(component.abs() <= SPIN_SCALE / 2.0);
            }
            assert!(spin != Vec3::ZERO);
        }
    }

    #[test]
    fn test_random_spin_deterministic_for_seed() {
        let a = random_spin(&mut StdRng::seed_from_u64(42));
        let b = random_spin(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_launch_resets_pose_and_throws_upward() {
        let mut transform = Transform::from_xyz(5.0, -1.0, 2.0);
        let mut velocity = Velocity::zero();
        let mut body = RigidBody::KinematicPositionBased;
        let mut rng = StdRng::seed_from_u64(1);

        launch_die(&mut transform, &mut velocity, &mut body, &mut rng);

        assert_eq!(transform.translation, LAUNCH_POSITION);
        assert_eq!(velocity.linvel, LAUNCH_VELOCITY);
        assert_eq!(body, RigidBody::Dynamic);
        assert!(velocity.angvel != Vec3::ZERO);
    }

    #[test]
    fn test_freeze_halts_motion() {
        let mut velocity = Velocity {
            linvel: Vec3::new(1.0, 2.0, 3.0),
            angvel: Vec3::new(4.0, 5.0, 6.0),
        };
        let mut body = RigidBody::Dynamic;

        freeze_die(&mut velocity, &mut body);

        assert_eq!(velocity.linvel, Vec3::ZERO);
        assert_eq!(velocity.angvel, Vec3::ZERO);
        assert_eq!(body, RigidBody::KinematicPositionBased);
    }
}
