//! Seven-segment number decals for the die faces.
//!
//! Each face gets a decal group: a cluster of thin cylinders spelling the
//! face label, positioned along the face normal just outside the surface and
//! oriented to face outward. The pure layout functions here are exercised by
//! the spawn code in `systems::setup`.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use crate::dice::types::Theme;

/// Distance from the die center to each decal group, along the face normal.
pub const LABEL_OFFSET: f32 = 1.6;

const SEGMENT_RADIUS: f32 = 0.06;
const LONG_SEGMENT_LENGTH: f32 = 0.4;
const SHORT_SEGMENT_LENGTH: f32 = 0.3;
const UNDERSCORE_RADIUS: f32 = 0.04;
const UNDERSCORE_LENGTH: f32 = 0.32;

/// Lift off the face plane so segments sit on the surface, not inside it.
const SEGMENT_LIFT: f32 = 0.05;

/// Segment order: top, top-right, bottom-right, middle, bottom-left,
/// top-left, bottom. Horizontal bars (0, 3, 6) use the long cylinder.
const DIGIT_PATTERNS: [[bool; 7]; 10] = [
    [true, true, true, false, true, true, true],    // 0
    [false, true, true, false, false, false, false], // 1
    [true, true, false, true, true, false, true],   // 2
    [true, false, false, true, true, true, true],   // 3
    [false, true, true, true, false, true, false],  // 4
    [true, false, true, true, false, true, true],   // 5
    [true, false, true, true, true, true, true],    // 6
    [true, true, true, false, false, false, false], // 7
    [true, true, true, true, true, true, true],     // 8
    [true, true, true, true, false, true, true],    // 9
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentShape {
    Long,
    Short,
    Underscore,
}

/// One cylinder of a decal group, in the group's local frame.
#[derive(Clone, Copy, Debug)]
pub struct SegmentPlacement {
    pub shape: SegmentShape,
    pub position: Vec3,
    pub rotation: Quat,
}

fn digit_segments(digit: u32, offset_x: f32, out: &mut Vec<SegmentPlacement>) {
    let pattern = DIGIT_PATTERNS[digit.min(9) as usize];

    let positions: [(f32, f32); 7] = [
        (offset_x, 0.2),         // top
        (offset_x + 0.15, 0.1),  // top-right
        (offset_x + 0.15, -0.1), // bottom-right
        (offset_x, 0.0),         // middle
        (offset_x - 0.15, -0.1), // bottom-left
        (offset_x - 0.15, 0.1),  // top-left
        (offset_x, -0.2),        // bottom
    ];

    for (i, &lit) in pattern.iter().enumerate() {
        if !lit {
            continue;
        }
        let horizontal = i == 0 || i == 3 || i == 6;
        let (x, y) = positions[i];
        out.push(SegmentPlacement {
            shape: if horizontal {
                SegmentShape::Long
            } else {
                SegmentShape::Short
            },
            position: Vec3::new(x, y, SEGMENT_LIFT),
            rotation: if horizontal {
                Quat::from_rotation_z(FRAC_PI_2)
            } else {
                Quat::IDENTITY
            },
        });
    }
}

/// Layout for a full face label, 1..=20.
///
/// Two-digit labels render as side-by-side digit groups. 13 and 20 carry
/// their own horizontal offsets for readability; 6 and 9 get an underscore
/// so they cannot be confused with each other.
pub fn label_segments(label: u32) -> Vec<SegmentPlacement> {
    let mut segments = Vec::new();

    if label < 10 {
        digit_segments(label, 0.0, &mut segments);
    } else {
        let tens = label / 10;
        let ones = label % 10;
        let (first_x, second_x) = match label {
            20 => (-0.25, 0.25),
            13 => (-0.1, 0.1),
            _ => (-0.3, 0.2),
        };
        digit_segments(tens, first_x, &mut segments);
        digit_segments(ones, second_x, &mut segments);
    }

    if label == 6 || label == 9 {
        segments.push(SegmentPlacement {
            shape: SegmentShape::Underscore,
            position: Vec3::new(0.0, -0.35, SEGMENT_LIFT),
            rotation: Quat::from_rotation_z(FRAC_PI_2),
        });
    }

    segments
}

/// Rotation orienting a decal group (+Z forward) out along a face normal.
pub fn label_orientation(normal: Vec3) -> Quat {
    // Guard the poles against a degenerate rotation arc.
    if normal.y.abs() > 0.99 {
        if normal.y > 0.0 {
            Quat::from_rotation_x(-FRAC_PI_2)
        } else {
            Quat::from_rotation_x(FRAC_PI_2)
        }
    } else {
        Quat::from_rotation_arc(Vec3::Z, normal)
    }
}

/// Shared cylinder meshes for the three segment shapes.
#[derive(Clone)]
pub struct LabelMeshes {
    long: Handle<Mesh>,
    short: Handle<Mesh>,
    underscore: Handle<Mesh>,
}

impl LabelMeshes {
    pub fn new(meshes: &mut Assets<Mesh>) -> Self {
        Self {
            long: meshes.add(Cylinder::new(SEGMENT_RADIUS, LONG_SEGMENT_LENGTH)),
            short: meshes.add(Cylinder::new(SEGMENT_RADIUS, SHORT_SEGMENT_LENGTH)),
            underscore: meshes.add(Cylinder::new(UNDERSCORE_RADIUS, UNDERSCORE_LENGTH)),
        }
    }

    pub fn handle(&self, shape: SegmentShape) -> Handle<Mesh> {
        match shape {
            SegmentShape::Long => self.long.clone(),
            SegmentShape::Short => self.short.clone(),
            SegmentShape::Underscore => self.underscore.clone(),
        }
    }
}

/// Base (unhighlighted) decal material.
pub fn base_label_material(theme: &Theme) -> StandardMaterial {
    StandardMaterial {
        base_color: theme.label_color,
        perceptual_roughness: 0.2,
        emissive: LinearRgba::BLACK,
        alpha_mode: AlphaMode::Blend,
        ..default()
    }
}

/// One material handle per label 1..=20, so a single face's digits can be
/// recolored without touching the others.
pub fn label_materials(
    materials: &mut Assets<StandardMaterial>,
    theme: &Theme,
) -> HashMap<u32, Handle<StandardMaterial>> {
    (1..=20)
        .map(|label| (label, materials.add(base_label_material(theme))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_label_has_segments() {
        for label in 1..=20 {
            assert!(
                !label_segments(label).is_empty(),
                "label {} has no segments",
                label
            );
        }
    }

    #[test]
    fn test_digit_one_is_two_vertical_segments() {
        let segments = label_segments(1);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.shape == SegmentShape::Short));
    }

    #[test]
    fn test_digit_eight_lights_all_seven() {
        assert_eq!(label_segments(8).len(), 7);
    }

    #[test]
    fn test_six_and_nine_carry_underscore() {
        for label in [6, 9] {
            let segments = label_segments(label);
            assert_eq!(
                segments
                    .iter()
                    .filter(|s| s.shape == SegmentShape::Underscore)
                    .count(),
                1,
                "label {} needs exactly one underscore",
                label
            );
        }
        assert!(label_segments(8)
            .iter()
            .all(|s| s.shape != SegmentShape::Underscore));
    }

    #[test]
    fn test_two_digit_labels_spread_horizontally() {
        for label in 10..=20 {
            let segments = label_segments(label);
            assert!(segments.iter().any(|s| s.position.x < -0.01));
            assert!(segments.iter().any(|s| s.position.x > 0.01));
        }
    }

    #[test]
    fn test_thirteen_and_twenty_use_special_offsets() {
        // 13 packs its digits tighter than the general layout; 20 is wider.
        let narrow = label_segments(13)
            .iter()
            .map(|s| s.position.x.abs())
            .fold(0.0_f32, f32::max);
        let general = label_segments(14)
            .iter()
            .map(|s| s.position.x.abs())
            .fold(0.0_f32, f32::max);
        let wide = label_segments(20)
            .iter()
            .map(|s| s.position.x.abs())
            .fold(0.0_f32, f32::max);
        assert!(narrow < general);
        assert!((wide - general).abs() > 0.01);
    }

    #[test]
    fn test_label_orientation_points_outward() {
        let normal = Vec3::new(1.0, 1.0, 1.0).normalize();
        let forward = label_orientation(normal) * Vec3::Z;
        assert!((forward - normal).length() < 1e-4);
    }

    #[test]
    fn test_label_orientation_handles_poles() {
        let up = label_orientation(Vec3::Y) * Vec3::Z;
        assert!((up - Vec3::Y).length() < 1e-4);
        let down = label_orientation(Vec3::NEG_Y) * Vec3::Z;
        assert!((down - Vec3::NEG_Y).length() < 1e-4);
    }

    #[test]
    fn test_label_materials_cover_all_labels_once() {
        let mut materials = Assets::<StandardMaterial>::default();
        let map = label_materials(&mut materials, &Theme::default());
        assert_eq!(map.len(), 20);
        for label in 1..=20 {
            assert!(map.contains_key(&label), "missing label {}", label);
        }
        let unique: std::collections::HashSet<_> = map.values().map(|h| h.id()).collect();
        assert_eq!(unique.len(), 20, "label materials must be distinct");
    }
}
