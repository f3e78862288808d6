//! Icosahedron geometry for the d20.
//!
//! Builds the render mesh, the matching convex-hull collider, and the
//! per-face centroid/normal table that face labeling and top-face detection
//! share. Faces are enumerated in the fixed order of `ICOSAHEDRON_FACES`;
//! the label of face `i` is `i + 1`.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::dice::types::DieFace;

/// Circumradius of the die: every vertex sits at this distance.
pub const DIE_RADIUS: f32 = 2.0;

/// Triangular faces of the icosahedron as vertex indices. The order is
/// load-bearing: labels, decals, and result detection all index into it.
pub const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 1, 8],
    [0, 8, 4],
    [0, 4, 5],
    [0, 5, 9],
    [0, 9, 1],
    [1, 6, 8],
    [8, 6, 10],
    [8, 10, 4],
    [4, 10, 2],
    [4, 2, 5],
    [5, 2, 11],
    [5, 11, 9],
    [9, 11, 7],
    [9, 7, 1],
    [1, 7, 6],
    [3, 6, 7],
    [3, 10, 6],
    [3, 2, 10],
    [3, 11, 2],
    [3, 7, 11],
];

/// The 12 icosahedron vertices, scaled so each lies at `DIE_RADIUS`.
pub fn icosahedron_vertices() -> Vec<Vec3> {
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let s = DIE_RADIUS / (1.0 + phi * phi).sqrt();

    vec![
        Vec3::new(0.0, 1.0, phi) * s,
        Vec3::new(0.0, -1.0, phi) * s,
        Vec3::new(0.0, 1.0, -phi) * s,
        Vec3::new(0.0, -1.0, -phi) * s,
        Vec3::new(1.0, phi, 0.0) * s,
        Vec3::new(-1.0, phi, 0.0) * s,
        Vec3::new(1.0, -phi, 0.0) * s,
        Vec3::new(-1.0, -phi, 0.0) * s,
        Vec3::new(phi, 0.0, 1.0) * s,
        Vec3::new(-phi, 0.0, 1.0) * s,
        Vec3::new(phi, 0.0, -1.0) * s,
        Vec3::new(-phi, 0.0, -1.0) * s,
    ]
}

/// Enumerate the 20 faces in table order, labeling them 1..=20.
pub fn die_faces() -> Vec<DieFace> {
    let vertices = icosahedron_vertices();

    ICOSAHEDRON_FACES
        .iter()
        .enumerate()
        .map(|(i, face)| {
            let v0 = vertices[face[0]];
            let v1 = vertices[face[1]];
            let v2 = vertices[face[2]];
            let centroid = (v0 + v1 + v2) / 3.0;
            DieFace {
                label: (i + 1) as u32,
                centroid,
                normal: centroid.normalize(),
            }
        })
        .collect()
}

/// Flat-shaded render mesh for the die.
pub fn create_die_mesh() -> Mesh {
    let vertices = icosahedron_vertices();
    let mut positions = Vec::new();
    let mut normals = Vec::new();

    for face in &ICOSAHEDRON_FACES {
        let v0 = vertices[face[0]];
        let v1 = vertices[face[1]];
        let v2 = vertices[face[2]];

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let normal = edge1.cross(edge2).normalize();
        let n = normal.to_array();

        positions.push(v0.to_array());
        positions.push(v1.to_array());
        positions.push(v2.to_array());

        normals.push(n);
        normals.push(n);
        normals.push(n);
    }

    let num_vertices = positions.len();
    let indices: Vec<u32> = (0..num_vertices as u32).collect();
    let uvs: Vec<[f32; 2]> = positions.iter().map(|_| [0.5, 0.5]).collect();

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(indices))
}

/// Collision shape built from the same vertex list as the render mesh.
pub fn create_die_collider() -> Collider {
    let vertices = icosahedron_vertices();
    Collider::convex_hull(&vertices).unwrap_or(Collider::ball(DIE_RADIUS))
}

/// The 30 unique edges of the icosahedron, for the wireframe overlay.
pub fn icosahedron_edges() -> Vec<(Vec3, Vec3)> {
    let vertices = icosahedron_vertices();
    let mut seen = std::collections::BTreeSet::new();

    for face in &ICOSAHEDRON_FACES {
        for (a, b) in [
            (face[0], face[1]),
            (face[1], face[2]),
            (face[2], face[0]),
        ] {
            seen.insert((a.min(b), a.max(b)));
        }
    }

    seen.iter()
        .map(|&(a, b)| (vertices[a], vertices[b]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_on_circumsphere() {
        for v in icosahedron_vertices() {
            assert!(
                (v.length() - DIE_RADIUS).abs() < 1e-4,
                "vertex {:?} not at radius {}",
                v,
                DIE_RADIUS
            );
        }
    }

    #[test]
    fn test_twenty_faces_labeled_in_order() {
        let faces = die_faces();
        assert_eq!(faces.len(), 20);
        for (i, face) in faces.iter().enumerate() {
            assert_eq!(face.label, (i + 1) as u32);
        }
    }

    #[test]
    fn test_face_normals_are_unit_and_outward() {
        for face in die_faces() {
            assert!((face.normal.length() - 1.0).abs() < 1e-5);
            // Outward: the normal points the same way as the centroid.
            assert!(face.normal.dot(face.centroid) > 0.0);
        }
    }

    #[test]
    fn test_face_centroids_inside_circumsphere() {
        for face in die_faces() {
            let len = face.centroid.length();
            assert!(len > 1.0 && len < DIE_RADIUS, "centroid length {}", len);
        }
    }

    #[test]
    fn test_thirty_unique_edges() {
        assert_eq!(icosahedron_edges().len(), 30);
    }

    #[test]
    fn test_mesh_has_sixty_flat_shaded_vertices() {
        let mesh = create_die_mesh();
        assert_eq!(mesh.count_vertices(), 60);
    }
}
