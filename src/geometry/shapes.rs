//! Built-in shape data for synthetic buffer sets.

use glam::{Vec2, Vec3};

/// Full-screen quad as two triangles in normalized device coordinates.
pub const QUAD_VERTICES: [Vec3; 6] = [
    Vec3::new(-1.0, -1.0, 0.0),
    Vec3::new(1.0, -1.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(-1.0, -1.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(-1.0, 1.0, 0.0),
];

/// Texture coordinates matching [`QUAD_VERTICES`].
pub const QUAD_UVS: [Vec2; 6] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

const CUBE_CORNERS: [Vec3; 8] = [
    Vec3::new(-0.5, -0.5, -0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(0.5, 0.5, -0.5),
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(-0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(-0.5, 0.5, 0.5),
];

const CUBE_EDGES: [(usize, usize); 12] = [
    // back face
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    // front face
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    // connecting edges
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Edges of a unit cube centered at the origin, as a line list (two vertices per edge).
pub fn line_bounds() -> Vec<Vec3> {
    CUBE_EDGES
        .iter()
        .flat_map(|&(a, b)| [CUBE_CORNERS[a], CUBE_CORNERS[b]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_bounds() {
        let lines = line_bounds();
        assert_eq!(lines.len(), 24);
        for pair in lines.chunks(2) {
            // Every edge is axis aligned with unit length
            assert!(((pair[1] - pair[0]).length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_quad_matches_uvs() {
        assert_eq!(QUAD_VERTICES.len(), QUAD_UVS.len());
    }
}
