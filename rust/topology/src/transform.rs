// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping face loops out of the mesh's local plane.
//!
//! The mesh itself is never modified; callers pass the 4x4 matrix that takes
//! local xy coordinates into the frame they want.

use nalgebra::{Matrix4, Point3};

use crate::arena::PlanarMesh;
use crate::geometry::Polygon2;
use crate::keys::*;

/// A face's boundary loops mapped into 3D.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLoops3 {
    pub outer: Vec<Point3<f64>>,
    pub holes: Vec<Vec<Point3<f64>>>,
}

impl PlanarMesh {
    /// Maps the loops of one face through `matrix`.
    pub fn face_loops_transformed(&self, key: FaceKey, matrix: &Matrix4<f64>) -> Option<FaceLoops3> {
        let face = self.faces.get(key)?;
        let map_wire = |wk: WireKey| -> Option<Vec<Point3<f64>>> {
            self.wire_vertices_ordered(wk)?
                .into_iter()
                .map(|vk| {
                    let v = self.vertices.get(vk)?;
                    Some(matrix.transform_point(&Point3::new(v.x, v.y, v.z)))
                })
                .collect()
        };
        let outer = map_wire(face.outer_wire)?;
        let holes = face
            .inner_wires
            .iter()
            .map(|&w| map_wire(w))
            .collect::<Option<Vec<_>>>()?;
        Some(FaceLoops3 { outer, holes })
    }

    /// Maps every face through `matrix`, in face key order.
    pub fn world_loops(&self, matrix: &Matrix4<f64>) -> Vec<FaceLoops3> {
        self.face_keys()
            .into_iter()
            .filter_map(|f| self.face_loops_transformed(f, matrix))
            .collect()
    }

    /// Maps every face into another planar coordinate system, dropping z.
    pub fn transformed_polygons(&self, matrix: &Matrix4<f64>) -> Vec<Polygon2> {
        let flatten = |pts: Vec<Point3<f64>>| pts.into_iter().map(|p| [p.x, p.y]).collect();
        self.world_loops(matrix)
            .into_iter()
            .map(|l| Polygon2 {
                outer: flatten(l.outer),
                holes: l.holes.into_iter().map(flatten).collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::make_rectangle;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn world_loops_apply_matrix() {
        let mut mesh = PlanarMesh::new();
        make_rectangle(&mut mesh, 0.0, 0.0, 1.0, 1.0).unwrap();
        let lift = Matrix4::new_translation(&Vector3::new(0.0, 0.0, 5.0));

        let loops = mesh.world_loops(&lift);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].outer.len(), 4);
        assert!(loops[0].outer.iter().all(|p| (p.z - 5.0).abs() < 1e-12));
    }

    #[test]
    fn transformed_polygons_keep_holes() {
        let mut mesh = PlanarMesh::new();
        make_rectangle(&mut mesh, 0.0, 0.0, 4.0, 4.0).unwrap();
        make_rectangle(&mut mesh, 1.0, 1.0, 2.0, 2.0).unwrap();
        let shift = Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0));

        let polys = mesh.transformed_polygons(&shift);
        let total: f64 = polys.iter().map(|p| p.area()).sum();
        assert_eq!(polys.len(), 2);
        assert_relative_eq!(total, 16.0, epsilon = 1e-12);
        assert!(polys.iter().any(|p| p.holes.len() == 1));
    }
}
