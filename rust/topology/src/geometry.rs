// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric queries on mesh entities.
//!
//! The mesh is planar: all measures are taken in the local xy plane.

use nalgebra::Point3;

use crate::arena::PlanarMesh;
use crate::keys::*;

/// A polygon in local 2D coordinates: one outer loop and zero or more holes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon2 {
    pub outer: Vec<[f64; 2]>,
    pub holes: Vec<Vec<[f64; 2]>>,
}

impl Polygon2 {
    /// Creates a polygon without holes.
    pub fn new(outer: Vec<[f64; 2]>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Area enclosed by the outer loop minus the hole areas.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| signed_area_2d(h).abs()).sum();
        signed_area_2d(&self.outer).abs() - holes
    }

    /// Returns `true` if `p` lies inside the outer loop and outside every hole.
    pub fn contains(&self, p: [f64; 2]) -> bool {
        point_in_ring(p, &self.outer) && !self.holes.iter().any(|h| point_in_ring(p, h))
    }
}

/// Signed area of a closed 2D loop (shoelace). Positive when counter-clockwise.
pub fn signed_area_2d(points: &[[f64; 2]]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i][0] * points[j][1] - points[j][0] * points[i][1];
    }
    area * 0.5
}

/// Ray-casting point-in-polygon test.
pub fn point_in_ring(point: [f64; 2], polygon: &[[f64; 2]]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;

    let mut j = n - 1;
    for i in 0..n {
        let yi = polygon[i][1];
        let yj = polygon[j][1];
        let xi = polygon[i][0];
        let xj = polygon[j][0];

        if ((yi > point[1]) != (yj > point[1]))
            && (point[0] < (xj - xi) * (point[1] - yi) / (yj - yi) + xi)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// A point strictly inside the region bounded by `outer` minus `holes`.
///
/// Triangulates the region and returns the centroid of its largest triangle,
/// which stays clear of the boundary even for thin or concave shapes.
pub fn interior_point(outer: &[[f64; 2]], holes: &[Vec<[f64; 2]>]) -> Option<[f64; 2]> {
    if outer.len() < 3 {
        return None;
    }

    let mut flat: Vec<f64> = Vec::with_capacity(2 * outer.len());
    let mut hole_indices = Vec::with_capacity(holes.len());
    for p in outer {
        flat.extend_from_slice(p);
    }
    for hole in holes.iter().filter(|h| h.len() >= 3) {
        hole_indices.push(flat.len() / 2);
        for p in hole {
            flat.extend_from_slice(p);
        }
    }

    let indices = earcutr::earcut(&flat, &hole_indices, 2).unwrap_or_default();
    let pt = |i: usize| [flat[2 * i], flat[2 * i + 1]];

    let best = indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (pt(t[0]), pt(t[1]), pt(t[2]));
            let area = signed_area_2d(&[a, b, c]).abs();
            (area, [(a[0] + b[0] + c[0]) / 3.0, (a[1] + b[1] + c[1]) / 3.0])
        })
        .max_by(|x, y| x.0.total_cmp(&y.0));

    match best {
        Some((area, centroid)) if area > 0.0 => Some(centroid),
        _ => None,
    }
}

impl PlanarMesh {
    /// Returns the position of a vertex as a nalgebra `Point3`.
    pub fn vertex_point(&self, key: VertexKey) -> Option<Point3<f64>> {
        self.vertices.get(key).map(|v| Point3::new(v.x, v.y, v.z))
    }

    /// Returns a wire's vertices as local 2D points in traversal order.
    pub fn wire_points(&self, key: WireKey) -> Option<Vec<[f64; 2]>> {
        self.wire_vertices_ordered(key)?
            .into_iter()
            .map(|vk| self.vertices.get(vk).map(|v| [v.x, v.y]))
            .collect()
    }

    /// Returns the boundary loops of a face as a [`Polygon2`].
    pub fn face_polygon(&self, key: FaceKey) -> Option<Polygon2> {
        let face = self.faces.get(key)?;
        let outer = self.wire_points(face.outer_wire)?;
        let holes = face
            .inner_wires
            .iter()
            .map(|&w| self.wire_points(w))
            .collect::<Option<Vec<_>>>()?;
        Some(Polygon2 { outer, holes })
    }

    /// Computes the area of a face (outer area minus hole areas).
    pub fn face_area(&self, key: FaceKey) -> Option<f64> {
        self.face_polygon(key).map(|p| p.area())
    }

    /// Sum of all face areas.
    ///
    /// An empty mesh has area `+0.0`.
    pub fn total_area(&self) -> f64 {
        // f64::sum starts from -0.0
        self.faces.keys().filter_map(|f| self.face_area(f)).fold(0.0, |acc, a| acc + a)
    }

    /// A sample point strictly inside the face region.
    pub fn face_interior_point(&self, key: FaceKey) -> Option<[f64; 2]> {
        let polygon = self.face_polygon(key)?;
        interior_point(&polygon.outer, &polygon.holes)
    }

    /// Returns `true` if `p` lies inside the face region (holes excluded).
    pub fn face_contains_point(&self, key: FaceKey, p: [f64; 2]) -> bool {
        self.face_polygon(key).is_some_and(|poly| poly.contains(p))
    }

    /// The face of smallest area whose region contains `p`.
    pub fn smallest_face_containing(&self, p: [f64; 2]) -> Option<FaceKey> {
        self.face_keys()
            .into_iter()
            .filter_map(|f| {
                let poly = self.face_polygon(f)?;
                poly.contains(p).then(|| (f, poly.area()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(f, _)| f)
    }

    /// Axis-aligned 2D bounds of all vertices as `(min, max)`.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut iter = self.vertices.values();
        let first = iter.next()?;
        let mut min = [first.x, first.y];
        let mut max = min;
        for v in iter {
            min[0] = min[0].min(v.x);
            min[1] = min[1].min(v.y);
            max[0] = max[0].max(v.x);
            max[1] = max[1].max(v.y);
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::make_rectangle;
    use approx::assert_relative_eq;

    #[test]
    fn test_signed_area_orientation() {
        let ccw = [[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [0.0, 1.0]];
        let cw: Vec<[f64; 2]> = ccw.iter().rev().copied().collect();
        assert_relative_eq!(signed_area_2d(&ccw), 2.0);
        assert_relative_eq!(signed_area_2d(&cw), -2.0);
        assert_eq!(signed_area_2d(&ccw[..2]), 0.0);
    }

    #[test]
    fn test_point_in_ring() {
        let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        assert!(point_in_ring([0.5, 0.5], &square));
        assert!(!point_in_ring([1.5, 0.5], &square));
    }

    #[test]
    fn test_interior_point_of_concave_shape() {
        // U shape: the centroid of the vertices falls in the notch
        let u = [
            [0.0, 0.0],
            [3.0, 0.0],
            [3.0, 3.0],
            [2.0, 3.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 3.0],
            [0.0, 3.0],
        ];
        let p = interior_point(&u, &[]).unwrap();
        assert!(point_in_ring(p, &u));
        assert!(!(p[0] > 1.0 && p[0] < 2.0 && p[1] > 1.0));
    }

    #[test]
    fn test_interior_point_avoids_hole() {
        let outer = [[0.0, 0.0], [3.0, 0.0], [3.0, 3.0], [0.0, 3.0]];
        let hole = vec![[0.5, 0.5], [0.5, 2.5], [2.5, 2.5], [2.5, 0.5]];
        let poly = Polygon2 {
            outer: outer.to_vec(),
            holes: vec![hole.clone()],
        };
        let p = interior_point(&outer, &[hole]).unwrap();
        assert!(poly.contains(p));
    }

    #[test]
    fn test_interior_point_degenerate() {
        assert!(interior_point(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]], &[]).is_none());
        assert!(interior_point(&[[0.0, 0.0], [1.0, 0.0]], &[]).is_none());
    }

    #[test]
    fn test_face_area_and_bounds() {
        let mut mesh = PlanarMesh::new();
        let f = make_rectangle(&mut mesh, 0.0, 0.0, 3.0, 2.0).unwrap();
        assert_relative_eq!(mesh.face_area(f).unwrap(), 6.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.total_area(), 6.0, epsilon = 1e-12);
        assert_eq!(mesh.bounds(), Some(([0.0, 0.0], [3.0, 2.0])));
    }

    #[test]
    fn test_empty_mesh_area_is_positive_zero() {
        let mut mesh = PlanarMesh::new();
        assert!(mesh.total_area().is_sign_positive());
        let f = make_rectangle(&mut mesh, 0.0, 0.0, 1.0, 1.0).unwrap();
        mesh.erase_faces(&[f]);
        assert_eq!(mesh.total_area(), 0.0);
        assert!(mesh.total_area().is_sign_positive());
    }

    #[test]
    fn test_face_contains_point_respects_holes() {
        let mut mesh = PlanarMesh::new();
        let host = make_rectangle(&mut mesh, 0.0, 0.0, 4.0, 4.0).unwrap();
        make_rectangle(&mut mesh, 1.0, 1.0, 2.0, 2.0).unwrap();
        assert!(mesh.face_contains_point(host, [3.0, 3.0]));
        assert!(!mesh.face_contains_point(host, [1.5, 1.5]));
        assert_ne!(mesh.smallest_face_containing([1.5, 1.5]), Some(host));
    }
}
