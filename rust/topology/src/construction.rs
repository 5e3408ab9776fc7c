// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction methods for mesh entities.
//!
//! Every entity is created through the mesh, which ensures referential
//! integrity (all referenced sub-entities must exist) and maintains the
//! adjacency index. Polygon construction welds vertices within the mesh
//! tolerance and reuses the edge between an existing vertex pair, so faces
//! added next to each other share their common boundary.

use crate::arena::*;
use crate::error::{Error, Result};
use crate::geometry::{interior_point, signed_area_2d};
use crate::keys::*;

/// Required winding of a loop in the local xy plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    CounterClockwise,
    Clockwise,
}

impl PlanarMesh {
    /// Adds a vertex at the given coordinates without welding.
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> VertexKey {
        self.vertices.insert(VertexData { x, y, z })
    }

    /// Returns an existing vertex within tolerance of the point, or adds one.
    pub fn weld_vertex(&mut self, x: f64, y: f64, z: f64) -> VertexKey {
        let tol_sq = self.tolerance * self.tolerance;
        let existing = self.vertices.iter().find(|(_, v)| {
            let (dx, dy, dz) = (v.x - x, v.y - y, v.z - z);
            dx * dx + dy * dy + dz * dz <= tol_sq
        });
        match existing {
            Some((key, _)) => key,
            None => self.add_vertex(x, y, z),
        }
    }

    /// Returns the edge between two existing vertices, creating it if needed.
    ///
    /// Edges are unique per unordered vertex pair. Returns an error if either
    /// vertex does not exist or both keys name the same vertex.
    pub fn add_edge(&mut self, start: VertexKey, end: VertexKey) -> Result<EdgeKey> {
        if !self.vertices.contains_key(start) {
            return Err(Error::VertexNotFound(start));
        }
        if !self.vertices.contains_key(end) {
            return Err(Error::VertexNotFound(end));
        }
        if start == end {
            return Err(Error::ZeroLengthEdge(start));
        }
        if let Some(existing) = self.find_edge(start, end) {
            return Ok(existing);
        }

        let key = self.edges.insert(EdgeData { start, end });
        self.edge_lookup.insert(pair(start, end), key);
        self.link_vertex_edge(start, key);
        self.link_vertex_edge(end, key);
        Ok(key)
    }

    /// Creates a wire from an ordered list of edges.
    ///
    /// The edges must form a connected chain: each edge shares a vertex with
    /// the next edge. The wire tracks the orientation of each edge to maintain
    /// a consistent traversal direction.
    ///
    /// Returns an error if the edge list is empty or edges are not connected.
    pub fn add_wire(&mut self, edge_keys: &[EdgeKey]) -> Result<WireKey> {
        if edge_keys.is_empty() {
            return Err(Error::EmptyWire);
        }

        for &ek in edge_keys {
            if !self.edges.contains_key(ek) {
                return Err(Error::EdgeNotFound(ek));
            }
        }

        let mut orientations = Vec::with_capacity(edge_keys.len());

        if edge_keys.len() == 1 {
            orientations.push(true);
        } else {
            // First edge orientation follows from the vertex it shares with the second
            let first = &self.edges[edge_keys[0]];
            let second = &self.edges[edge_keys[1]];

            if first.end == second.start || first.end == second.end {
                orientations.push(true);
            } else if first.start == second.start || first.start == second.end {
                orientations.push(false);
            } else {
                return Err(Error::DisconnectedWire(0, 1));
            }

            for i in 1..edge_keys.len() {
                let prev_edge = &self.edges[edge_keys[i - 1]];
                let curr_edge = &self.edges[edge_keys[i]];

                let prev_end = if orientations[i - 1] {
                    prev_edge.end
                } else {
                    prev_edge.start
                };

                if prev_end == curr_edge.start {
                    orientations.push(true);
                } else if prev_end == curr_edge.end {
                    orientations.push(false);
                } else {
                    return Err(Error::DisconnectedWire(i - 1, i));
                }
            }
        }

        Ok(self.insert_wire(edge_keys.to_vec(), orientations))
    }

    /// Stores a wire whose orientations are already known.
    pub(crate) fn insert_wire(&mut self, edges: Vec<EdgeKey>, orientations: Vec<bool>) -> WireKey {
        let uses = edges.clone();
        let key = self.wires.insert(WireData {
            edges,
            orientations,
        });
        for ek in uses {
            self.link_edge_wire(ek, key);
        }
        key
    }

    /// Creates a face from an outer boundary wire.
    ///
    /// The wire must have at least 3 edges to form a valid face.
    pub fn add_face(&mut self, outer_wire: WireKey) -> Result<FaceKey> {
        self.add_face_with_holes(outer_wire, &[])
    }

    /// Creates a face with an outer boundary and inner boundary wires (holes).
    pub fn add_face_with_holes(
        &mut self,
        outer_wire: WireKey,
        inner_wires: &[WireKey],
    ) -> Result<FaceKey> {
        let wire = self
            .wires
            .get(outer_wire)
            .ok_or(Error::WireNotFound(outer_wire))?;

        if wire.edges.len() < 3 {
            return Err(Error::DegenerateFace);
        }

        for &iw in inner_wires {
            if !self.wires.contains_key(iw) {
                return Err(Error::WireNotFound(iw));
            }
        }

        let key = self.faces.insert(FaceData {
            outer_wire,
            inner_wires: inner_wires.to_vec(),
        });

        self.link_wire_face(outer_wire, key);
        for &iw in inner_wires {
            self.link_wire_face(iw, key);
        }

        Ok(key)
    }

    /// Welds a closed point loop into a wire with the requested winding.
    ///
    /// Consecutive points that weld to the same vertex collapse. Loops with
    /// fewer than 3 distinct vertices, or no area, fail with
    /// [`Error::DegenerateFace`] and leave no vertices behind.
    pub fn add_loop(&mut self, points: &[[f64; 2]], winding: Winding) -> Result<WireKey> {
        let mut keys: Vec<VertexKey> = Vec::with_capacity(points.len());
        for p in points {
            let k = self.weld_vertex(p[0], p[1], 0.0);
            if keys.last() != Some(&k) {
                keys.push(k);
            }
        }
        while keys.len() > 1 && keys.first() == keys.last() {
            keys.pop();
        }

        let coords: Vec<[f64; 2]> = keys
            .iter()
            .filter_map(|&k| self.vertices.get(k).map(|v| [v.x, v.y]))
            .collect();
        let area = signed_area_2d(&coords);
        if keys.len() < 3 || area.abs() <= self.tolerance * self.tolerance {
            self.drop_unused_vertices(&keys);
            return Err(Error::DegenerateFace);
        }

        let ccw = area > 0.0;
        if ccw != (winding == Winding::CounterClockwise) {
            keys.reverse();
        }

        let n = keys.len();
        let mut edges = Vec::with_capacity(n);
        let mut orientations = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (keys[i], keys[(i + 1) % n]);
            let ek = self.add_edge(a, b)?;
            orientations.push(self.edges[ek].start == a);
            edges.push(ek);
        }

        Ok(self.insert_wire(edges, orientations))
    }

    /// Adds a polygon face without checking for an enclosing face.
    ///
    /// The outer loop is stored counter-clockwise and holes clockwise.
    /// Degenerate hole loops are skipped.
    pub fn insert_polygon(&mut self, outer: &[[f64; 2]], holes: &[Vec<[f64; 2]>]) -> Result<FaceKey> {
        let outer_wire = self.add_loop(outer, Winding::CounterClockwise)?;
        let mut inner = Vec::with_capacity(holes.len());
        for hole in holes {
            match self.add_loop(hole, Winding::Clockwise) {
                Ok(w) => inner.push(w),
                Err(Error::DegenerateFace) => continue,
                Err(e) => return Err(e),
            }
        }
        self.add_face_with_holes(outer_wire, &inner)
    }

    /// Adds a polygon face, nesting it into an enclosing face.
    ///
    /// When the new face's interior lies inside the region of an existing
    /// face, the new outer boundary is also registered as a hole of the
    /// smallest such face. Erasing the new face afterwards leaves the hole.
    pub fn add_polygon(&mut self, outer: &[[f64; 2]], holes: &[Vec<[f64; 2]>]) -> Result<FaceKey> {
        let host = interior_point(outer, holes).and_then(|p| self.smallest_face_containing(p));
        let face = self.insert_polygon(outer, holes)?;
        if let Some(host) = host {
            self.nest_face(host, face)?;
        }
        Ok(face)
    }

    /// Registers the outer boundary of `inner` as a hole of `host`.
    fn nest_face(&mut self, host: FaceKey, inner: FaceKey) -> Result<()> {
        let outer = self.faces.get(inner).ok_or(Error::FaceNotFound(inner))?.outer_wire;
        let wire = self.wires.get(outer).ok_or(Error::WireNotFound(outer))?;
        let edges: Vec<EdgeKey> = wire.edges.iter().rev().copied().collect();
        let orientations: Vec<bool> = wire.orientations.iter().rev().map(|o| !o).collect();

        let hole = self.insert_wire(edges, orientations);
        self.faces
            .get_mut(host)
            .ok_or(Error::FaceNotFound(host))?
            .inner_wires
            .push(hole);
        self.link_wire_face(hole, host);
        Ok(())
    }

    /// Removes the given vertices if no edge uses them.
    pub(crate) fn drop_unused_vertices(&mut self, keys: &[VertexKey]) {
        for &k in keys {
            let used = self.vertex_to_edges.get(&k).is_some_and(|e| !e.is_empty());
            if !used {
                self.vertex_to_edges.remove(&k);
                self.vertices.remove(k);
            }
        }
    }
}

/// Helper: adds an axis-aligned rectangle face.
pub fn make_rectangle(mesh: &mut PlanarMesh, x0: f64, y0: f64, x1: f64, y1: f64) -> Result<FaceKey> {
    mesh.add_polygon(&[[x0, y0], [x1, y0], [x1, y1], [x0, y1]], &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn weld_reuses_close_vertices() {
        let mut mesh = PlanarMesh::new();
        let a = mesh.weld_vertex(1.0, 1.0, 0.0);
        let b = mesh.weld_vertex(1.0 + 1e-8, 1.0, 0.0);
        let c = mesh.weld_vertex(1.1, 1.0, 0.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(mesh.vertex_count(), 2);
    }

    #[test]
    fn add_edge_is_unique_per_pair() {
        let mut mesh = PlanarMesh::new();
        let a = mesh.add_vertex(0.0, 0.0, 0.0);
        let b = mesh.add_vertex(1.0, 0.0, 0.0);
        let e1 = mesh.add_edge(a, b).unwrap();
        let e2 = mesh.add_edge(b, a).unwrap();
        assert_eq!(e1, e2);
        assert_eq!(mesh.edge_count(), 1);
    }

    #[test]
    fn add_edge_rejects_self_loop() {
        let mut mesh = PlanarMesh::new();
        let a = mesh.add_vertex(0.0, 0.0, 0.0);
        assert!(matches!(mesh.add_edge(a, a), Err(Error::ZeroLengthEdge(_))));
    }

    #[test]
    fn add_edge_invalid_vertex() {
        let mut mesh = PlanarMesh::new();
        let v0 = mesh.add_vertex(0.0, 0.0, 0.0);
        let v1 = mesh.add_vertex(1.0, 0.0, 0.0);
        mesh.vertices.remove(v1);
        assert!(matches!(mesh.add_edge(v0, v1), Err(Error::VertexNotFound(_))));
    }

    #[test]
    fn add_wire_detects_orientation() {
        let mut mesh = PlanarMesh::new();
        let v0 = mesh.add_vertex(0.0, 0.0, 0.0);
        let v1 = mesh.add_vertex(1.0, 0.0, 0.0);
        let v2 = mesh.add_vertex(1.0, 1.0, 0.0);
        let e0 = mesh.add_edge(v0, v1).unwrap();
        let e1 = mesh.add_edge(v2, v1).unwrap();
        let e2 = mesh.add_edge(v2, v0).unwrap();

        let w = mesh.add_wire(&[e0, e1, e2]).unwrap();
        assert_eq!(mesh.wire(w).unwrap().orientations, vec![true, false, true]);
    }

    #[test]
    fn add_wire_disconnected() {
        let mut mesh = PlanarMesh::new();
        let v0 = mesh.add_vertex(0.0, 0.0, 0.0);
        let v1 = mesh.add_vertex(1.0, 0.0, 0.0);
        let v2 = mesh.add_vertex(5.0, 5.0, 0.0);
        let v3 = mesh.add_vertex(6.0, 5.0, 0.0);
        let e0 = mesh.add_edge(v0, v1).unwrap();
        let e1 = mesh.add_edge(v2, v3).unwrap();
        assert!(matches!(mesh.add_wire(&[e0, e1]), Err(Error::DisconnectedWire(0, 1))));
    }

    #[test]
    fn add_wire_empty() {
        let mut mesh = PlanarMesh::new();
        assert!(matches!(mesh.add_wire(&[]), Err(Error::EmptyWire)));
    }

    #[test]
    fn add_face_degenerate() {
        let mut mesh = PlanarMesh::new();
        let v0 = mesh.add_vertex(0.0, 0.0, 0.0);
        let v1 = mesh.add_vertex(1.0, 0.0, 0.0);
        let e0 = mesh.add_edge(v0, v1).unwrap();
        let w = mesh.add_wire(&[e0]).unwrap();
        assert!(matches!(mesh.add_face(w), Err(Error::DegenerateFace)));
    }

    #[test]
    fn add_loop_normalizes_winding() {
        let mut mesh = PlanarMesh::new();
        let cw = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];
        let w = mesh.add_loop(&cw, Winding::CounterClockwise).unwrap();
        assert_relative_eq!(signed_area_2d(&mesh.wire_points(w).unwrap()), 1.0, epsilon = 1e-12);

        let h = mesh.add_loop(&cw, Winding::Clockwise).unwrap();
        assert_relative_eq!(signed_area_2d(&mesh.wire_points(h).unwrap()), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn add_loop_collapses_duplicates() {
        let mut mesh = PlanarMesh::new();
        let pts = [[0.0, 0.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]];
        let w = mesh.add_loop(&pts, Winding::CounterClockwise).unwrap();
        assert_eq!(mesh.wire(w).unwrap().edges.len(), 3);
    }

    #[test]
    fn degenerate_loop_leaves_nothing_behind() {
        let mut mesh = PlanarMesh::new();
        let line = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]];
        assert!(matches!(
            mesh.add_loop(&line, Winding::CounterClockwise),
            Err(Error::DegenerateFace)
        ));
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
    }

    #[test]
    fn adjacent_polygons_share_edge() {
        let mut mesh = PlanarMesh::new();
        make_rectangle(&mut mesh, 0.0, 0.0, 1.0, 1.0).unwrap();
        make_rectangle(&mut mesh, 1.0, 0.0, 2.0, 1.0).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.edge_count(), 7);
    }

    #[test]
    fn add_polygon_nests_inside_host() {
        let mut mesh = PlanarMesh::new();
        let host = make_rectangle(&mut mesh, 0.0, 0.0, 4.0, 4.0).unwrap();
        let inner = make_rectangle(&mut mesh, 1.0, 1.0, 2.0, 2.0).unwrap();

        assert_eq!(mesh.face(host).unwrap().inner_wires.len(), 1);
        assert!(mesh.face(inner).unwrap().inner_wires.is_empty());
        assert_relative_eq!(mesh.face_area(host).unwrap(), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn insert_polygon_does_not_nest() {
        let mut mesh = PlanarMesh::new();
        let host = make_rectangle(&mut mesh, 0.0, 0.0, 4.0, 4.0).unwrap();
        mesh.insert_polygon(&[[1.0, 1.0], [2.0, 1.0], [2.0, 2.0]], &[])
            .unwrap();
        assert!(mesh.face(host).unwrap().inner_wires.is_empty());
    }

    #[test]
    fn insert_polygon_with_hole() {
        let mut mesh = PlanarMesh::new();
        let outer = [[0.0, 0.0], [3.0, 0.0], [3.0, 3.0], [0.0, 3.0]];
        let hole = vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 2.0]];
        let f = mesh.insert_polygon(&outer, &[hole]).unwrap();
        assert_relative_eq!(mesh.face_area(f).unwrap(), 8.0, epsilon = 1e-12);
    }
}
