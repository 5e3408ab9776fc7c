// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Traversal methods for navigating the mesh hierarchy.
//!
//! Supports both downward traversal (face → wires → edges → vertices) and
//! upward traversal (edge → wires → faces) via the adjacency index.

use rustc_hash::FxHashSet;

use crate::arena::PlanarMesh;
use crate::keys::*;

/// One directed use of an edge inside a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    pub edge: EdgeKey,
    pub from: VertexKey,
    pub to: VertexKey,
}

// =============================================================================
// Downward traversal
// =============================================================================

impl PlanarMesh {
    /// Returns the start and end vertex keys of an edge.
    pub fn edge_vertices(&self, key: EdgeKey) -> Option<(VertexKey, VertexKey)> {
        self.edges.get(key).map(|e| (e.start, e.end))
    }

    /// Returns the vertex keys of a wire in traversal order.
    ///
    /// A vertex visited twice (a pinch) appears twice.
    pub fn wire_vertices_ordered(&self, key: WireKey) -> Option<Vec<VertexKey>> {
        let wire = self.wires.get(key)?;
        let mut vertices = Vec::with_capacity(wire.edges.len());

        for (i, &ek) in wire.edges.iter().enumerate() {
            let edge = self.edges.get(ek)?;
            let start = if wire.orientations[i] {
                edge.start
            } else {
                edge.end
            };
            vertices.push(start);
        }

        Some(vertices)
    }

    /// Returns the directed edge uses of a wire in traversal order.
    pub fn wire_half_edges(&self, key: WireKey) -> Option<Vec<HalfEdge>> {
        let wire = self.wires.get(key)?;
        wire.edges
            .iter()
            .zip(&wire.orientations)
            .map(|(&ek, &forward)| {
                let e = self.edges.get(ek)?;
                Some(if forward {
                    HalfEdge { edge: ek, from: e.start, to: e.end }
                } else {
                    HalfEdge { edge: ek, from: e.end, to: e.start }
                })
            })
            .collect()
    }

    /// Returns the edge keys of a wire.
    pub fn wire_edges(&self, key: WireKey) -> Option<&[EdgeKey]> {
        self.wires.get(key).map(|w| w.edges.as_slice())
    }

    /// Returns the outer wire followed by the inner wires of a face.
    pub fn face_wires(&self, key: FaceKey) -> Option<Vec<WireKey>> {
        let face = self.faces.get(key)?;
        let mut wires = Vec::with_capacity(1 + face.inner_wires.len());
        wires.push(face.outer_wire);
        wires.extend(&face.inner_wires);
        Some(wires)
    }

    /// Returns all unique edge keys bounding a face.
    pub fn face_edges(&self, key: FaceKey) -> Option<FxHashSet<EdgeKey>> {
        let mut set = FxHashSet::default();
        for wk in self.face_wires(key)? {
            if let Some(wire) = self.wires.get(wk) {
                set.extend(&wire.edges);
            }
        }
        Some(set)
    }

    /// Returns the outer wire of a face.
    pub fn face_outer_wire(&self, key: FaceKey) -> Option<WireKey> {
        self.faces.get(key).map(|f| f.outer_wire)
    }

    /// Returns the inner (hole) wires of a face.
    pub fn face_inner_wires(&self, key: FaceKey) -> Option<&[WireKey]> {
        self.faces.get(key).map(|f| f.inner_wires.as_slice())
    }

    /// Returns every face key, sorted for deterministic iteration.
    pub fn face_keys(&self) -> Vec<FaceKey> {
        let mut keys: Vec<FaceKey> = self.faces.keys().collect();
        keys.sort();
        keys
    }

    /// Returns every edge key, sorted for deterministic iteration.
    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        let mut keys: Vec<EdgeKey> = self.edges.keys().collect();
        keys.sort();
        keys
    }

    /// Returns every vertex key, sorted for deterministic iteration.
    pub fn vertex_keys(&self) -> Vec<VertexKey> {
        let mut keys: Vec<VertexKey> = self.vertices.keys().collect();
        keys.sort();
        keys
    }
}

// =============================================================================
// Upward traversal
// =============================================================================

impl PlanarMesh {
    /// Returns one wire entry per use of the edge.
    pub fn edge_wires(&self, key: EdgeKey) -> &[WireKey] {
        self.edge_to_wires
            .get(&key)
            .map(|w| w.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the face owning a wire.
    pub fn wire_face(&self, key: WireKey) -> Option<FaceKey> {
        self.wire_to_face.get(&key).copied()
    }

    /// Returns one face entry per use of the edge.
    ///
    /// A face whose boundary runs over the edge twice appears twice.
    pub fn edge_faces(&self, key: EdgeKey) -> Vec<FaceKey> {
        self.edge_wires(key)
            .iter()
            .filter_map(|w| self.wire_face(*w))
            .collect()
    }

    /// Number of face uses of an edge, counted with multiplicity.
    pub fn edge_face_count(&self, key: EdgeKey) -> usize {
        self.edge_faces(key).len()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::make_rectangle;

    #[test]
    fn wire_vertices_follow_orientation() {
        let mut mesh = PlanarMesh::new();
        let f = make_rectangle(&mut mesh, 0.0, 0.0, 1.0, 1.0).unwrap();
        let outer = mesh.face_outer_wire(f).unwrap();

        let verts = mesh.wire_vertices_ordered(outer).unwrap();
        let halves = mesh.wire_half_edges(outer).unwrap();
        assert_eq!(verts.len(), 4);
        for (i, h) in halves.iter().enumerate() {
            assert_eq!(h.from, verts[i]);
            assert_eq!(h.to, verts[(i + 1) % 4]);
        }
    }

    #[test]
    fn shared_edge_has_two_faces() {
        let mut mesh = PlanarMesh::new();
        let a = make_rectangle(&mut mesh, 0.0, 0.0, 1.0, 1.0).unwrap();
        let b = make_rectangle(&mut mesh, 1.0, 0.0, 2.0, 1.0).unwrap();

        let shared: Vec<EdgeKey> = mesh
            .edge_keys()
            .into_iter()
            .filter(|&e| mesh.edge_face_count(e) == 2)
            .collect();
        assert_eq!(shared.len(), 1);
        let faces = mesh.edge_faces(shared[0]);
        assert!(faces.contains(&a) && faces.contains(&b));
    }

    #[test]
    fn face_edges_and_wires() {
        let mut mesh = PlanarMesh::new();
        let f = make_rectangle(&mut mesh, 0.0, 0.0, 2.0, 1.0).unwrap();
        assert_eq!(mesh.face_edges(f).unwrap().len(), 4);
        assert_eq!(mesh.face_wires(f).unwrap().len(), 1);
    }

    #[test]
    fn every_rectangle_corner_has_two_edges() {
        let mut mesh = PlanarMesh::new();
        make_rectangle(&mut mesh, 0.0, 0.0, 1.0, 1.0).unwrap();
        for vk in mesh.vertex_keys() {
            assert_eq!(mesh.vertex_to_edges[&vk].len(), 2);
        }
    }
}
