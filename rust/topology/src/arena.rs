// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for planar mesh entities.
//!
//! The [`PlanarMesh`] is the central owner of all mesh data. Every entity
//! (vertex, edge, wire, face) lives inside slot maps with stable, generational
//! keys. Upward adjacency indices answer "which wires use this edge" and
//! "which face owns this wire" without scanning.
//!
//! ## Edge use counting
//!
//! The edge → wire index keeps one entry per *use*, not per wire. A wire that
//! runs over the same edge twice (a slit, or a hole touching its own outer
//! loop) contributes two entries. The settled state of a shadow mesh is that
//! every edge has exactly one use.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::keys::*;

/// Default welding tolerance in model units.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Data stored for a vertex: a point in plane-local coordinates.
#[derive(Debug, Clone)]
pub struct VertexData {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Data stored for an edge: a segment between two distinct vertices.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub start: VertexKey,
    pub end: VertexKey,
}

/// Data stored for a wire: a closed, ordered loop of edges.
#[derive(Debug, Clone)]
pub struct WireData {
    /// Edges in order. Each edge's end vertex must equal the next edge's start
    /// vertex (or the reverse, tracked by `orientations`).
    pub edges: Vec<EdgeKey>,
    /// `true` if edge[i] is traversed forward (start→end), `false` if reversed.
    pub orientations: Vec<bool>,
}

/// Data stored for a face: a planar region bounded by one outer wire and
/// zero or more inner wires (holes).
///
/// Outer wires run counter-clockwise and inner wires clockwise in the mesh's
/// local xy plane.
#[derive(Debug, Clone)]
pub struct FaceData {
    pub outer_wire: WireKey,
    pub inner_wires: Vec<WireKey>,
}

/// A planar boundary-representation mesh.
///
/// # Example
///
/// ```
/// use shadow_caster_topology::PlanarMesh;
///
/// let mut mesh = PlanarMesh::new();
/// let face = mesh
///     .add_polygon(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]], &[])
///     .unwrap();
///
/// assert_eq!(mesh.face_count(), 1);
/// assert_eq!(mesh.edge_count(), 4);
/// assert!((mesh.face_area(face).unwrap() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct PlanarMesh {
    // Entity storage
    pub(crate) vertices: SlotMap<VertexKey, VertexData>,
    pub(crate) edges: SlotMap<EdgeKey, EdgeData>,
    pub(crate) wires: SlotMap<WireKey, WireData>,
    pub(crate) faces: SlotMap<FaceKey, FaceData>,

    // Upward adjacency: child → parents
    pub(crate) vertex_to_edges: FxHashMap<VertexKey, Vec<EdgeKey>>,
    pub(crate) edge_to_wires: FxHashMap<EdgeKey, Vec<WireKey>>,
    pub(crate) wire_to_face: FxHashMap<WireKey, FaceKey>,

    // Edges are unique per unordered vertex pair
    pub(crate) edge_lookup: FxHashMap<(VertexKey, VertexKey), EdgeKey>,

    pub(crate) tolerance: f64,
}

impl PlanarMesh {
    /// Creates a new, empty mesh with the default welding tolerance.
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_TOLERANCE)
    }

    /// Creates a new, empty mesh that welds vertices closer than `tolerance`.
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            wires: SlotMap::with_key(),
            faces: SlotMap::with_key(),

            vertex_to_edges: FxHashMap::default(),
            edge_to_wires: FxHashMap::default(),
            wire_to_face: FxHashMap::default(),

            edge_lookup: FxHashMap::default(),

            tolerance,
        }
    }

    /// Returns the welding tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns `true` if the mesh holds no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    // --- Vertex operations ---

    /// Returns the vertex data for the given key, or `None` if not found.
    pub fn vertex(&self, key: VertexKey) -> Option<&VertexData> {
        self.vertices.get(key)
    }

    /// Returns the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the coordinates of a vertex as `[x, y, z]`.
    pub fn vertex_coords(&self, key: VertexKey) -> Option<[f64; 3]> {
        self.vertices.get(key).map(|v| [v.x, v.y, v.z])
    }

    // --- Edge operations ---

    /// Returns the edge data for the given key, or `None` if not found.
    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeData> {
        self.edges.get(key)
    }

    /// Returns the number of edges in the mesh.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the edge joining two vertices, in either direction.
    pub fn find_edge(&self, a: VertexKey, b: VertexKey) -> Option<EdgeKey> {
        self.edge_lookup.get(&pair(a, b)).copied()
    }

    // --- Wire operations ---

    /// Returns the wire data for the given key, or `None` if not found.
    pub fn wire(&self, key: WireKey) -> Option<&WireData> {
        self.wires.get(key)
    }

    /// Returns the number of wires in the mesh.
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    // --- Face operations ---

    /// Returns the face data for the given key, or `None` if not found.
    pub fn face(&self, key: FaceKey) -> Option<&FaceData> {
        self.faces.get(key)
    }

    /// Returns the number of faces in the mesh.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    // --- Adjacency index helpers ---

    /// Register that an edge uses a vertex (upward adjacency).
    pub(crate) fn link_vertex_edge(&mut self, vertex: VertexKey, edge: EdgeKey) {
        let edges = self.vertex_to_edges.entry(vertex).or_default();
        if !edges.contains(&edge) {
            edges.push(edge);
        }
    }

    /// Register one use of an edge by a wire.
    pub(crate) fn link_edge_wire(&mut self, edge: EdgeKey, wire: WireKey) {
        self.edge_to_wires.entry(edge).or_default().push(wire);
    }

    /// Register that a face owns a wire.
    pub(crate) fn link_wire_face(&mut self, wire: WireKey, face: FaceKey) {
        self.wire_to_face.insert(wire, face);
    }

    /// Drops every use of `edge` by `wire`.
    pub(crate) fn unlink_edge_wire(&mut self, edge: EdgeKey, wire: WireKey) {
        if let Some(uses) = self.edge_to_wires.get_mut(&edge) {
            uses.retain(|w| *w != wire);
            if uses.is_empty() {
                self.edge_to_wires.remove(&edge);
            }
        }
    }
}

impl Default for PlanarMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical (unordered) key for a vertex pair.
pub(crate) fn pair(a: VertexKey, b: VertexKey) -> (VertexKey, VertexKey) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
