// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Shadow Caster Topology
//!
//! Planar boundary-representation mesh used to accumulate shadow regions.
//!
//! Vertices, edges, wires and faces are stored in slot maps with an upward
//! adjacency index that counts every use of an edge. On top of the storage
//! the mesh offers the editing primitives a shadow merge needs:
//!
//! - polygon insertion with vertex welding and shared edges
//!   ([`PlanarMesh::add_polygon`] nests a face inside an enclosing face);
//! - imprinting ([`PlanarMesh::split_edges_at_vertices`]);
//! - face replacement ([`PlanarMesh::replace_face`]);
//! - edge erasure with face healing ([`PlanarMesh::erase_edges`]).
//!
//! All geometry lives in the mesh's local xy plane; mapping to and from 3D is
//! done by the caller with a 4x4 matrix.

pub mod arena;
pub mod construction;
pub mod editing;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod query;
pub mod transform;
pub mod traversal;

pub use arena::{PlanarMesh, DEFAULT_TOLERANCE};
pub use construction::Winding;
pub use editing::HealReport;
pub use error::{Error, Result};
pub use geometry::{interior_point, point_in_ring, signed_area_2d, Polygon2};
pub use keys::{EdgeKey, FaceKey, VertexKey, WireKey};
pub use query::EdgeUse;
pub use transform::FaceLoops3;
pub use traversal::HalfEdge;
