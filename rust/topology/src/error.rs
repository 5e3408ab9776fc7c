// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for mesh operations.

use crate::keys::{EdgeKey, FaceKey, VertexKey, WireKey};

/// Result type alias for mesh operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during mesh operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Edges in a wire are not connected end-to-end.
    #[error("wire edges are not connected: edge {0} endpoint does not match edge {1} startpoint")]
    DisconnectedWire(usize, usize),

    /// A wire must have at least one edge.
    #[error("wire must have at least one edge")]
    EmptyWire,

    /// A loop collapsed to fewer than 3 distinct vertices after welding.
    #[error("face outer wire has fewer than 3 edges")]
    DegenerateFace,

    /// An edge would join a vertex to itself.
    #[error("edge endpoints coincide: {0:?}")]
    ZeroLengthEdge(VertexKey),

    /// Vertex key not found in the mesh.
    #[error("vertex not found: {0:?}")]
    VertexNotFound(VertexKey),

    /// Edge key not found in the mesh.
    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeKey),

    /// Wire key not found in the mesh.
    #[error("wire not found: {0:?}")]
    WireNotFound(WireKey),

    /// Face key not found in the mesh.
    #[error("face not found: {0:?}")]
    FaceNotFound(FaceKey),
}
