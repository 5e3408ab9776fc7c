// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh-wide queries used by the cleanup and subtraction passes.

use crate::arena::PlanarMesh;
use crate::geometry::point_in_ring;
use crate::keys::*;

/// Face-use counts of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeUse {
    pub edge: EdgeKey,
    /// Uses counted with multiplicity.
    pub raw: usize,
    /// Distinct faces.
    pub unique: usize,
}

impl EdgeUse {
    /// A single face runs over this edge more than once.
    pub fn has_repeated_face(&self) -> bool {
        self.raw != self.unique
    }
}

impl PlanarMesh {
    /// Face-use counts for one edge.
    pub fn edge_use(&self, key: EdgeKey) -> EdgeUse {
        let mut faces = self.edge_faces(key);
        let raw = faces.len();
        faces.sort();
        faces.dedup();
        EdgeUse {
            edge: key,
            raw,
            unique: faces.len(),
        }
    }

    /// Every edge whose raw face-use count is not exactly one.
    pub fn unsettled_edges(&self) -> Vec<EdgeUse> {
        self.edge_keys()
            .into_iter()
            .map(|e| self.edge_use(e))
            .filter(|u| u.raw != 1)
            .collect()
    }

    /// `true` when every edge borders exactly one face.
    pub fn is_settled(&self) -> bool {
        self.edge_keys()
            .into_iter()
            .all(|e| self.edge_face_count(e) == 1)
    }

    /// Faces whose interior sample point lies inside `ring`.
    pub fn faces_inside(&self, ring: &[[f64; 2]]) -> Vec<FaceKey> {
        self.face_keys()
            .into_iter()
            .filter(|&f| {
                self.face_interior_point(f)
                    .is_some_and(|p| point_in_ring(p, ring))
            })
            .collect()
    }
}
