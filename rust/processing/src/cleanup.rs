// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge cleanup shared by the merge and subtraction passes.
//!
//! Every edge whose raw face-use count is not exactly one is erased. Seams
//! between pieces of the same region border two faces and dissolve, fusing
//! the pieces; edges with no face simply disappear. Erasing can expose new
//! unsettled edges, so the pass repeats until the mesh is settled.

use nalgebra::Point3;
use shadow_caster_geometry::PlaneFrame;
use shadow_caster_topology::{EdgeKey, PlanarMesh};

use crate::diagnostics::{CleanupStage, Diagnostic, Diagnostics, EdgeAnomaly};
use crate::error::Result;

/// Totals of one [`settle`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub passes: usize,
    pub erased_edges: usize,
    pub settled: bool,
}

/// Erases unsettled edges until every edge borders exactly one face.
///
/// `frame` maps mesh coordinates to world space for the diagnostics.
pub fn settle(
    mesh: &mut PlanarMesh,
    frame: &PlaneFrame,
    max_passes: usize,
    stage: CleanupStage,
    diags: &mut Diagnostics,
) -> Result<CleanupSummary> {
    let mut summary = CleanupSummary::default();

    while summary.passes < max_passes {
        let uses = mesh.unsettled_edges();
        if uses.is_empty() {
            break;
        }
        summary.passes += 1;

        for u in &uses {
            let mut kinds = Vec::new();
            if u.has_repeated_face() {
                kinds.push(EdgeAnomaly::RepeatedFace);
            }
            if u.raw > 2 {
                kinds.push(EdgeAnomaly::TooManyFaces);
            }
            for kind in kinds {
                let (from, to) = edge_world(mesh, frame, u.edge);
                diags.push(Diagnostic::EdgeAnomaly {
                    kind,
                    from,
                    to,
                    raw: u.raw,
                    unique: u.unique,
                });
            }
        }

        let keys: Vec<_> = uses.iter().map(|u| u.edge).collect();
        let report = mesh.erase_edges(&keys)?;
        mesh.remove_loose_geometry();
        summary.erased_edges += report.erased_edges;
        diags.push(Diagnostic::ErasedEdges {
            stage,
            count: report.erased_edges,
        });
    }

    summary.settled = mesh.is_settled();
    if !summary.settled {
        diags.push(Diagnostic::UnsettledMesh {
            stage,
            remaining: mesh.unsettled_edges().len(),
        });
    }
    Ok(summary)
}

fn edge_world(mesh: &PlanarMesh, frame: &PlaneFrame, edge: EdgeKey) -> (Point3<f64>, Point3<f64>) {
    let end = |v| {
        mesh.vertex_coords(v)
            .map(|c| frame.to_world_2d([c[0], c[1]]))
            .unwrap_or(frame.origin)
    };
    match mesh.edge_vertices(edge) {
        Some((a, b)) => (end(a), end(b)),
        None => (frame.origin, frame.origin),
    }
}
