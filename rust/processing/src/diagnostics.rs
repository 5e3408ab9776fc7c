// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recoverable problems found while casting.
//!
//! Each entry is logged through `tracing` when it is recorded and kept so
//! the caller can draw traces (rays, edges) at the reported world positions.

use std::fmt;

use nalgebra::Point3;
use rustc_hash::FxHashMap;
use shadow_caster_geometry::{LoopRole, RayDefect, TriangleDefect};

/// Which kind of mesh anomaly an edge showed before cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeAnomaly {
    /// One face runs over the edge more than once.
    RepeatedFace,
    /// More than two face uses.
    TooManyFaces,
}

/// Pass that ran a cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanupStage {
    Merge,
    Ground,
    Clip,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A projection ray was parallel, zero-length or ran toward the sun.
    DegenerateRay {
        role: LoopRole,
        defect: RayDefect,
        from: Point3<f64>,
        to: Point3<f64>,
    },
    /// A triangle candidate was dropped.
    SkippedTriangle {
        defect: TriangleDefect,
        corners: [Point3<f64>; 3],
    },
    /// An unsettled edge with an unusual face count. The edge is still erased.
    EdgeAnomaly {
        kind: EdgeAnomaly,
        from: Point3<f64>,
        to: Point3<f64>,
        raw: usize,
        unique: usize,
    },
    /// Edges erased by one cleanup pass.
    ErasedEdges { stage: CleanupStage, count: usize },
    /// Faces removed under a ground footprint.
    MarkedGroundRegion {
        footprint: usize,
        faces: usize,
        area: f64,
    },
    /// A projected face without area was not merged.
    DegenerateShadow { area: f64 },
    /// Edges still not bordering exactly one face after the last pass.
    UnsettledMesh { stage: CleanupStage, remaining: usize },
}

impl Diagnostic {
    /// Short stable name of the entry kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::DegenerateRay { .. } => "degenerate_ray",
            Diagnostic::SkippedTriangle { .. } => "skipped_triangle",
            Diagnostic::EdgeAnomaly { .. } => "edge_anomaly",
            Diagnostic::ErasedEdges { .. } => "erased_edges",
            Diagnostic::MarkedGroundRegion { .. } => "marked_ground_region",
            Diagnostic::DegenerateShadow { .. } => "degenerate_shadow",
            Diagnostic::UnsettledMesh { .. } => "unsettled_mesh",
        }
    }

    /// Anomalies are logged as warnings, progress entries as debug.
    pub fn is_anomaly(&self) -> bool {
        !matches!(
            self,
            Diagnostic::ErasedEdges { .. } | Diagnostic::MarkedGroundRegion { .. }
        )
    }
}

fn pt(p: &Point3<f64>) -> String {
    format!("({:.6}, {:.6}, {:.6})", p.x, p.y, p.z)
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DegenerateRay { role, defect, from, to } => {
                write!(f, "{defect:?} ray on {role:?} loop: {} -> {}", pt(from), pt(to))
            }
            Diagnostic::SkippedTriangle { defect, corners } => write!(
                f,
                "{defect:?} triangle skipped: {} {} {}",
                pt(&corners[0]),
                pt(&corners[1]),
                pt(&corners[2])
            ),
            Diagnostic::EdgeAnomaly {
                kind: EdgeAnomaly::RepeatedFace,
                from,
                to,
                raw,
                unique,
            } => write!(
                f,
                "edge connected to same face multiple times ({raw} uses, {unique} faces): {} -> {}",
                pt(from),
                pt(to)
            ),
            Diagnostic::EdgeAnomaly {
                kind: EdgeAnomaly::TooManyFaces,
                from,
                to,
                raw,
                ..
            } => write!(f, "edge connected to too many faces ({raw}): {} -> {}", pt(from), pt(to)),
            Diagnostic::ErasedEdges { stage, count } => write!(f, "{stage:?} cleanup erased {count} edges"),
            Diagnostic::MarkedGroundRegion { footprint, faces, area } => {
                write!(f, "ground footprint {footprint}: removed {faces} faces, area {area:.6}")
            }
            Diagnostic::DegenerateShadow { area } => write!(f, "projected face has no area ({area:.3e})"),
            Diagnostic::UnsettledMesh { stage, remaining } => {
                write!(f, "{stage:?} cleanup left {remaining} unsettled edges")
            }
        }
    }
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry and logs it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_anomaly() {
            tracing::warn!(kind = diagnostic.kind(), "{}", diagnostic);
        } else {
            tracing::debug!(kind = diagnostic.kind(), "{}", diagnostic);
        }
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of entries of a kind (see [`Diagnostic::kind`]).
    pub fn count(&self, kind: &str) -> usize {
        self.entries.iter().filter(|d| d.kind() == kind).count()
    }

    /// Entry counts per kind.
    pub fn summary(&self) -> FxHashMap<&'static str, usize> {
        let mut counts = FxHashMap::default();
        for d in &self.entries {
            *counts.entry(d.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Ray segments to draw, as `(from, to)` pairs.
    pub fn rays(&self) -> Vec<(Point3<f64>, Point3<f64>)> {
        self.entries
            .iter()
            .filter_map(|d| match d {
                Diagnostic::DegenerateRay { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
