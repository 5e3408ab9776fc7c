// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON result written by the command line tool.

use serde::Serialize;
use shadow_caster_processing::{ShadowContainer, ShadowReport};

#[derive(Debug, Serialize)]
pub struct ShadowOutput {
    pub name: String,
    pub area: f64,
    pub face_count: usize,
    pub merged_faces: usize,
    pub ground_footprints: usize,
    pub skipped_faces: usize,
    pub degenerate_faces: usize,
    pub faces: Vec<FaceOutput>,
    pub diagnostics: Vec<DiagnosticOutput>,
}

/// One shadow face in world coordinates.
#[derive(Debug, Serialize)]
pub struct FaceOutput {
    pub outer: Vec<[f64; 3]>,
    pub holes: Vec<Vec<[f64; 3]>>,
}

#[derive(Debug, Serialize)]
pub struct DiagnosticOutput {
    pub kind: &'static str,
    pub message: String,
}

fn xyz(points: &[nalgebra::Point3<f64>]) -> Vec<[f64; 3]> {
    points.iter().map(|p| [p.x, p.y, p.z]).collect()
}

impl ShadowOutput {
    pub fn new(container: &ShadowContainer, report: &ShadowReport) -> Self {
        let faces = container
            .world_loops()
            .into_iter()
            .map(|l| FaceOutput {
                outer: xyz(&l.outer),
                holes: l.holes.iter().map(|h| xyz(h)).collect(),
            })
            .collect();
        let diagnostics = report
            .diagnostics
            .iter()
            .map(|d| DiagnosticOutput {
                kind: d.kind(),
                message: d.to_string(),
            })
            .collect();

        Self {
            name: container.name.clone(),
            area: report.area,
            face_count: report.face_count,
            merged_faces: report.merged_faces,
            ground_footprints: report.ground_footprints,
            skipped_faces: report.skipped_faces,
            degenerate_faces: report.degenerate_faces,
            faces,
            diagnostics,
        }
    }
}
