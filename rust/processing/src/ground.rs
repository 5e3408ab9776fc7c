// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Removal of shadow lying under faces that rest on the target plane.

use nalgebra::Point3;
use shadow_caster_geometry::bool2d::{difference, intersection, total_area};
use shadow_caster_geometry::{PlaneFrame, Shape2D};
use shadow_caster_topology::{PlanarMesh, Polygon2};

use crate::accumulator::{to_polygon, to_shape};
use crate::cleanup::settle;
use crate::diagnostics::{CleanupStage, Diagnostic, Diagnostics};
use crate::error::Result;

/// Outer loop of a face coplanar with the target.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundFootprint {
    /// World points
    pub world: Vec<Point3<f64>>,
    /// The same points in the shadow frame
    pub ring: Vec<[f64; 2]>,
}

impl GroundFootprint {
    pub fn new(world: Vec<Point3<f64>>, frame: &PlaneFrame) -> Self {
        let ring = world.iter().map(|p| frame.to_local_2d(p)).collect();
        Self { world, ring }
    }

    fn shape(&self) -> Shape2D {
        Shape2D::from_arrays(&self.ring, &[])
    }
}

/// Imprints each footprint into the shadow, then deletes what it covers.
///
/// Footprints are handled one after another; holes of ground faces are
/// ignored. Returns the area removed.
pub fn subtract_footprints(
    mesh: &mut PlanarMesh,
    frame: &PlaneFrame,
    footprints: &[GroundFootprint],
    max_passes: usize,
    diags: &mut Diagnostics,
) -> Result<f64> {
    let mut removed = 0.0;

    for (index, footprint) in footprints.iter().enumerate() {
        if mesh.is_empty() {
            break;
        }
        let clip = [footprint.shape()];

        for fk in mesh.face_keys() {
            let Some(polygon) = mesh.face_polygon(fk) else {
                continue;
            };
            let subject = [to_shape(&polygon)];
            let inside = intersection(&subject, &clip);
            if inside.is_empty() {
                continue;
            }
            let pieces: Vec<Polygon2> = inside
                .iter()
                .chain(difference(&subject, &clip).iter())
                .map(to_polygon)
                .collect();
            mesh.replace_face(fk, &pieces)?;
        }
        mesh.split_edges_at_vertices();

        let region = mesh.faces_inside(&footprint.ring);
        let area = region.iter().filter_map(|&f| mesh.face_area(f)).fold(0.0, |acc, a| acc + a);
        diags.push(Diagnostic::MarkedGroundRegion {
            footprint: index,
            faces: region.len(),
            area,
        });
        mesh.erase_faces(&region);
        mesh.remove_loose_geometry();
        removed += area;

        settle(mesh, frame, max_passes, CleanupStage::Ground, diags)?;
    }

    Ok(removed)
}

/// Keeps only the part of the shadow inside `outline`.
///
/// Returns the area removed.
pub fn clip_to_target(
    mesh: &mut PlanarMesh,
    frame: &PlaneFrame,
    outline: &Polygon2,
    max_passes: usize,
    diags: &mut Diagnostics,
) -> Result<f64> {
    let eps = mesh.tolerance() * mesh.tolerance();
    let clip = [to_shape(outline)];
    let before = mesh.total_area();
    let mut changed = false;

    for fk in mesh.face_keys() {
        let Some(polygon) = mesh.face_polygon(fk) else {
            continue;
        };
        let kept = intersection(&[to_shape(&polygon)], &clip);
        let kept_area = total_area(&kept);
        if (polygon.area() - kept_area).abs() <= eps {
            continue;
        }
        let pieces: Vec<Polygon2> = kept.iter().map(to_polygon).collect();
        mesh.replace_face(fk, &pieces)?;
        changed = true;
    }

    if changed {
        mesh.split_edges_at_vertices();
        settle(mesh, frame, max_passes, CleanupStage::Clip, diags)?;
    }
    Ok((before - mesh.total_area()).max(0.0))
}
