// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Incremental union of projected faces into the shadow mesh.
//!
//! Each source face is first built as a standalone group: a planar mesh in
//! its own frame, with the target's axes and the first projected point as
//! origin. Holes are carved, every group face is triangulated, and each
//! triangle is cut down to the part the shadow does not cover yet. Both
//! operands of that boolean are expressed in the group frame. The pieces are
//! then flattened into the shadow mesh, imprinted, and the seams dissolved.

use nalgebra::Point3;
use shadow_caster_geometry::bool2d::difference;
use shadow_caster_geometry::{triangulate_loops, PlaneFrame, ProjectedPolygon, Shape2D};
use shadow_caster_topology::{signed_area_2d, Error as MeshError, FaceKey, PlanarMesh, Polygon2};

use crate::cleanup::{settle, CleanupSummary};
use crate::config::ShadowConfig;
use crate::context::TargetContext;
use crate::diagnostics::{CleanupStage, Diagnostic, Diagnostics};
use crate::error::Result;

/// What happened to one merged face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Pieces were added to the shadow; zero when already covered.
    Merged { pieces: usize },
    /// The projection had no area.
    Degenerate,
}

/// A source face under construction, in its own frame.
struct ShadowGroup {
    frame: PlaneFrame,
    mesh: PlanarMesh,
}

impl ShadowGroup {
    fn new(frame: PlaneFrame, tolerance: f64) -> Self {
        Self {
            frame,
            mesh: PlanarMesh::with_tolerance(tolerance),
        }
    }

    fn local(&self, points: &[Point3<f64>]) -> Vec<[f64; 2]> {
        points.iter().map(|p| self.frame.to_local_2d(p)).collect()
    }

    /// Adds the outer face, then each hole as a nested face, then erases
    /// the hole faces so only their boundaries remain as holes.
    fn carve(&mut self, outer: &[[f64; 2]], holes: &[Vec<[f64; 2]>]) -> Result<Option<FaceKey>> {
        let face = match self.mesh.add_polygon(outer, &[]) {
            Ok(f) => f,
            Err(MeshError::DegenerateFace) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut hole_faces = Vec::with_capacity(holes.len());
        for hole in holes {
            match self.mesh.add_polygon(hole, &[]) {
                Ok(f) => hole_faces.push(f),
                Err(MeshError::DegenerateFace) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.mesh.erase_faces(&hole_faces);
        self.mesh.remove_loose_geometry();
        Ok(Some(face))
    }

    /// Replaces every face by its valid triangles.
    fn triangulate(&mut self, diags: &mut Diagnostics) -> Result<()> {
        let tolerance = self.mesh.tolerance();
        let lift = |ring: &[[f64; 2]]| -> Vec<Point3<f64>> {
            ring.iter().map(|p| Point3::new(p[0], p[1], 0.0)).collect()
        };

        for fk in self.mesh.face_keys() {
            let Some(polygon) = self.mesh.face_polygon(fk) else {
                continue;
            };
            let holes: Vec<Vec<Point3<f64>>> = polygon.holes.iter().map(|h| lift(h.as_slice())).collect();
            let tris = triangulate_loops(&lift(polygon.outer.as_slice()), &holes, tolerance)?;

            for skipped in &tris.skipped {
                diags.push(Diagnostic::SkippedTriangle {
                    defect: skipped.defect,
                    corners: skipped.corners.map(|c| self.frame.to_world(&c)),
                });
            }

            let pieces: Vec<Polygon2> = tris
                .triangles
                .iter()
                .map(|t| Polygon2::new(t.iter().map(|p| [p.x, p.y]).collect()))
                .collect();
            self.mesh.replace_face(fk, &pieces)?;
        }
        Ok(())
    }

    /// Cuts every face down to the part outside `covered`.
    fn subtract_covered(&mut self, covered: &[Shape2D]) -> Result<()> {
        if covered.is_empty() {
            return Ok(());
        }
        for fk in self.mesh.face_keys() {
            let Some(polygon) = self.mesh.face_polygon(fk) else {
                continue;
            };
            let subject = Shape2D::from_arrays(&polygon.outer, &polygon.holes);
            let pieces: Vec<Polygon2> = difference(&[subject], covered)
                .iter()
                .map(to_polygon)
                .collect();
            self.mesh.replace_face(fk, &pieces)?;
        }
        Ok(())
    }
}

pub(crate) fn to_polygon(shape: &Shape2D) -> Polygon2 {
    let (outer, holes) = shape.to_arrays();
    Polygon2 { outer, holes }
}

pub(crate) fn to_shape(polygon: &Polygon2) -> Shape2D {
    Shape2D::from_arrays(&polygon.outer, &polygon.holes)
}

/// The running shadow region, stored in the target frame.
pub struct ShadowAccumulator<'c> {
    ctx: &'c TargetContext,
    mesh: PlanarMesh,
    max_cleanup_passes: usize,
    merged: usize,
}

impl<'c> ShadowAccumulator<'c> {
    pub fn new(ctx: &'c TargetContext, config: &ShadowConfig) -> Self {
        Self {
            ctx,
            mesh: PlanarMesh::with_tolerance(ctx.tolerance()),
            max_cleanup_passes: config.max_cleanup_passes,
            merged: 0,
        }
    }

    pub fn mesh(&self) -> &PlanarMesh {
        &self.mesh
    }

    pub fn into_mesh(self) -> PlanarMesh {
        self.mesh
    }

    /// Faces merged so far, not counting degenerate ones
    pub fn merged(&self) -> usize {
        self.merged
    }

    /// Merges one projected face with its projected holes.
    pub fn merge(
        &mut self,
        outer: &ProjectedPolygon,
        holes: &[ProjectedPolygon],
        diags: &mut Diagnostics,
    ) -> Result<MergeOutcome> {
        let tolerance = self.ctx.tolerance();
        let Some(&origin) = outer.points.first() else {
            diags.push(Diagnostic::DegenerateShadow { area: 0.0 });
            return Ok(MergeOutcome::Degenerate);
        };

        let mut group = ShadowGroup::new(self.ctx.frame().with_origin(origin), tolerance);
        let outer_2d = group.local(&outer.points);
        let area = signed_area_2d(&outer_2d).abs();
        if area <= tolerance * tolerance {
            diags.push(Diagnostic::DegenerateShadow { area });
            return Ok(MergeOutcome::Degenerate);
        }
        let holes_2d: Vec<Vec<[f64; 2]>> = holes.iter().map(|h| group.local(&h.points)).collect();

        if group.carve(&outer_2d, &holes_2d)?.is_none() {
            diags.push(Diagnostic::DegenerateShadow { area });
            return Ok(MergeOutcome::Degenerate);
        }
        group.triangulate(diags)?;

        // Existing shadow, seen from the group frame
        let to_group = self.ctx.frame().relative_to(&group.frame);
        let covered: Vec<Shape2D> = self
            .mesh
            .transformed_polygons(&to_group)
            .iter()
            .map(to_shape)
            .collect();
        group.subtract_covered(&covered)?;

        // Flatten into the shadow mesh
        let to_target = group.frame.relative_to(self.ctx.frame());
        let mut pieces = 0;
        for polygon in group.mesh.transformed_polygons(&to_target) {
            match self.mesh.insert_polygon(&polygon.outer, &polygon.holes) {
                Ok(_) => pieces += 1,
                Err(MeshError::DegenerateFace) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        self.mesh.split_edges_at_vertices();
        let summary = self.cleanup(diags)?;
        self.merged += 1;
        tracing::debug!(
            pieces,
            erased = summary.erased_edges,
            faces = self.mesh.face_count(),
            "merged shadow face"
        );
        Ok(MergeOutcome::Merged { pieces })
    }

    fn cleanup(&mut self, diags: &mut Diagnostics) -> Result<CleanupSummary> {
        settle(
            &mut self.mesh,
            self.ctx.frame(),
            self.max_cleanup_passes,
            CleanupStage::Merge,
            diags,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Vector3};
    use shadow_caster_geometry::{project_loop, LoopRole};
    use shadow_caster_scene::LeafFace;
    use shadow_caster_topology::Winding;

    fn target() -> TargetContext {
        let face = LeafFace::new(vec![
            Point3::new(-10.0, -10.0, 0.0),
            Point3::new(10.0, -10.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
            Point3::new(-10.0, 10.0, 0.0),
        ]);
        TargetContext::from_face(&face, &Matrix4::identity(), Vector3::z(), 1e-6).unwrap()
    }

    fn square(x0: f64, y0: f64, size: f64, z: f64) -> Vec<Point3<f64>> {
        vec![
            Point3::new(x0, y0, z),
            Point3::new(x0 + size, y0, z),
            Point3::new(x0 + size, y0 + size, z),
            Point3::new(x0, y0 + size, z),
        ]
    }

    fn project(ctx: &TargetContext, pts: &[Point3<f64>], role: LoopRole) -> ProjectedPolygon {
        project_loop(pts, &Matrix4::identity(), ctx.sun(), ctx.plane(), role, ctx.tolerance())
    }

    #[test]
    fn test_merge_single_square() {
        let ctx = target();
        let mut acc = ShadowAccumulator::new(&ctx, &ShadowConfig::default());
        let mut diags = Diagnostics::new();

        let outcome = acc
            .merge(&project(&ctx, &square(0.0, 0.0, 1.0, 2.0), LoopRole::Outer), &[], &mut diags)
            .unwrap();
        assert!(matches!(outcome, MergeOutcome::Merged { .. }));
        assert_relative_eq!(acc.mesh().total_area(), 1.0, epsilon = 1e-9);
        assert_eq!(acc.mesh().face_count(), 1);
        assert!(acc.mesh().is_settled());
    }

    #[test]
    fn test_merge_overlapping_squares_unions() {
        let ctx = target();
        let mut acc = ShadowAccumulator::new(&ctx, &ShadowConfig::default());
        let mut diags = Diagnostics::new();

        for x in [0.0, 0.5] {
            let poly = project(&ctx, &square(x, 0.0, 1.0, 1.0), LoopRole::Outer);
            acc.merge(&poly, &[], &mut diags).unwrap();
        }
        assert_relative_eq!(acc.mesh().total_area(), 1.5, epsilon = 1e-9);
        assert_eq!(acc.mesh().face_count(), 1);
        assert!(acc.mesh().is_settled());
        assert_eq!(acc.merged(), 2);
    }

    #[test]
    fn test_covered_face_adds_nothing() {
        let ctx = target();
        let mut acc = ShadowAccumulator::new(&ctx, &ShadowConfig::default());
        let mut diags = Diagnostics::new();

        acc.merge(&project(&ctx, &square(0.0, 0.0, 2.0, 1.0), LoopRole::Outer), &[], &mut diags)
            .unwrap();
        let outcome = acc
            .merge(&project(&ctx, &square(0.5, 0.5, 1.0, 3.0), LoopRole::Outer), &[], &mut diags)
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Merged { pieces: 0 });
        assert_relative_eq!(acc.mesh().total_area(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_merge_face_with_hole() {
        let ctx = target();
        let mut acc = ShadowAccumulator::new(&ctx, &ShadowConfig::default());
        let mut diags = Diagnostics::new();

        let outer = project(&ctx, &square(0.0, 0.0, 4.0, 1.0), LoopRole::Outer);
        let hole = project(&ctx, &square(1.0, 1.0, 2.0, 1.0), LoopRole::Hole(0));
        acc.merge(&outer, &[hole], &mut diags).unwrap();

        assert_relative_eq!(acc.mesh().total_area(), 12.0, epsilon = 1e-9);
        assert!(acc.mesh().is_settled());
        let face = acc.mesh().face_keys()[0];
        assert_eq!(acc.mesh().face_inner_wires(face).map(|w| w.len()), Some(1));
    }

    #[test]
    fn test_filling_a_hole() {
        let ctx = target();
        let mut acc = ShadowAccumulator::new(&ctx, &ShadowConfig::default());
        let mut diags = Diagnostics::new();

        let outer = project(&ctx, &square(0.0, 0.0, 4.0, 1.0), LoopRole::Outer);
        let hole = project(&ctx, &square(1.0, 1.0, 2.0, 1.0), LoopRole::Hole(0));
        acc.merge(&outer, &[hole], &mut diags).unwrap();
        acc.merge(&project(&ctx, &square(1.0, 1.0, 2.0, 2.0), LoopRole::Outer), &[], &mut diags)
            .unwrap();

        assert_relative_eq!(acc.mesh().total_area(), 16.0, epsilon = 1e-9);
        assert_eq!(acc.mesh().face_count(), 1);
        assert!(acc.mesh().is_settled());
    }

    #[test]
    fn test_triangulation_skips_are_reported() {
        let ctx = target();
        let mut group = ShadowGroup::new(*ctx.frame(), ctx.tolerance());
        let ring = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let outer = group.mesh.add_loop(&ring, Winding::CounterClockwise).unwrap();
        let hole = group.mesh.add_loop(&ring, Winding::Clockwise).unwrap();
        group.mesh.add_face_with_holes(outer, &[hole]).unwrap();
        let mut diags = Diagnostics::new();

        group.triangulate(&mut diags).unwrap();
        assert!(diags.count("skipped_triangle") >= 1);
        assert_eq!(group.mesh.face_count(), 0);
    }

    #[test]
    fn test_hole_as_large_as_face_casts_nothing() {
        let ctx = target();
        let mut acc = ShadowAccumulator::new(&ctx, &ShadowConfig::default());
        let mut diags = Diagnostics::new();

        let ring = square(0.0, 0.0, 1.0, 1.0);
        let outer = project(&ctx, &ring, LoopRole::Outer);
        let hole = project(&ctx, &ring, LoopRole::Hole(0));
        acc.merge(&outer, &[hole], &mut diags).unwrap();

        assert_relative_eq!(acc.mesh().total_area(), 0.0, epsilon = 1e-9);
        assert!(diags.count("skipped_triangle") >= 1);
    }

    #[test]
    fn test_edge_on_projection_is_degenerate() {
        let ctx = target();
        let mut acc = ShadowAccumulator::new(&ctx, &ShadowConfig::default());
        let mut diags = Diagnostics::new();

        // Vertical face: its shadow along +z is a segment
        let wall = vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(0.0, 0.0, 2.0),
        ];
        let outcome = acc.merge(&project(&ctx, &wall, LoopRole::Outer), &[], &mut diags).unwrap();
        assert_eq!(outcome, MergeOutcome::Degenerate);
        assert_eq!(diags.count("degenerate_shadow"), 1);
        assert!(acc.mesh().is_empty());
    }
}
