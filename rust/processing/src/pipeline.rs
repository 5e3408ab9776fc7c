// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end shadow casting.
//!
//! 1. Resolve the target face and build the [`TargetContext`].
//! 2. Open an [`EditSession`].
//! 3. Walk the instances; route coplanar faces to ground footprints and
//!    merge the projection of every other face.
//! 4. Subtract the footprints, optionally clip to the target face.
//! 5. Stage the result as one container and commit.
//!
//! Any error after step 2 drops the session, which rolls the operation back.

use nalgebra::Matrix4;
use shadow_caster_geometry::{coplanar_loop, project_loop, LoopRole, ProjectedPolygon};
use shadow_caster_scene::{walk, SelectedEntity};

use crate::accumulator::{MergeOutcome, ShadowAccumulator};
use crate::config::ShadowConfig;
use crate::context::TargetContext;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{Error, Result};
use crate::ground::{clip_to_target, subtract_footprints, GroundFootprint};
use crate::session::EditSession;
use crate::store::{ContainerKey, SceneStore, ShadowContainer};

/// Result of one successful [`cast_shadows`] run.
#[derive(Debug, Clone)]
pub struct ShadowReport {
    pub container: ContainerKey,
    /// Final shadow area in model units squared
    pub area: f64,
    pub face_count: usize,
    /// Source faces merged into the shadow
    pub merged_faces: usize,
    pub ground_footprints: usize,
    /// Faces whose projection missed the target bounds
    pub skipped_faces: usize,
    pub degenerate_faces: usize,
    /// Area removed by ground footprints
    pub ground_area: f64,
    /// Area removed by clipping to the target face
    pub clipped_area: f64,
    pub diagnostics: Diagnostics,
}

/// Resolves the single selected target face into a context.
pub fn target_context<S: SceneStore + ?Sized>(store: &S, config: &ShadowConfig) -> Result<TargetContext> {
    let index = match store.selection() {
        [] => return Err(Error::NoSelection),
        [SelectedEntity::Face(index)] => *index,
        [SelectedEntity::Instance(_)] => return Err(Error::NotAFace),
        many => return Err(Error::MultipleSelection(many.len())),
    };
    let face = store
        .scene()
        .root(index)
        .and_then(|node| node.as_face())
        .ok_or(Error::NotAFace)?;
    TargetContext::from_face(face, &Matrix4::identity(), store.sun_direction(), config.tolerance)
}

/// Casts the shadow of every instance onto the selected face.
///
/// Precondition failures are returned before any operation opens. On
/// success exactly one container has been committed.
pub fn cast_shadows<S: SceneStore + ?Sized>(store: &mut S, config: &ShadowConfig) -> Result<ShadowReport> {
    config.validate()?;
    let ctx = target_context(&*store, config)?;
    tracing::info!(
        sun = ?ctx.sun().as_slice(),
        normal = ?ctx.plane().normal.as_slice(),
        "casting shadows"
    );

    let mut session = EditSession::begin(store, &config.operation_name)?;
    let mut diags = Diagnostics::new();
    let mut acc = ShadowAccumulator::new(&ctx, config);
    let mut footprints = Vec::new();
    let mut skipped_faces = 0;
    let mut degenerate_faces = 0;

    {
        let scene = session.store().scene();
        let roots = scene.instance_roots();
        let tol = ctx.tolerance();

        for item in walk(scene, &roots, Matrix4::identity()).with_max_depth(config.max_depth) {
            let item = item?;
            let face = item.face;

            if let Some(world) = coplanar_loop(&face.outer, &item.transform, ctx.plane(), tol) {
                footprints.push(GroundFootprint::new(world, ctx.frame()));
                continue;
            }

            let outer = project_loop(&face.outer, &item.transform, ctx.sun(), ctx.plane(), LoopRole::Outer, tol);
            let misses = outer.bounds().map_or(true, |b| !b.intersects(ctx.bounds()));
            if misses {
                skipped_faces += 1;
                continue;
            }

            let holes: Vec<ProjectedPolygon> = face
                .holes
                .iter()
                .enumerate()
                .map(|(i, h)| project_loop(h, &item.transform, ctx.sun(), ctx.plane(), LoopRole::Hole(i), tol))
                .collect();
            for poly in std::iter::once(&outer).chain(&holes) {
                for ray in &poly.rays {
                    diags.push(Diagnostic::DegenerateRay {
                        role: poly.role,
                        defect: ray.defect,
                        from: ray.from,
                        to: ray.to,
                    });
                }
            }

            if acc.merge(&outer, &holes, &mut diags)? == MergeOutcome::Degenerate {
                degenerate_faces += 1;
            }
        }
    }

    let merged_faces = acc.merged();
    let mut mesh = acc.into_mesh();
    let ground_area = subtract_footprints(
        &mut mesh,
        ctx.frame(),
        &footprints,
        config.max_cleanup_passes,
        &mut diags,
    )?;
    let clipped_area = if config.clip_to_target {
        clip_to_target(
            &mut mesh,
            ctx.frame(),
            ctx.outline(),
            config.max_cleanup_passes,
            &mut diags,
        )?
    } else {
        0.0
    };

    let area = mesh.total_area();
    let face_count = mesh.face_count();
    session.add_container(ShadowContainer::new(config.container_name.clone(), *ctx.frame(), mesh))?;
    let keys = session.commit()?;
    let container = keys.into_iter().next().ok_or(Error::NoOpenOperation)?;

    tracing::info!(
        area,
        faces = face_count,
        merged = merged_faces,
        ground = footprints.len(),
        skipped = skipped_faces,
        diagnostics = diags.len(),
        "shadow committed"
    );

    Ok(ShadowReport {
        container,
        area,
        face_count,
        merged_faces,
        ground_footprints: footprints.len(),
        skipped_faces,
        degenerate_faces,
        ground_area,
        clipped_area,
        diagnostics: diags,
    })
}
