// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Projection of 3D loops onto a plane along the sun direction
//!
//! `sun` points from the scene toward the light. A point is projected along
//! the line through it parallel to `sun`, so its shadow lands on the side of
//! the plane facing away from the light.

use crate::bounds::Aabb;
use crate::plane::Plane;
use nalgebra::{Matrix4, Point3, Vector3};

/// Why a projected vertex is suspicious
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RayDefect {
    /// The sun is parallel to the plane. The vertex was projected
    /// orthogonally instead.
    Parallel,
    /// The source point already lies on the plane.
    Coincident,
    /// Reaching the plane requires travelling toward the sun.
    Backward,
}

/// Which loop of the source face a projected polygon came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopRole {
    Outer,
    Hole(usize),
}

/// Ray from a source point to its projection, kept for flagged vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySegment {
    pub from: Point3<f64>,
    pub to: Point3<f64>,
    pub defect: RayDefect,
}

/// A loop projected onto the target plane
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPolygon {
    pub role: LoopRole,
    /// Projected points, same count and order as the source loop
    pub points: Vec<Point3<f64>>,
    /// One entry per point
    pub defects: Vec<Option<RayDefect>>,
    /// Rays of the flagged points
    pub rays: Vec<RaySegment>,
}

impl ProjectedPolygon {
    /// Whether any vertex was flagged
    pub fn is_flagged(&self) -> bool {
        !self.rays.is_empty()
    }

    /// World bounds of the projected points
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.points)
    }
}

/// Project one world point onto `plane` along `sun`.
pub fn project_point(
    p1: &Point3<f64>,
    sun: &Vector3<f64>,
    plane: &Plane,
    tolerance: f64,
) -> (Point3<f64>, Option<RayDefect>) {
    match plane.intersect_line(p1, sun) {
        None => (plane.project_point(p1), Some(RayDefect::Parallel)),
        Some((t, p2)) => {
            let defect = if (p2 - p1).norm() <= tolerance {
                Some(RayDefect::Coincident)
            } else if t > 0.0 {
                Some(RayDefect::Backward)
            } else {
                None
            };
            (p2, defect)
        }
    }
}

/// Project a loop given in definition coordinates onto `plane`.
///
/// Each point is first mapped through `transform`. Flagged points still
/// contribute their projection so the loop keeps its shape.
pub fn project_loop(
    points: &[Point3<f64>],
    transform: &Matrix4<f64>,
    sun: &Vector3<f64>,
    plane: &Plane,
    role: LoopRole,
    tolerance: f64,
) -> ProjectedPolygon {
    let mut projected = Vec::with_capacity(points.len());
    let mut defects = Vec::with_capacity(points.len());
    let mut rays = Vec::new();

    for p in points {
        let p1 = transform.transform_point(p);
        let (p2, defect) = project_point(&p1, sun, plane, tolerance);
        if let Some(defect) = defect {
            rays.push(RaySegment {
                from: p1,
                to: p2,
                defect,
            });
        }
        projected.push(p2);
        defects.push(defect);
    }

    ProjectedPolygon {
        role,
        points: projected,
        defects,
        rays,
    }
}

/// The transformed loop if every point lies within `tolerance` of `plane`.
pub fn coplanar_loop(
    points: &[Point3<f64>],
    transform: &Matrix4<f64>,
    plane: &Plane,
    tolerance: f64,
) -> Option<Vec<Point3<f64>>> {
    let world: Vec<Point3<f64>> = points.iter().map(|p| transform.transform_point(p)).collect();
    (!world.is_empty() && world.iter().all(|p| plane.contains_point(p, tolerance))).then_some(world)
}
