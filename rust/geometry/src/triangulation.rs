// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Wrapper around earcutr for 2D polygon triangulation, plus a checked
//! triangulator for 3D loops with holes that reports degenerate triangles
//! instead of failing.

use crate::plane::{newell_normal, Plane, PlaneFrame};
use crate::{Error, Point3, Result};

/// Fan candidates `(0, i, i + 1)` over `n` points
fn fan_indices(n: usize) -> Vec<usize> {
    (1..n.saturating_sub(1)).flat_map(|i| [0, i, i + 1]).collect()
}

/// Whether every turn of the ring goes the same way
fn is_convex(ring: &[[f64; 2]]) -> bool {
    let n = ring.len();
    let mut turn = 0.0f64;
    for i in 0..n {
        let [a, b, c] = [ring[i], ring[(i + 1) % n], ring[(i + 2) % n]];
        let cross = (b[0] - a[0]) * (c[1] - b[1]) - (b[1] - a[1]) * (c[0] - b[0]);
        if cross.abs() <= 1e-10 {
            continue;
        }
        if turn != 0.0 && turn.signum() != cross.signum() {
            return false;
        }
        turn = cross;
    }
    n >= 3
}

/// Unsigned shoelace area of a 2D ring
fn loop_area(ring: &[[f64; 2]]) -> f64 {
    let wrap = ring.iter().skip(1).chain(ring.first());
    ring.iter()
        .zip(wrap)
        .map(|(a, b)| a[0] * b[1] - b[0] * a[1])
        .sum::<f64>()
        .abs()
        * 0.5
}

/// Summed area of the triangles `indices` selects from `points`
fn indices_area(points: &[[f64; 2]], indices: &[usize]) -> f64 {
    indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (points[t[0]], points[t[1]], points[t[2]]);
            ((b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])).abs() * 0.5
        })
        .sum()
}

/// Earcut indices into the concatenation of `outer` and `holes`.
///
/// Small convex rings without holes are fanned directly.
fn earcut_rings(outer: &[[f64; 2]], holes: &[Vec<[f64; 2]>]) -> Result<Vec<usize>> {
    if holes.is_empty() && outer.len() <= 8 && is_convex(outer) {
        return Ok(fan_indices(outer.len()));
    }

    let mut flat: Vec<f64> = outer.iter().flatten().copied().collect();
    let mut starts = Vec::with_capacity(holes.len());
    for hole in holes {
        starts.push(flat.len() / 2);
        flat.extend(hole.iter().flatten());
    }
    earcutr::earcut(&flat, &starts, 2).map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Why a candidate triangle was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriangleDefect {
    /// Fewer than 3 distinct corners
    TooFewPoints,
    /// Area at or below the squared tolerance
    Collinear,
    /// A corner lies off the source loop's plane
    NonPlanar,
    /// Earcut failed on a loop with holes, or its triangles do not
    /// match the area between the outer loop and the holes
    UnresolvedHoles,
}

/// A candidate triangle that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTriangle {
    pub corners: [Point3<f64>; 3],
    pub defect: TriangleDefect,
}

/// Result of [`triangulate_loops`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    /// Valid triangles, in the winding of the source loop
    pub triangles: Vec<[Point3<f64>; 3]>,
    /// Rejected candidates
    pub skipped: Vec<SkippedTriangle>,
}

impl Triangulation {
    /// Total area of the valid triangles
    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| (t[1] - t[0]).cross(&(t[2] - t[0])).norm() * 0.5)
            .sum()
    }
}

/// Triangulate a planar 3D loop with holes.
///
/// Every candidate triangle is validated against `tolerance`; failures are
/// collected in [`Triangulation::skipped`]. A loop without area, or one
/// earcut cannot handle, falls back to fan candidates so its degeneracy is
/// still reported. With holes present the fan would cover them, so every
/// candidate is then skipped as [`TriangleDefect::UnresolvedHoles`]. Only
/// an outer loop with fewer than 3 points is an error.
pub fn triangulate_loops(
    outer: &[Point3<f64>],
    holes: &[Vec<Point3<f64>>],
    tolerance: f64,
) -> Result<Triangulation> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(format!(
            "outer loop has {} points, need at least 3",
            outer.len()
        )));
    }

    let plane = Plane::from_polygon(outer).ok();
    let holes: Vec<&Vec<Point3<f64>>> = holes.iter().filter(|h| h.len() >= 3).collect();
    let points: Vec<Point3<f64>> = outer.iter().chain(holes.iter().copied().flatten()).copied().collect();

    let mut unresolved = false;
    let indices = match plane {
        Some(p) if (newell_normal(outer).dot(&p.normal) * 0.5).abs() > tolerance * tolerance => {
            let frame = PlaneFrame::from_plane(&p).with_origin(outer[0]);
            let flat = |ring: &[Point3<f64>]| -> Vec<[f64; 2]> { ring.iter().map(|q| frame.to_local_2d(q)).collect() };
            let outer_2d = flat(outer);
            let holes_2d: Vec<Vec<[f64; 2]>> = holes.iter().map(|h| flat(h.as_slice())).collect();
            // A failure leaves no indices; with holes that is caught below
            let found = earcut_rings(&outer_2d, &holes_2d).unwrap_or_default();

            if !holes_2d.is_empty() {
                let all: Vec<[f64; 2]> = outer_2d.iter().chain(holes_2d.iter().flatten()).copied().collect();
                let outer_area = loop_area(&outer_2d);
                let expected = outer_area - holes_2d.iter().map(|h| loop_area(h)).sum::<f64>();
                let slack = tolerance * tolerance + 1e-9 * outer_area;
                unresolved = found.is_empty() || (indices_area(&all, &found) - expected).abs() > slack;
            }
            found
        }
        _ => Vec::new(),
    };
    let indices = if indices.is_empty() { fan_indices(outer.len()) } else { indices };

    let mut result = Triangulation::default();
    for tri in indices.chunks_exact(3) {
        let corners = [points[tri[0]], points[tri[1]], points[tri[2]]];
        let defect = if unresolved {
            Some(TriangleDefect::UnresolvedHoles)
        } else {
            check_triangle(&corners, plane.as_ref(), tolerance)
        };
        match defect {
            None => result.triangles.push(corners),
            Some(defect) => result.skipped.push(SkippedTriangle { corners, defect }),
        }
    }

    Ok(result)
}

/// Validate one candidate triangle
fn check_triangle(corners: &[Point3<f64>; 3], plane: Option<&Plane>, tolerance: f64) -> Option<TriangleDefect> {
    let [a, b, c] = corners;
    let distinct = (a - b).norm() > tolerance && (b - c).norm() > tolerance && (a - c).norm() > tolerance;
    if !distinct {
        return Some(TriangleDefect::TooFewPoints);
    }

    let area = (b - a).cross(&(c - a)).norm() * 0.5;
    if area <= tolerance * tolerance {
        return Some(TriangleDefect::Collinear);
    }

    match plane {
        Some(plane) if corners.iter().any(|p| !plane.contains_point(p, tolerance)) => {
            Some(TriangleDefect::NonPlanar)
        }
        Some(_) => None,
        None => Some(TriangleDefect::Collinear),
    }
}
