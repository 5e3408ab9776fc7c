// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations for Shadow Regions
//!
//! Polygon booleans on [`Shape2D`] sets using the i_overlay crate. Shapes are
//! normalized (outer counter-clockwise, holes clockwise) and combined with the
//! non-zero fill rule, so a set of disjoint faces with holes describes exactly
//! the region it covers.

use crate::shape::Shape2D;
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Minimum area threshold - polygons smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-12;

/// Region covered by `subject` and not by `clip`
///
/// Used to keep only the part of a new shadow piece that the accumulated
/// shadow does not already cover.
pub fn difference(subject: &[Shape2D], clip: &[Shape2D]) -> Vec<Shape2D> {
    if clip.is_empty() {
        return clean(subject);
    }
    overlay(subject, clip, OverlayRule::Difference)
}

/// Region covered by both `subject` and `clip`
pub fn intersection(subject: &[Shape2D], clip: &[Shape2D]) -> Vec<Shape2D> {
    if subject.is_empty() || clip.is_empty() {
        return Vec::new();
    }
    overlay(subject, clip, OverlayRule::Intersect)
}

/// Total area of a shape set
pub fn total_area(shapes: &[Shape2D]) -> f64 {
    shapes.iter().map(Shape2D::area).sum()
}

fn overlay(subject: &[Shape2D], clip: &[Shape2D], rule: OverlayRule) -> Vec<Shape2D> {
    let subject_paths = shapes_to_paths(subject);
    let clip_paths = shapes_to_paths(clip);

    // Result is Vec<Vec<Vec<[f64; 2]>>> - Vec of shapes, each shape is Vec of contours
    let result = subject_paths.overlay(&clip_paths, rule, FillRule::NonZero);
    paths_to_shapes(&result)
}

/// Drop degenerate shapes and normalize winding
fn clean(shapes: &[Shape2D]) -> Vec<Shape2D> {
    shapes
        .iter()
        .filter(|s| is_valid_contour(&s.outer))
        .map(|s| {
            let mut n = s.normalized();
            n.holes.retain(|h| is_valid_contour(h));
            n
        })
        .collect()
}

/// Check if a contour is valid (has area, not degenerate)
pub fn is_valid_contour(contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let area = compute_signed_area(contour).abs();
    area > MIN_AREA_THRESHOLD
}

/// Shoelace area of a 2D contour: positive when counter-clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }
    let wrap = contour.iter().skip(1).chain(contour.first());
    contour
        .iter()
        .zip(wrap)
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum::<f64>()
        * 0.5
}

fn oriented(contour: &[Point2<f64>], ccw: bool) -> Vec<Point2<f64>> {
    let area = compute_signed_area(contour);
    let flip = if ccw { area < 0.0 } else { area > 0.0 };
    let mut out = contour.to_vec();
    if flip {
        out.reverse();
    }
    out
}

/// Copy of the contour wound counter-clockwise (outer boundaries)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    oriented(contour, true)
}

/// Copy of the contour wound clockwise (holes)
pub fn ensure_cw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    oriented(contour, false)
}

/// Even-odd crossing test; points on the boundary may go either way
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    let n = contour.len();
    if n < 3 {
        return false;
    }
    (0..n)
        .filter(|&i| {
            let (a, b) = (&contour[i], &contour[(i + n - 1) % n]);
            (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        })
        .count()
        % 2
        == 1
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Convert shapes to i_overlay path format
fn shapes_to_paths(shapes: &[Shape2D]) -> Vec<Vec<[f64; 2]>> {
    let mut paths = Vec::new();
    for shape in shapes.iter().filter(|s| s.outer.len() >= 3) {
        // Outer boundary counter-clockwise, holes clockwise for the non-zero rule
        paths.push(contour_to_path(&ensure_ccw(&shape.outer)));
        for hole in shape.holes.iter().filter(|h| h.len() >= 3) {
            paths.push(contour_to_path(&ensure_cw(hole)));
        }
    }
    paths
}

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

/// Convert i_overlay result shapes back to [`Shape2D`]
///
/// i_overlay returns Vec<Vec<Vec<[f64; 2]>>> where:
/// - Outer Vec: list of shapes
/// - Middle Vec: list of contours per shape (first is outer, rest are holes)
/// - Inner Vec: list of points per contour
fn paths_to_shapes(shapes: &[Vec<Vec<[f64; 2]>>]) -> Vec<Shape2D> {
    let to_points = |c: &Vec<[f64; 2]>| -> Vec<Point2<f64>> {
        c.iter().map(|p| Point2::new(p[0], p[1])).collect()
    };

    let mut result = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let Some(first) = shape.first() else {
            continue;
        };
        let outer = to_points(first);
        if !is_valid_contour(&outer) {
            continue;
        }
        let holes = shape
            .iter()
            .skip(1)
            .map(to_points)
            .filter(|h| is_valid_contour(h))
            .map(|h| ensure_cw(&h))
            .collect();
        result.push(Shape2D {
            outer: ensure_ccw(&outer),
            holes,
        });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Epsilon for floating point comparisons in 2D operations
    const EPSILON_2D: f64 = 1e-9;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape2D {
        Shape2D::rectangle(Point2::new(x0, y0), Point2::new(x1, y1))
    }

    #[test]
    fn test_compute_signed_area_ccw() {
        let contour = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let area = compute_signed_area(&contour);
        assert!((area - 1.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_compute_signed_area_cw() {
        let contour = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ];
        let area = compute_signed_area(&contour);
        assert!((area + 1.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_ensure_ccw() {
        let cw = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ];
        let ccw = ensure_ccw(&cw);
        assert!(compute_signed_area(&ccw) > 0.0);
        assert!(compute_signed_area(&ensure_cw(&ccw)) < 0.0);
    }

    #[test]
    fn test_difference_of_overlapping_squares() {
        let result = difference(&[rect(0.0, 0.0, 2.0, 2.0)], &[rect(1.0, 0.0, 3.0, 2.0)]);
        assert_eq!(result.len(), 1);
        assert_relative_eq!(total_area(&result), 2.0, epsilon = EPSILON_2D);
        assert!(compute_signed_area(&result[0].outer) > 0.0);
    }

    #[test]
    fn test_difference_fully_covered_is_empty() {
        let result = difference(&[rect(1.0, 1.0, 2.0, 2.0)], &[rect(0.0, 0.0, 4.0, 4.0)]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_difference_punches_hole() {
        let result = difference(&[rect(0.0, 0.0, 10.0, 10.0)], &[rect(4.0, 4.0, 6.0, 6.0)]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].holes.len(), 1);
        assert_relative_eq!(total_area(&result), 96.0, epsilon = EPSILON_2D);
    }

    #[test]
    fn test_difference_respects_clip_holes() {
        // Clip is a frame; the subject survives only inside the frame's hole
        let mut frame = rect(0.0, 0.0, 4.0, 4.0);
        frame.add_hole(rect(1.0, 1.0, 3.0, 3.0).outer);
        let result = difference(&[rect(0.0, 0.0, 4.0, 4.0)], &[frame]);
        assert_relative_eq!(total_area(&result), 4.0, epsilon = EPSILON_2D);
    }

    #[test]
    fn test_difference_with_empty_clip_cleans() {
        let degenerate = Shape2D::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ]);
        let result = difference(&[rect(0.0, 0.0, 1.0, 1.0), degenerate], &[]);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_intersection() {
        let result = intersection(&[rect(0.0, 0.0, 2.0, 2.0)], &[rect(1.0, 1.0, 3.0, 3.0)]);
        assert_relative_eq!(total_area(&result), 1.0, epsilon = EPSILON_2D);
        assert!(intersection(&[rect(0.0, 0.0, 1.0, 1.0)], &[rect(5.0, 5.0, 6.0, 6.0)]).is_empty());
        assert!(intersection(&[], &[rect(0.0, 0.0, 1.0, 1.0)]).is_empty());
    }

    #[test]
    fn test_point_in_contour() {
        let contour = rect(0.0, 0.0, 10.0, 10.0).outer;

        assert!(point_in_contour(&Point2::new(5.0, 5.0), &contour));
        assert!(!point_in_contour(&Point2::new(15.0, 5.0), &contour));
        assert!(!point_in_contour(&Point2::new(-1.0, 5.0), &contour));
    }

    #[test]
    fn test_is_valid_contour() {
        assert!(is_valid_contour(&rect(0.0, 0.0, 1.0, 1.0).outer));

        let degenerate = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        assert!(!is_valid_contour(&degenerate));

        let too_few = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(!is_valid_contour(&too_few));
    }
}
