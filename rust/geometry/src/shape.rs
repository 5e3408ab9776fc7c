// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D shapes with holes, the operands of the boolean module

use crate::bool2d::{compute_signed_area, ensure_ccw, ensure_cw, point_in_contour};
use nalgebra::Point2;

/// 2D shape with optional holes
#[derive(Debug, Clone, PartialEq)]
pub struct Shape2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
    /// Holes (clockwise)
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Shape2D {
    /// Create a new shape
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Create a shape from `[x, y]` loops
    pub fn from_arrays(outer: &[[f64; 2]], holes: &[Vec<[f64; 2]>]) -> Self {
        let conv = |c: &[[f64; 2]]| c.iter().map(|p| Point2::new(p[0], p[1])).collect();
        Self {
            outer: conv(outer),
            holes: holes.iter().map(|h| conv(h.as_slice())).collect(),
        }
    }

    /// Axis-aligned rectangle between two corners
    pub fn rectangle(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self::new(vec![
            min,
            Point2::new(max.x, min.y),
            max,
            Point2::new(min.x, max.y),
        ])
    }

    /// Add a hole to the shape
    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        self.holes.push(hole);
    }

    /// Outer boundary counter-clockwise, holes clockwise
    pub fn normalized(&self) -> Self {
        Self {
            outer: ensure_ccw(&self.outer),
            holes: self.holes.iter().map(|h| ensure_cw(h)).collect(),
        }
    }

    /// Enclosed area minus hole areas
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| compute_signed_area(h).abs()).sum();
        compute_signed_area(&self.outer).abs() - holes
    }

    /// Whether `p` lies inside the outer boundary and outside every hole
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        point_in_contour(p, &self.outer) && !self.holes.iter().any(|h| point_in_contour(p, h))
    }

    /// Loops as `[x, y]` arrays: outer first, then holes
    pub fn to_arrays(&self) -> (Vec<[f64; 2]>, Vec<Vec<[f64; 2]>>) {
        let conv = |c: &[Point2<f64>]| c.iter().map(|p| [p.x, p.y]).collect();
        (conv(self.outer.as_slice()), self.holes.iter().map(|h| conv(h.as_slice())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_shape() {
        let shape = Shape2D::rectangle(Point2::new(-5.0, -2.5), Point2::new(5.0, 2.5));
        assert_eq!(shape.outer.len(), 4);
        assert_eq!(shape.holes.len(), 0);
        assert_eq!(shape.outer[1], Point2::new(5.0, -2.5));
        assert_relative_eq!(shape.area(), 50.0);
    }

    #[test]
    fn test_area_and_contains_with_hole() {
        let mut shape = Shape2D::rectangle(Point2::new(0.0, 0.0), Point2::new(4.0, 4.0));
        shape.add_hole(vec![
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(1.0, 2.0),
        ]);
        assert_relative_eq!(shape.area(), 15.0);
        assert!(shape.contains(&Point2::new(3.0, 3.0)));
        assert!(!shape.contains(&Point2::new(1.5, 1.5)));
    }

    #[test]
    fn test_normalized_winding() {
        let mut shape = Shape2D::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ]);
        shape.add_hole(vec![
            Point2::new(0.2, 0.2),
            Point2::new(0.4, 0.2),
            Point2::new(0.4, 0.4),
        ]);
        let n = shape.normalized();
        assert!(compute_signed_area(&n.outer) > 0.0);
        assert!(compute_signed_area(&n.holes[0]) < 0.0);
    }

    #[test]
    fn test_array_conversion() {
        let outer = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let shape = Shape2D::from_arrays(&outer, &[]);
        let (back, holes) = shape.to_arrays();
        assert_eq!(back, outer.to_vec());
        assert!(holes.is_empty());
    }
}
