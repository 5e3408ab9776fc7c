// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planes and plane-local coordinate frames

use crate::error::{Error, Result};
use nalgebra::{Matrix4, Point3, Vector3};

/// Normals shorter than this are treated as degenerate
const NORMAL_EPSILON: f64 = 1e-12;

/// Newell's method: area-weighted normal of a closed loop (not normalized).
///
/// The length of the result is twice the loop's area.
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();

    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    normal
}

/// An infinite plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a plane, normalizing the normal vector
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Result<Self> {
        let len = normal.norm();
        if len <= NORMAL_EPSILON {
            return Err(Error::DegeneratePlane("zero-length normal".to_string()));
        }
        Ok(Self {
            point,
            normal: normal / len,
        })
    }

    /// Best-fit plane of a polygon loop: Newell normal through the centroid.
    ///
    /// The normal follows the loop's winding (right-hand rule).
    pub fn from_polygon(points: &[Point3<f64>]) -> Result<Self> {
        if points.len() < 3 {
            return Err(Error::DegeneratePlane(format!(
                "need at least 3 points, got {}",
                points.len()
            )));
        }
        let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
        let centroid = Point3::from(sum / points.len() as f64);
        Self::new(centroid, newell_normal(points))
            .map_err(|_| Error::DegeneratePlane("polygon has no area".to_string()))
    }

    /// Signed distance from the plane (positive on the normal side)
    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&(p - self.point))
    }

    /// Whether `p` is within `tolerance` of the plane
    #[inline]
    pub fn contains_point(&self, p: &Point3<f64>, tolerance: f64) -> bool {
        self.signed_distance(p).abs() <= tolerance
    }

    /// Orthogonal projection of `p` onto the plane
    #[inline]
    pub fn project_point(&self, p: &Point3<f64>) -> Point3<f64> {
        p - self.normal * self.signed_distance(p)
    }

    /// Intersection of the line `origin + t * direction` with the plane.
    ///
    /// Returns `(t, point)`, or `None` when the line is parallel to the plane.
    pub fn intersect_line(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
    ) -> Option<(f64, Point3<f64>)> {
        let len = direction.norm();
        if len <= NORMAL_EPSILON {
            return None;
        }
        let denom = self.normal.dot(direction);
        if (denom / len).abs() < 1e-9 {
            return None;
        }
        let t = self.normal.dot(&(self.point - origin)) / denom;
        Some((t, origin + direction * t))
    }
}

/// An orthonormal frame on a plane: local `(x, y, 0)` maps to
/// `origin + x * u + y * v`, and local z runs along `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneFrame {
    pub origin: Point3<f64>,
    pub u: Vector3<f64>,
    pub v: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl PlaneFrame {
    /// Frame with origin at the plane point.
    ///
    /// The u axis is built from the world axis least parallel to the normal,
    /// so the basis is stable for axis-aligned planes.
    pub fn from_plane(plane: &Plane) -> Self {
        let normal = plane.normal;
        let abs_x = normal.x.abs();
        let abs_y = normal.y.abs();
        let abs_z = normal.z.abs();

        let reference = if abs_x <= abs_y && abs_x <= abs_z {
            Vector3::new(1.0, 0.0, 0.0)
        } else if abs_y <= abs_z {
            Vector3::new(0.0, 1.0, 0.0)
        } else {
            Vector3::new(0.0, 0.0, 1.0)
        };

        let u = normal.cross(&reference).normalize();
        let v = normal.cross(&u).normalize();

        Self {
            origin: plane.point,
            u,
            v,
            normal,
        }
    }

    /// Same axes, different origin
    pub fn with_origin(&self, origin: Point3<f64>) -> Self {
        Self { origin, ..*self }
    }

    /// World point to local coordinates
    #[inline]
    pub fn to_local(&self, p: &Point3<f64>) -> Point3<f64> {
        let d = p - self.origin;
        Point3::new(d.dot(&self.u), d.dot(&self.v), d.dot(&self.normal))
    }

    /// World point to local xy, dropping the out-of-plane component
    #[inline]
    pub fn to_local_2d(&self, p: &Point3<f64>) -> [f64; 2] {
        let d = p - self.origin;
        [d.dot(&self.u), d.dot(&self.v)]
    }

    /// Local coordinates to world point
    #[inline]
    pub fn to_world(&self, p: &Point3<f64>) -> Point3<f64> {
        self.origin + self.u * p.x + self.v * p.y + self.normal * p.z
    }

    /// Local xy (z = 0) to world point
    #[inline]
    pub fn to_world_2d(&self, p: [f64; 2]) -> Point3<f64> {
        self.origin + self.u * p[0] + self.v * p[1]
    }

    /// Matrix mapping local coordinates to world coordinates
    pub fn local_to_world(&self) -> Matrix4<f64> {
        Matrix4::new(
            self.u.x, self.v.x, self.normal.x, self.origin.x,
            self.u.y, self.v.y, self.normal.y, self.origin.y,
            self.u.z, self.v.z, self.normal.z, self.origin.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Matrix mapping world coordinates to local coordinates
    pub fn world_to_local(&self) -> Matrix4<f64> {
        let o = self.origin.coords;
        Matrix4::new(
            self.u.x, self.u.y, self.u.z, -self.u.dot(&o),
            self.v.x, self.v.y, self.v.z, -self.v.dot(&o),
            self.normal.x, self.normal.y, self.normal.z, -self.normal.dot(&o),
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Matrix mapping this frame's local coordinates into `other`'s
    pub fn relative_to(&self, other: &PlaneFrame) -> Matrix4<f64> {
        other.world_to_local() * self.local_to_world()
    }
}
