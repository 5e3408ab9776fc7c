// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The fixed inputs of one shadow computation.

use nalgebra::{Matrix4, Point3, Vector3};
use shadow_caster_geometry::{Aabb, Plane, PlaneFrame};
use shadow_caster_scene::LeafFace;
use shadow_caster_topology::Polygon2;

use crate::error::{Error, Result};

/// Target plane, bounds, sun and frame, derived once from the target face.
///
/// The frame's local xy plane is the target plane; the shadow mesh is stored
/// in these coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetContext {
    plane: Plane,
    bounds: Aabb,
    sun: Vector3<f64>,
    frame: PlaneFrame,
    outline: Polygon2,
    tolerance: f64,
}

impl TargetContext {
    /// Builds the context from a face placed by `transform`.
    pub fn from_face(
        face: &LeafFace,
        transform: &Matrix4<f64>,
        sun: Vector3<f64>,
        tolerance: f64,
    ) -> Result<Self> {
        if sun.norm() <= f64::EPSILON {
            return Err(Error::ZeroSunDirection);
        }

        let outer: Vec<Point3<f64>> = face.outer.iter().map(|p| transform.transform_point(p)).collect();
        if outer.len() < 3 {
            return Err(Error::DegenerateTarget(format!(
                "outer loop has {} points",
                outer.len()
            )));
        }
        let holes: Vec<Vec<Point3<f64>>> = face
            .holes
            .iter()
            .map(|h| h.iter().map(|p| transform.transform_point(p)).collect())
            .collect();

        let plane = Plane::from_polygon(&outer).map_err(|e| Error::DegenerateTarget(e.to_string()))?;
        for (index, p) in outer.iter().chain(holes.iter().flatten()).enumerate() {
            let distance = plane.signed_distance(p).abs();
            if distance > tolerance {
                return Err(Error::NonPlanarTarget { index, distance });
            }
        }

        let frame = PlaneFrame::from_plane(&plane);
        let outline = Polygon2 {
            outer: outer.iter().map(|p| frame.to_local_2d(p)).collect(),
            holes: holes
                .iter()
                .map(|h| h.iter().map(|p| frame.to_local_2d(p)).collect())
                .collect(),
        };
        if outline.area() <= tolerance * tolerance {
            return Err(Error::DegenerateTarget("face has no area".into()));
        }

        let bounds = Aabb::from_points(&outer)
            .ok_or_else(|| Error::DegenerateTarget("face has no points".into()))?
            .expanded(tolerance);

        Ok(Self {
            plane,
            bounds,
            sun: sun.normalize(),
            frame,
            outline,
            tolerance,
        })
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// World bounds of the target face, grown by the tolerance
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Unit vector toward the sun
    pub fn sun(&self) -> &Vector3<f64> {
        &self.sun
    }

    pub fn frame(&self) -> &PlaneFrame {
        &self.frame
    }

    /// The target face in frame coordinates
    pub fn outline(&self) -> &Polygon2 {
        &self.outline
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// World point to frame xy
    pub fn to_local(&self, p: &Point3<f64>) -> [f64; 2] {
        self.frame.to_local_2d(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> LeafFace {
        LeafFace::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn test_context_from_unit_square() {
        let ctx = TargetContext::from_face(&square(), &Matrix4::identity(), Vector3::new(0.0, 0.0, 2.0), 1e-6).unwrap();
        assert_relative_eq!(ctx.plane().normal, Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(*ctx.sun(), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(ctx.outline().area(), 1.0, epsilon = 1e-12);
        assert!(ctx.bounds().contains_point(&Point3::new(1.0, 1.0, 0.0)));

        let local = ctx.to_local(&Point3::new(0.25, 0.75, 0.0));
        assert_relative_eq!(ctx.frame().to_world_2d(local), Point3::new(0.25, 0.75, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_sun_is_rejected() {
        let err = TargetContext::from_face(&square(), &Matrix4::identity(), Vector3::zeros(), 1e-6).unwrap_err();
        assert!(matches!(err, Error::ZeroSunDirection));
    }

    #[test]
    fn test_non_planar_target() {
        let mut face = square();
        face.outer[2].z = 0.1;
        let err = TargetContext::from_face(&face, &Matrix4::identity(), Vector3::z(), 1e-6).unwrap_err();
        assert!(matches!(err, Error::NonPlanarTarget { .. }));
    }

    #[test]
    fn test_degenerate_target() {
        let line = LeafFace::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ]);
        let err = TargetContext::from_face(&line, &Matrix4::identity(), Vector3::z(), 1e-6).unwrap_err();
        assert!(matches!(err, Error::DegenerateTarget(_)));
        assert!(err.is_precondition());
    }
}
