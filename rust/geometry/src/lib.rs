// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shadow Caster Geometry
//!
//! Planes and frames, projection of 3D loops along the sun direction,
//! hole-aware triangulation with earcutr, and 2D booleans with i_overlay.

pub mod bool2d;
pub mod bounds;
pub mod error;
pub mod plane;
pub mod projection;
pub mod shape;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use bounds::Aabb;
pub use error::{Error, Result};
pub use plane::{newell_normal, Plane, PlaneFrame};
pub use projection::{coplanar_loop, project_loop, project_point, LoopRole, ProjectedPolygon, RayDefect, RaySegment};
pub use shape::Shape2D;
pub use triangulation::{triangulate_loops, SkippedTriangle, TriangleDefect, Triangulation};
