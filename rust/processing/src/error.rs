// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the shadow pipeline.
//!
//! Precondition variants are returned before any edit session opens.
//! Everything else aborts the open session.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Nothing is selected; select exactly one target face")]
    NoSelection,

    #[error("{0} entities are selected; select exactly one target face")]
    MultipleSelection(usize),

    #[error("The selected entity is not a face")]
    NotAFace,

    #[error("Target face is not planar: point {index} lies {distance:.3e} off its plane")]
    NonPlanarTarget { index: usize, distance: f64 },

    #[error("Target face is degenerate: {0}")]
    DegenerateTarget(String),

    #[error("Sun direction has zero length")]
    ZeroSunDirection,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation '{0}' is already open")]
    OperationInProgress(String),

    #[error("No operation is open")]
    NoOpenOperation,

    #[error("Mesh error: {0}")]
    Topology(#[from] shadow_caster_topology::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] shadow_caster_geometry::Error),

    #[error("Scene error: {0}")]
    Scene(#[from] shadow_caster_scene::Error),
}

impl Error {
    /// Whether the error was raised before a session opened.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::NoSelection
                | Error::MultipleSelection(_)
                | Error::NotAFace
                | Error::NonPlanarTarget { .. }
                | Error::DegenerateTarget(_)
                | Error::ZeroSunDirection
                | Error::InvalidConfig(_)
        )
    }
}
