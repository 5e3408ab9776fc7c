// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Shadow Caster Scene
//!
//! Scene graph input for shadow casting: leaf faces, instances of shared
//! definitions stored in a slot-map arena, a JSON document format, and a
//! lazy walker that yields every shadow-casting face with its world
//! transform.

pub mod document;
pub mod error;
pub mod model;
pub mod walker;

pub use document::{load_scene, LoadedScene, SceneDocument};
pub use error::{Error, Result};
pub use model::{
    Definition, DefinitionKey, InstanceRef, LeafFace, NodeAttributes, Scene, SceneNode, SelectedEntity,
};
pub use walker::{walk, SceneWalk, WalkItem, DEFAULT_MAX_DEPTH};
