// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON scene documents.
//!
//! Definitions are keyed by name and instances refer to them by name.
//! Transforms are 16 numbers in row-major order. Loading resolves every name
//! to a [`DefinitionKey`](crate::model::DefinitionKey) up front, so forward
//! references between definitions are allowed.
//!
//! ```json
//! {
//!   "definitions": [
//!     { "name": "slab", "nodes": [
//!       { "type": "face", "outer": [[0,0,1], [1,0,1], [1,1,1], [0,1,1]] }
//!     ] }
//!   ],
//!   "roots": [
//!     { "type": "face", "outer": [[0,0,0], [1,0,0], [1,1,0], [0,1,0]] },
//!     { "type": "instance", "definition": "slab" }
//!   ],
//!   "selection": [0],
//!   "sun": [0, 0, 1]
//! }
//! ```

use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{InstanceRef, LeafFace, NodeAttributes, Scene, SceneNode, SelectedEntity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub definitions: Vec<DefinitionDocument>,
    pub roots: Vec<NodeDocument>,
    /// Indices into `roots`
    #[serde(default)]
    pub selection: Vec<usize>,
    /// Direction toward the sun
    #[serde(default = "default_sun")]
    pub sun: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionDocument {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeDocument {
    Face {
        outer: Vec<[f64; 3]>,
        #[serde(default)]
        holes: Vec<Vec<[f64; 3]>>,
        #[serde(default)]
        attributes: NodeAttributes,
    },
    Instance {
        definition: String,
        #[serde(default = "identity")]
        transform: [f64; 16],
        #[serde(default)]
        attributes: NodeAttributes,
    },
}

fn default_sun() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

fn identity() -> [f64; 16] {
    [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}

/// A loaded document: the scene plus the inputs that came with it.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub scene: Scene,
    pub selection: Vec<SelectedEntity>,
    pub sun: Vector3<f64>,
}

impl SceneDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the scene arena, resolving definition names.
    pub fn load(&self) -> Result<LoadedScene> {
        let mut scene = Scene::new();
        let mut keys = Vec::with_capacity(self.definitions.len());
        for def in &self.definitions {
            keys.push(scene.add_definition(&def.name)?);
        }

        for (def, &key) in self.definitions.iter().zip(&keys) {
            for node in &def.nodes {
                let node = node.to_node(&scene)?;
                scene.push_node(key, node)?;
            }
        }
        for node in &self.roots {
            let node = node.to_node(&scene)?;
            scene.add_root(node);
        }

        let selection = self
            .selection
            .iter()
            .map(|&i| scene.select(i))
            .collect::<Result<Vec<_>>>()?;

        Ok(LoadedScene {
            scene,
            selection,
            sun: Vector3::from(self.sun),
        })
    }
}

impl NodeDocument {
    fn to_node(&self, scene: &Scene) -> Result<SceneNode> {
        let loop3 = |pts: &[[f64; 3]]| pts.iter().map(|&p| Point3::from(p)).collect::<Vec<_>>();
        match self {
            NodeDocument::Face {
                outer,
                holes,
                attributes,
            } => Ok(SceneNode::Face(LeafFace {
                outer: loop3(outer),
                holes: holes.iter().map(|h| loop3(h)).collect(),
                attrs: *attributes,
            })),
            NodeDocument::Instance {
                definition,
                transform,
                attributes,
            } => {
                let key = scene
                    .definition_by_name(definition)
                    .ok_or_else(|| Error::UnknownDefinition(definition.clone()))?;
                Ok(SceneNode::Instance(
                    InstanceRef::new(key, Matrix4::from_row_slice(transform)).with_attrs(*attributes),
                ))
            }
        }
    }
}

/// Parses and loads a document in one step.
pub fn load_scene(json: &str) -> Result<LoadedScene> {
    SceneDocument::from_json(json)?.load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::walk;
    use approx::assert_relative_eq;

    const DOC: &str = r#"{
        "definitions": [
            { "name": "tower", "nodes": [
                { "type": "instance", "definition": "slab",
                  "transform": [1,0,0,0, 0,1,0,0, 0,0,1,2, 0,0,0,1] }
            ] },
            { "name": "slab", "nodes": [
                { "type": "face", "outer": [[0,0,1],[1,0,1],[1,1,1],[0,1,1]],
                  "holes": [[[0.25,0.25,1],[0.25,0.75,1],[0.75,0.75,1],[0.75,0.25,1]]] },
                { "type": "face", "outer": [[0,0,0],[1,0,0],[0,1,0]],
                  "attributes": { "casts_shadows": false } }
            ] }
        ],
        "roots": [
            { "type": "face", "outer": [[0,0,0],[1,0,0],[1,1,0],[0,1,0]] },
            { "type": "instance", "definition": "tower" }
        ],
        "selection": [0]
    }"#;

    #[test]
    fn test_load_resolves_forward_references() {
        let loaded = load_scene(DOC).unwrap();
        assert_eq!(loaded.scene.definition_count(), 2);
        assert_eq!(loaded.selection, vec![SelectedEntity::Face(0)]);
        assert_relative_eq!(loaded.sun, Vector3::z());

        let roots = loaded.scene.instance_roots();
        let items: Vec<_> = walk(&loaded.scene, &roots, Matrix4::identity())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].face.holes.len(), 1);
        let top = items[0].transform.transform_point(&items[0].face.outer[0]);
        assert_relative_eq!(top, Point3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_unknown_definition() {
        let json = r#"{ "roots": [ { "type": "instance", "definition": "ghost" } ] }"#;
        assert_eq!(
            load_scene(json).unwrap_err(),
            Error::UnknownDefinition("ghost".to_string())
        );
    }

    #[test]
    fn test_bad_selection_and_bad_json() {
        let json = r#"{ "roots": [], "selection": [3] }"#;
        assert_eq!(load_scene(json).unwrap_err(), Error::InvalidSelection(3));
        assert!(matches!(load_scene("{ nope"), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_document_round_trip() {
        let doc = SceneDocument::from_json(DOC).unwrap();
        let again = SceneDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(doc, again);
    }
}
