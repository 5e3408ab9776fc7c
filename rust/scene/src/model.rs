// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene nodes and the definition arena.
//!
//! A scene is a list of top-level nodes plus an arena of named definitions.
//! Instances refer to definitions by key, so one definition can be placed
//! many times. Definitions are owned by the [`Scene`] and never by an
//! instance.

use nalgebra::{Matrix4, Point3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::error::{Error, Result};

new_key_type! {
    /// Key for a shared definition.
    pub struct DefinitionKey;
}

/// Flags deciding whether a node contributes to the shadow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeAttributes {
    pub casts_shadows: bool,
    pub visible: bool,
    pub layer_visible: bool,
}

impl Default for NodeAttributes {
    fn default() -> Self {
        Self {
            casts_shadows: true,
            visible: true,
            layer_visible: true,
        }
    }
}

impl NodeAttributes {
    /// `true` when none of the skip conditions hold.
    #[inline]
    pub fn contributes(&self) -> bool {
        self.casts_shadows && self.visible && self.layer_visible
    }

    /// Attributes of a hidden node.
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::default()
        }
    }
}

/// A planar face: one outer loop and zero or more hole loops.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafFace {
    pub outer: Vec<Point3<f64>>,
    pub holes: Vec<Vec<Point3<f64>>>,
    pub attrs: NodeAttributes,
}

impl LeafFace {
    pub fn new(outer: Vec<Point3<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
            attrs: NodeAttributes::default(),
        }
    }

    pub fn with_hole(mut self, hole: Vec<Point3<f64>>) -> Self {
        self.holes.push(hole);
        self
    }

    pub fn with_attrs(mut self, attrs: NodeAttributes) -> Self {
        self.attrs = attrs;
        self
    }
}

/// A placement of a shared definition.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRef {
    pub definition: DefinitionKey,
    pub transform: Matrix4<f64>,
    pub attrs: NodeAttributes,
}

impl InstanceRef {
    pub fn new(definition: DefinitionKey, transform: Matrix4<f64>) -> Self {
        Self {
            definition,
            transform,
            attrs: NodeAttributes::default(),
        }
    }

    pub fn with_attrs(mut self, attrs: NodeAttributes) -> Self {
        self.attrs = attrs;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Face(LeafFace),
    Instance(InstanceRef),
}

impl SceneNode {
    pub fn attrs(&self) -> &NodeAttributes {
        match self {
            SceneNode::Face(face) => &face.attrs,
            SceneNode::Instance(inst) => &inst.attrs,
        }
    }

    pub fn as_face(&self) -> Option<&LeafFace> {
        match self {
            SceneNode::Face(face) => Some(face),
            SceneNode::Instance(_) => None,
        }
    }

    pub fn is_instance(&self) -> bool {
        matches!(self, SceneNode::Instance(_))
    }
}

impl From<LeafFace> for SceneNode {
    fn from(face: LeafFace) -> Self {
        SceneNode::Face(face)
    }
}

impl From<InstanceRef> for SceneNode {
    fn from(inst: InstanceRef) -> Self {
        SceneNode::Instance(inst)
    }
}

/// A named, shareable sequence of nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Definition {
    pub name: String,
    pub nodes: Vec<SceneNode>,
}

/// A selected top-level node, by index into [`Scene::roots`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectedEntity {
    Face(usize),
    Instance(usize),
}

/// Top-level nodes plus the definition arena.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    definitions: SlotMap<DefinitionKey, Definition>,
    names: FxHashMap<String, DefinitionKey>,
    roots: Vec<SceneNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty definition.
    pub fn add_definition(&mut self, name: &str) -> Result<DefinitionKey> {
        if self.names.contains_key(name) {
            return Err(Error::DuplicateDefinition(name.to_string()));
        }
        let key = self.definitions.insert(Definition {
            name: name.to_string(),
            nodes: Vec::new(),
        });
        self.names.insert(name.to_string(), key);
        Ok(key)
    }

    /// Appends a node to a definition.
    ///
    /// Instances may point at any definition, including the one they are
    /// added to. Such cycles are reported by the walker.
    pub fn push_node(&mut self, definition: DefinitionKey, node: impl Into<SceneNode>) -> Result<()> {
        let def = self
            .definitions
            .get_mut(definition)
            .ok_or(Error::MissingDefinition)?;
        def.nodes.push(node.into());
        Ok(())
    }

    /// Appends a top-level node and returns its index.
    pub fn add_root(&mut self, node: impl Into<SceneNode>) -> usize {
        self.roots.push(node.into());
        self.roots.len() - 1
    }

    pub fn roots(&self) -> &[SceneNode] {
        &self.roots
    }

    pub fn root(&self, index: usize) -> Option<&SceneNode> {
        self.roots.get(index)
    }

    pub fn definition(&self, key: DefinitionKey) -> Option<&Definition> {
        self.definitions.get(key)
    }

    pub fn definition_by_name(&self, name: &str) -> Option<DefinitionKey> {
        self.names.get(name).copied()
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Top-level instance nodes.
    ///
    /// Loose top-level faces are working geometry (including any shadow
    /// target) and are not casters.
    pub fn instance_roots(&self) -> Vec<SceneNode> {
        self.roots.iter().filter(|n| n.is_instance()).cloned().collect()
    }

    /// Classifies a top-level node for selection.
    pub fn select(&self, index: usize) -> Result<SelectedEntity> {
        match self.roots.get(index) {
            Some(SceneNode::Face(_)) => Ok(SelectedEntity::Face(index)),
            Some(SceneNode::Instance(_)) => Ok(SelectedEntity::Instance(index)),
            None => Err(Error::InvalidSelection(index)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> LeafFace {
        LeafFace::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn test_attributes_default_contribute() {
        assert!(NodeAttributes::default().contributes());
        assert!(!NodeAttributes::hidden().contributes());
        let no_cast = NodeAttributes {
            casts_shadows: false,
            ..Default::default()
        };
        assert!(!no_cast.contributes());
    }

    #[test]
    fn test_definitions_are_shared() {
        let mut scene = Scene::new();
        let def = scene.add_definition("box").unwrap();
        scene.push_node(def, triangle()).unwrap();

        scene.add_root(InstanceRef::new(def, Matrix4::identity()));
        scene.add_root(InstanceRef::new(def, Matrix4::new_translation(&nalgebra::Vector3::x())));

        assert_eq!(scene.definition_count(), 1);
        assert_eq!(scene.definition_by_name("box"), Some(def));
        assert_eq!(scene.definition(def).unwrap().nodes.len(), 1);
    }

    #[test]
    fn test_duplicate_definition_rejected() {
        let mut scene = Scene::new();
        scene.add_definition("a").unwrap();
        assert_eq!(
            scene.add_definition("a"),
            Err(Error::DuplicateDefinition("a".to_string()))
        );
    }

    #[test]
    fn test_select_and_instance_roots() {
        let mut scene = Scene::new();
        let def = scene.add_definition("d").unwrap();
        let face = scene.add_root(triangle());
        let inst = scene.add_root(InstanceRef::new(def, Matrix4::identity()));

        assert_eq!(scene.select(face), Ok(SelectedEntity::Face(face)));
        assert_eq!(scene.select(inst), Ok(SelectedEntity::Instance(inst)));
        assert_eq!(scene.select(7), Err(Error::InvalidSelection(7)));
        assert_eq!(scene.instance_roots().len(), 1);
    }

    #[test]
    fn test_push_node_to_foreign_key_fails() {
        let mut other = Scene::new();
        let foreign = other.add_definition("x").unwrap();
        other.add_definition("y").unwrap();

        let mut scene = Scene::new();
        assert_eq!(scene.push_node(foreign, triangle()), Err(Error::MissingDefinition));
    }
}
