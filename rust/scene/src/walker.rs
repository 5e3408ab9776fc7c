// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lazy depth-first traversal yielding shadow-casting faces.
//!
//! The walk keeps an explicit stack of node lists. Each instance pushes the
//! nodes of its definition with the composed transform `parent * instance`.
//! Definitions on the active descent path are tracked so a definition that
//! (directly or indirectly) contains itself is reported instead of looping.

use nalgebra::Matrix4;

use crate::error::{Error, Result};
use crate::model::{DefinitionKey, LeafFace, Scene, SceneNode};

/// Default nesting limit for instances
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A face to cast, with the transform from its definition to world space.
#[derive(Debug, Clone, Copy)]
pub struct WalkItem<'a> {
    pub face: &'a LeafFace,
    pub transform: Matrix4<f64>,
    /// Number of instances between the roots and this face
    pub depth: usize,
}

struct Level<'a> {
    nodes: &'a [SceneNode],
    next: usize,
    transform: Matrix4<f64>,
    definition: Option<DefinitionKey>,
}

/// Iterator returned by [`walk`].
///
/// The first error ends the walk.
pub struct SceneWalk<'a> {
    scene: &'a Scene,
    stack: Vec<Level<'a>>,
    active: Vec<DefinitionKey>,
    max_depth: usize,
    done: bool,
}

/// Walks `roots` (usually top-level nodes of `scene`) starting from `transform`.
///
/// Nodes that do not cast shadows, are hidden, or sit on a hidden layer are
/// skipped together with everything below them. Calling `walk` again starts
/// a fresh traversal.
pub fn walk<'a>(scene: &'a Scene, roots: &'a [SceneNode], transform: Matrix4<f64>) -> SceneWalk<'a> {
    SceneWalk {
        scene,
        stack: vec![Level {
            nodes: roots,
            next: 0,
            transform,
            definition: None,
        }],
        active: Vec::new(),
        max_depth: DEFAULT_MAX_DEPTH,
        done: false,
    }
}

impl<'a> SceneWalk<'a> {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn fail(&mut self, err: Error) -> Option<Result<WalkItem<'a>>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<'a> Iterator for SceneWalk<'a> {
    type Item = Result<WalkItem<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let depth = self.stack.len().checked_sub(1)?;
            let level = self.stack.last_mut()?;
            let nodes = level.nodes;
            if level.next >= nodes.len() {
                if level.definition.is_some() {
                    self.active.pop();
                }
                self.stack.pop();
                continue;
            }

            let node = &nodes[level.next];
            level.next += 1;
            let parent = level.transform;

            if !node.attrs().contributes() {
                continue;
            }

            match node {
                SceneNode::Face(face) => {
                    return Some(Ok(WalkItem {
                        face,
                        transform: parent,
                        depth,
                    }));
                }
                SceneNode::Instance(inst) => {
                    let scene = self.scene;
                    let Some(def) = scene.definition(inst.definition) else {
                        return self.fail(Error::MissingDefinition);
                    };
                    if self.active.contains(&inst.definition) {
                        return self.fail(Error::CyclicDefinition(def.name.clone()));
                    }
                    if depth + 1 > self.max_depth {
                        return self.fail(Error::DepthLimit(self.max_depth));
                    }
                    self.active.push(inst.definition);
                    self.stack.push(Level {
                        nodes: &def.nodes,
                        next: 0,
                        transform: parent * inst.transform,
                        definition: Some(inst.definition),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InstanceRef, NodeAttributes};
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    fn unit_face() -> LeafFace {
        LeafFace::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn test_walk_yields_faces_in_order() {
        let mut scene = Scene::new();
        scene.add_root(unit_face());
        scene.add_root(unit_face().with_attrs(NodeAttributes::hidden()));
        scene.add_root(unit_face());

        let items: Vec<_> = walk(&scene, scene.roots(), Matrix4::identity())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.depth == 0));
    }

    #[test]
    fn test_instance_transform_is_composed() {
        let mut scene = Scene::new();
        let inner = scene.add_definition("inner").unwrap();
        scene.push_node(inner, unit_face()).unwrap();
        let outer = scene.add_definition("outer").unwrap();
        let scale = Matrix4::new_scaling(2.0);
        scene.push_node(outer, InstanceRef::new(inner, scale)).unwrap();
        let shift = Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0));
        scene.add_root(InstanceRef::new(outer, shift));

        let item = walk(&scene, scene.roots(), Matrix4::identity())
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(item.depth, 2);
        // parent * instance: scale first, then translate
        let p = item.transform.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(12.0, 0.0, 0.0));
    }

    #[test]
    fn test_skip_prunes_subtree() {
        let mut scene = Scene::new();
        let def = scene.add_definition("d").unwrap();
        scene.push_node(def, unit_face()).unwrap();
        let off_layer = NodeAttributes {
            layer_visible: false,
            ..Default::default()
        };
        scene.add_root(InstanceRef::new(def, Matrix4::identity()).with_attrs(off_layer));

        assert_eq!(walk(&scene, scene.roots(), Matrix4::identity()).count(), 0);
    }

    #[test]
    fn test_shared_definition_visited_per_instance() {
        let mut scene = Scene::new();
        let def = scene.add_definition("d").unwrap();
        scene.push_node(def, unit_face()).unwrap();
        for i in 0..3 {
            let t = Matrix4::new_translation(&Vector3::new(i as f64, 0.0, 0.0));
            scene.add_root(InstanceRef::new(def, t));
        }
        let xs: Vec<f64> = walk(&scene, scene.roots(), Matrix4::identity())
            .map(|r| r.unwrap().transform[(0, 3)])
            .collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_cycle_is_an_error() {
        let mut scene = Scene::new();
        let a = scene.add_definition("a").unwrap();
        let b = scene.add_definition("b").unwrap();
        scene.push_node(a, unit_face()).unwrap();
        scene.push_node(a, InstanceRef::new(b, Matrix4::identity())).unwrap();
        scene.push_node(b, InstanceRef::new(a, Matrix4::identity())).unwrap();
        scene.add_root(InstanceRef::new(a, Matrix4::identity()));

        let results: Vec<_> = walk(&scene, scene.roots(), Matrix4::identity()).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1].as_ref().unwrap_err(),
            &Error::CyclicDefinition("a".to_string())
        );
    }

    #[test]
    fn test_sibling_reuse_is_not_a_cycle() {
        let mut scene = Scene::new();
        let leaf = scene.add_definition("leaf").unwrap();
        scene.push_node(leaf, unit_face()).unwrap();
        let pair = scene.add_definition("pair").unwrap();
        scene.push_node(pair, InstanceRef::new(leaf, Matrix4::identity())).unwrap();
        scene.push_node(pair, InstanceRef::new(leaf, Matrix4::identity())).unwrap();
        scene.add_root(InstanceRef::new(pair, Matrix4::identity()));

        let items: Result<Vec<_>> = walk(&scene, scene.roots(), Matrix4::identity()).collect();
        assert_eq!(items.unwrap().len(), 2);
    }

    #[test]
    fn test_depth_limit() {
        let mut scene = Scene::new();
        let mut prev = scene.add_definition("d0").unwrap();
        scene.push_node(prev, unit_face()).unwrap();
        for i in 1..5 {
            let def = scene.add_definition(&format!("d{i}")).unwrap();
            scene.push_node(def, InstanceRef::new(prev, Matrix4::identity())).unwrap();
            prev = def;
        }
        scene.add_root(InstanceRef::new(prev, Matrix4::identity()));

        let deep: Result<Vec<_>> = walk(&scene, scene.roots(), Matrix4::identity())
            .with_max_depth(3)
            .collect();
        assert_eq!(deep.unwrap_err(), Error::DepthLimit(3));

        let ok: Result<Vec<_>> = walk(&scene, scene.roots(), Matrix4::identity())
            .with_max_depth(5)
            .collect();
        assert_eq!(ok.unwrap().len(), 1);
    }

    #[test]
    fn test_walk_is_restartable() {
        let mut scene = Scene::new();
        scene.add_root(unit_face());
        let first = walk(&scene, scene.roots(), Matrix4::identity()).count();
        let second = walk(&scene, scene.roots(), Matrix4::identity()).count();
        assert_eq!(first, second);
    }
}
