// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host document access.
//!
//! The pipeline reads the scene, the selection and the sun through
//! [`SceneStore`] and writes its result as a [`ShadowContainer`] staged inside
//! a named operation. Nothing staged becomes visible until the operation is
//! committed; an aborted operation leaves the store as it was.

use nalgebra::Vector3;
use shadow_caster_geometry::PlaneFrame;
use shadow_caster_scene::{LoadedScene, Scene, SelectedEntity};
use shadow_caster_topology::{FaceLoops3, PlanarMesh};
use slotmap::{new_key_type, SlotMap};

use crate::error::{Error, Result};

new_key_type! {
    /// Key of a committed shadow container.
    pub struct ContainerKey;
}

/// A named group holding one shadow mesh.
#[derive(Debug, Clone)]
pub struct ShadowContainer {
    pub name: String,
    /// Always `false`: shadows never cast shadows themselves.
    pub casts_shadows: bool,
    /// Placement of the mesh's xy plane in the world.
    pub frame: PlaneFrame,
    pub mesh: PlanarMesh,
}

impl ShadowContainer {
    pub fn new(name: impl Into<String>, frame: PlaneFrame, mesh: PlanarMesh) -> Self {
        Self {
            name: name.into(),
            casts_shadows: false,
            frame,
            mesh,
        }
    }

    /// Face loops in world coordinates.
    pub fn world_loops(&self) -> Vec<FaceLoops3> {
        self.mesh.world_loops(&self.frame.local_to_world())
    }

    pub fn area(&self) -> f64 {
        self.mesh.total_area()
    }

    pub fn face_count(&self) -> usize {
        self.mesh.face_count()
    }
}

/// Document access required by the pipeline.
pub trait SceneStore {
    fn scene(&self) -> &Scene;

    fn selection(&self) -> &[SelectedEntity];

    /// Direction toward the sun.
    fn sun_direction(&self) -> Vector3<f64>;

    /// Opens a named operation. Fails if one is already open.
    fn begin_operation(&mut self, name: &str) -> Result<()>;

    /// Stages a container in the open operation.
    fn stage_container(&mut self, container: ShadowContainer) -> Result<()>;

    /// Makes the staged containers visible as one undoable step.
    fn commit_operation(&mut self) -> Result<Vec<ContainerKey>>;

    /// Discards everything staged since [`SceneStore::begin_operation`].
    fn abort_operation(&mut self) -> Result<()>;

    fn containers(&self) -> Vec<(ContainerKey, &ShadowContainer)>;

    fn container(&self, key: ContainerKey) -> Option<&ShadowContainer>;
}

#[derive(Debug)]
struct PendingOperation {
    name: String,
    staged: Vec<ShadowContainer>,
}

/// A committed operation.
#[derive(Debug, Clone)]
pub struct CommittedOperation {
    pub name: String,
    pub containers: Vec<ContainerKey>,
}

/// Store backed by an in-memory scene.
#[derive(Debug)]
pub struct InMemoryStore {
    scene: Scene,
    selection: Vec<SelectedEntity>,
    sun: Vector3<f64>,
    containers: SlotMap<ContainerKey, ShadowContainer>,
    pending: Option<PendingOperation>,
    history: Vec<CommittedOperation>,
}

impl InMemoryStore {
    pub fn new(scene: Scene, selection: Vec<SelectedEntity>, sun: Vector3<f64>) -> Self {
        Self {
            scene,
            selection,
            sun,
            containers: SlotMap::with_key(),
            pending: None,
            history: Vec::new(),
        }
    }

    pub fn from_loaded(loaded: LoadedScene) -> Self {
        Self::new(loaded.scene, loaded.selection, loaded.sun)
    }

    pub fn set_selection(&mut self, selection: Vec<SelectedEntity>) {
        self.selection = selection;
    }

    pub fn set_sun(&mut self, sun: Vector3<f64>) {
        self.sun = sun;
    }

    pub fn is_operation_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn history(&self) -> &[CommittedOperation] {
        &self.history
    }

    /// Reverts the last committed operation, returning its name.
    pub fn undo_last(&mut self) -> Option<String> {
        let op = self.history.pop()?;
        for key in &op.containers {
            self.containers.remove(*key);
        }
        tracing::debug!(operation = %op.name, "undone");
        Some(op.name)
    }
}

impl SceneStore for InMemoryStore {
    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn selection(&self) -> &[SelectedEntity] {
        &self.selection
    }

    fn sun_direction(&self) -> Vector3<f64> {
        self.sun
    }

    fn begin_operation(&mut self, name: &str) -> Result<()> {
        if let Some(open) = &self.pending {
            return Err(Error::OperationInProgress(open.name.clone()));
        }
        self.pending = Some(PendingOperation {
            name: name.to_string(),
            staged: Vec::new(),
        });
        Ok(())
    }

    fn stage_container(&mut self, container: ShadowContainer) -> Result<()> {
        let pending = self.pending.as_mut().ok_or(Error::NoOpenOperation)?;
        pending.staged.push(container);
        Ok(())
    }

    fn commit_operation(&mut self) -> Result<Vec<ContainerKey>> {
        let pending = self.pending.take().ok_or(Error::NoOpenOperation)?;
        let keys: Vec<ContainerKey> = pending
            .staged
            .into_iter()
            .map(|c| self.containers.insert(c))
            .collect();
        self.history.push(CommittedOperation {
            name: pending.name,
            containers: keys.clone(),
        });
        Ok(keys)
    }

    fn abort_operation(&mut self) -> Result<()> {
        self.pending.take().ok_or(Error::NoOpenOperation)?;
        Ok(())
    }

    fn containers(&self) -> Vec<(ContainerKey, &ShadowContainer)> {
        self.containers.iter().collect()
    }

    fn container(&self, key: ContainerKey) -> Option<&ShadowContainer> {
        self.containers.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use shadow_caster_geometry::Plane;
    use shadow_caster_topology::construction::make_rectangle;

    fn container() -> ShadowContainer {
        let frame = PlaneFrame::from_plane(&Plane::new(Point3::new(0.0, 0.0, 2.0), Vector3::z()).unwrap());
        let mut mesh = PlanarMesh::new();
        make_rectangle(&mut mesh, 0.0, 0.0, 1.0, 1.0).unwrap();
        ShadowContainer::new("Shadow", frame, mesh)
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new(Scene::new(), Vec::new(), Vector3::z())
    }

    #[test]
    fn test_commit_makes_containers_visible() {
        let mut store = store();
        store.begin_operation("Cast Shadows").unwrap();
        store.stage_container(container()).unwrap();
        assert!(store.containers().is_empty());

        let keys = store.commit_operation().unwrap();
        assert_eq!(keys.len(), 1);
        let c = store.container(keys[0]).unwrap();
        assert!(!c.casts_shadows);
        assert_eq!(c.face_count(), 1);
        assert!(c.world_loops()[0].outer.iter().all(|p| (p.z - 2.0).abs() < 1e-12));
        assert_eq!(store.history()[0].name, "Cast Shadows");
    }

    #[test]
    fn test_abort_discards_staged() {
        let mut store = store();
        store.begin_operation("Cast Shadows").unwrap();
        store.stage_container(container()).unwrap();
        store.abort_operation().unwrap();

        assert!(store.containers().is_empty());
        assert!(!store.is_operation_open());
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_operations_do_not_nest() {
        let mut store = store();
        store.begin_operation("first").unwrap();
        let err = store.begin_operation("second").unwrap_err();
        assert!(matches!(err, Error::OperationInProgress(name) if name == "first"));
    }

    #[test]
    fn test_staging_requires_open_operation() {
        let mut store = store();
        assert!(matches!(store.stage_container(container()), Err(Error::NoOpenOperation)));
        assert!(matches!(store.commit_operation(), Err(Error::NoOpenOperation)));
        assert!(matches!(store.abort_operation(), Err(Error::NoOpenOperation)));
    }

    #[test]
    fn test_undo_last() {
        let mut store = store();
        store.begin_operation("Cast Shadows").unwrap();
        store.stage_container(container()).unwrap();
        store.commit_operation().unwrap();

        assert_eq!(store.undo_last().as_deref(), Some("Cast Shadows"));
        assert!(store.containers().is_empty());
        assert_eq!(store.undo_last(), None);
    }
}
