// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scoped edit operation.
//!
//! An [`EditSession`] opens an operation on creation and aborts it when
//! dropped without [`EditSession::commit`], so every error path out of the
//! pipeline rolls back.

use crate::error::Result;
use crate::store::{ContainerKey, SceneStore, ShadowContainer};

pub struct EditSession<'s, S: SceneStore + ?Sized> {
    store: &'s mut S,
    name: String,
    finished: bool,
}

impl<'s, S: SceneStore + ?Sized> EditSession<'s, S> {
    pub fn begin(store: &'s mut S, name: &str) -> Result<Self> {
        store.begin_operation(name)?;
        tracing::debug!(operation = name, "operation opened");
        Ok(Self {
            store,
            name: name.to_string(),
            finished: false,
        })
    }

    pub fn store(&self) -> &S {
        self.store
    }

    pub fn add_container(&mut self, container: ShadowContainer) -> Result<()> {
        self.store.stage_container(container)
    }

    pub fn commit(mut self) -> Result<Vec<ContainerKey>> {
        let keys = self.store.commit_operation()?;
        self.finished = true;
        tracing::debug!(operation = %self.name, containers = keys.len(), "operation committed");
        Ok(keys)
    }

    pub fn abort(mut self) -> Result<()> {
        self.finished = true;
        self.store.abort_operation()
    }
}

impl<S: SceneStore + ?Sized> Drop for EditSession<'_, S> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::warn!(operation = %self.name, "operation rolled back");
        if let Err(e) = self.store.abort_operation() {
            tracing::error!(operation = %self.name, error = %e, "rollback failed");
        }
    }
}
