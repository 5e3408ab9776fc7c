// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Shadow Caster Processing
//!
//! The shadow pipeline: project every shadow-casting face of a scene onto a
//! selected target face along the sun direction, union the projections into
//! one planar mesh, remove what lies under faces resting on the target, and
//! commit the result as a single undoable operation.
//!
//! ```no_run
//! use shadow_caster_processing::{cast_shadows, InMemoryStore, ShadowConfig};
//! use shadow_caster_scene::load_scene;
//!
//! let json = std::fs::read_to_string("scene.json").unwrap();
//! let mut store = InMemoryStore::from_loaded(load_scene(&json).unwrap());
//! let report = cast_shadows(&mut store, &ShadowConfig::default()).unwrap();
//! println!("shadow area: {}", report.area);
//! ```

pub mod accumulator;
pub mod cleanup;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod ground;
pub mod pipeline;
pub mod session;
pub mod store;

pub use accumulator::{MergeOutcome, ShadowAccumulator};
pub use cleanup::{settle, CleanupSummary};
pub use config::ShadowConfig;
pub use context::TargetContext;
pub use diagnostics::{CleanupStage, Diagnostic, Diagnostics, EdgeAnomaly};
pub use error::{Error, Result};
pub use ground::{clip_to_target, subtract_footprints, GroundFootprint};
pub use pipeline::{cast_shadows, target_context, ShadowReport};
pub use session::EditSession;
pub use store::{CommittedOperation, ContainerKey, InMemoryStore, SceneStore, ShadowContainer};
