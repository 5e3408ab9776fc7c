// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration.
//!
//! Defaults can be overridden from environment variables, then from a JSON
//! file laid over them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shadow pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Distance in model units used for on-plane tests, vertex welding,
    /// edge splitting and planarity. Collinearity compares areas with
    /// `tolerance²`.
    pub tolerance: f64,
    /// Maximum instance nesting depth.
    pub max_depth: usize,
    /// Name of the committed shadow container.
    pub container_name: String,
    /// Name of the undoable edit operation.
    pub operation_name: String,
    /// Cleanup passes per merge or subtraction before giving up.
    pub max_cleanup_passes: usize,
    /// Keep only the part of the shadow inside the target face.
    pub clip_to_target: bool,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_depth: shadow_caster_scene::DEFAULT_MAX_DEPTH,
            container_name: "Shadow".into(),
            operation_name: "Cast Shadows".into(),
            max_cleanup_passes: 8,
            clip_to_target: true,
        }
    }
}

impl ShadowConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tolerance: env_or("SHADOW_TOLERANCE", defaults.tolerance),
            max_depth: env_or("SHADOW_MAX_DEPTH", defaults.max_depth),
            container_name: std::env::var("SHADOW_CONTAINER_NAME").unwrap_or(defaults.container_name),
            operation_name: std::env::var("SHADOW_OPERATION_NAME").unwrap_or(defaults.operation_name),
            max_cleanup_passes: env_or("SHADOW_MAX_CLEANUP_PASSES", defaults.max_cleanup_passes),
            clip_to_target: env_or("SHADOW_CLIP_TO_TARGET", defaults.clip_to_target),
        }
    }

    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Overlays the fields present in a JSON object onto this configuration.
    ///
    /// Fields the document does not mention keep their current values.
    pub fn overlay_json(&self, json: &str) -> Result<Self> {
        let invalid = |e: serde_json::Error| Error::InvalidConfig(e.to_string());
        let mut merged = serde_json::to_value(self).map_err(invalid)?;
        let patch: serde_json::Value = serde_json::from_str(json).map_err(invalid)?;
        let (Some(fields), serde_json::Value::Object(overrides)) = (merged.as_object_mut(), patch) else {
            return Err(Error::InvalidConfig("configuration must be a JSON object".into()));
        };
        fields.extend(overrides);
        serde_json::from_value(merged).map_err(invalid)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_cleanup_passes == 0 {
            return Err(Error::InvalidConfig("max_cleanup_passes must be at least 1".into()));
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
