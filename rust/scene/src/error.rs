// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unknown definition: {0}")]
    UnknownDefinition(String),

    #[error("Duplicate definition name: {0}")]
    DuplicateDefinition(String),

    #[error("Definition key is not in this scene")]
    MissingDefinition,

    #[error("Definition '{0}' contains itself")]
    CyclicDefinition(String),

    #[error("Instance nesting exceeds depth limit of {0}")]
    DepthLimit(usize),

    #[error("Selection index {0} is out of range")]
    InvalidSelection(usize),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
