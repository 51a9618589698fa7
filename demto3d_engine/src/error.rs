// Copyright (C) 2022 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

pub type MeshResult<T> = Result<T, MeshError>;

#[derive(Debug, Error)]
pub enum MeshError {
    /// Invalid input grids or shaping parameters. Always reported before any
    /// facet is generated or any byte is written.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The number of facets generated disagrees with the count announced in
    /// the header. Unreachable unless the facet generator has a bug.
    #[error("facet count mismatch: header announces {expected}, generated {actual}")]
    Consistency { expected: u64, actual: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MeshError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Returns early with a [`MeshError::Configuration`].
#[macro_export]
macro_rules! bail_config {
    ($($arg:tt)*) => {
        return Err($crate::error::MeshError::config(format!($($arg)*)))
    };
}
