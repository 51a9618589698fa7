// Copyright (C) 2022 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Some useful re-exports
pub mod prelude;

/// Error taxonomy shared by every stage of mesh generation.
pub mod error;

/// Heightmaps, the assembler that lays them out, and the binary STL writer.
pub mod mesh;

/// The single entry point exposed to callers: grids + parameters in, STL out.
pub mod export;

pub use error::{MeshError, MeshResult};
pub use export::{generate, generate_to_path};
pub use mesh::assembly::{assemble, Assembly, ShapingParameters};
pub use mesh::heightmap::HeightMap;
pub use mesh::stl::{write_stl, FacetWriter};

#[cfg(test)]
mod engine_tests;
