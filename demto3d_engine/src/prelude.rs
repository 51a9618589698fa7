pub use glam::{Vec2, Vec3};

pub use itertools::Itertools;

pub use crate::error::{MeshError, MeshResult};
pub use crate::mesh::assembly::{Assembly, ShapingParameters};
pub use crate::mesh::heightmap::HeightMap;

pub use demto3d_commons::math::*;
