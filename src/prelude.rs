pub use anyhow::{bail, Context, Result};

pub use glam::Vec2;

pub use demto3d_engine::{FacetWriter, HeightMap, ShapingParameters};
