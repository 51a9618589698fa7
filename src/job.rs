// Copyright (C) 2022 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// A synthetic Perlin noise tile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PerlinTile {
    pub width: usize,
    pub height: usize,
    pub frequency: f32,
    #[serde(default)]
    pub offset: Vec2,
    pub amplitude: f32,
}

impl PerlinTile {
    pub fn build(&self) -> Result<HeightMap> {
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            bail!("Tile frequency must be positive, got {}", self.frequency);
        }
        Ok(HeightMap::from_perlin(
            self.width,
            self.height,
            self.frequency,
            self.offset,
            self.amplitude,
        )?)
    }
}

fn default_parallel() -> bool {
    true
}

/// Everything needed to produce one mesh file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub shaping: ShapingParameters,
    /// Stacked along the y axis, in order.
    pub tiles: Vec<PerlinTile>,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub num_threads: Option<usize>,
}

impl Job {
    pub fn facet_writer(&self) -> FacetWriter {
        FacetWriter {
            parallel: self.parallel,
            num_threads: self.num_threads,
        }
    }

    pub fn run(&self, output: &Path) -> Result<u32> {
        if self.tiles.is_empty() {
            bail!("The job does not contain any tiles");
        }
        let heightmaps = self
            .tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| tile.build().with_context(|| format!("Building tile {i}")))
            .collect::<Result<Vec<_>>>()?;

        demto3d_engine::generate_to_path(&heightmaps, &self.shaping, output, &self.facet_writer())
            .with_context(|| format!("Generating {}", output.display()))
    }
}

pub fn load(path: &Path) -> Result<Job> {
    let reader = std::io::BufReader::new(
        std::fs::File::open(path).with_context(|| format!("Opening {}", path.display()))?,
    );
    let job: Job = ron::de::from_reader(reader)?;
    Ok(job)
}
