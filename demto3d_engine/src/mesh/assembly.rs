// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ndarray::{s, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::mesh::stl::HEADER_SIZE;
use crate::prelude::*;

/// Input elevations are divided by this before `vertical_size` is applied.
pub const VERTICAL_UNIT_DIVISOR: f64 = 750.0;

/// Controls how raw elevations become a printable block. All sizes are in
/// output units (the units of the written mesh).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapingParameters {
    /// Size of the shorter horizontal side of the first grid. When unset,
    /// every cell is one output unit wide.
    pub horizontal_size: Option<f64>,
    pub vertical_size: f64,
    /// Added to every elevation after scaling, so the solid sits on a plinth.
    pub base_height: f64,
    pub min_elevation: Option<f64>,
    /// Informational only, never used to clamp.
    pub max_elevation: Option<f64>,
    pub panel_separation_height: f64,
    pub panel_separation_depth: f64,
    pub tab_width: f64,
    pub tab_depth: f64,
    /// Height of the flat pads added above and below the block. Zero disables
    /// them.
    pub anchor_depth: f64,
    pub object_name: String,
}

impl Default for ShapingParameters {
    fn default() -> Self {
        Self {
            horizontal_size: None,
            vertical_size: 1.0,
            base_height: 0.0,
            min_elevation: None,
            max_elevation: None,
            panel_separation_height: 0.6,
            panel_separation_depth: 0.1,
            tab_width: 0.5,
            tab_depth: 0.3,
            anchor_depth: 0.0,
            object_name: "DEM 3D Model".into(),
        }
    }
}

impl ShapingParameters {
    /// Checks everything that can be checked without looking at the grids.
    /// Runs before any work is done, so a bad parameter never produces a
    /// partially written mesh.
    pub fn validate(&self) -> MeshResult<()> {
        validate_object_name(&self.object_name)?;

        if let Some(size) = self.horizontal_size {
            if !(size.is_finite() && size > 0.0) {
                crate::bail_config!("horizontal_size must be positive, got {size}");
            }
        }
        if !(self.vertical_size.is_finite() && self.vertical_size > 0.0) {
            crate::bail_config!("vertical_size must be positive, got {}", self.vertical_size);
        }
        // The bottom plane sits at z = 0, the terrain must stay above it.
        if !(self.base_height.is_finite() && self.base_height >= 0.0) {
            crate::bail_config!(
                "base_height must be a non-negative number, got {}",
                self.base_height
            );
        }
        for (name, value) in [
            ("min_elevation", self.min_elevation),
            ("max_elevation", self.max_elevation),
        ] {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                crate::bail_config!("{name} must be finite, got {v}");
            }
        }
        if let (Some(lo), Some(hi)) = (self.min_elevation, self.max_elevation) {
            if hi < lo {
                crate::bail_config!("max_elevation ({hi}) is below min_elevation ({lo})");
            }
        }
        for (name, value) in [
            ("panel_separation_height", self.panel_separation_height),
            ("panel_separation_depth", self.panel_separation_depth),
            ("tab_width", self.tab_width),
            ("tab_depth", self.tab_depth),
            ("anchor_depth", self.anchor_depth),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                crate::bail_config!("{name} must be a non-negative number, got {value}");
            }
        }
        Ok(())
    }

    fn vertical_scale(&self) -> f64 {
        self.vertical_size / VERTICAL_UNIT_DIVISOR
    }
}

/// Binary STL readers treat files whose header starts with `solid` as ASCII,
/// and the header only has room for 80 bytes.
pub fn validate_object_name(name: &str) -> MeshResult<()> {
    if name.len() > HEADER_SIZE {
        crate::bail_config!(
            "object name must be {HEADER_SIZE} bytes or less, got {} bytes",
            name.len()
        );
    }
    if name.as_bytes().starts_with(b"solid") {
        crate::bail_config!("object name must not start with \"solid\": {name:?}");
    }
    Ok(())
}

/// The result of laying out one or more heightmaps as a single block.
#[derive(Clone, Debug)]
pub struct Assembly {
    pub heightmap: HeightMap,
    /// Output units per grid cell, identical on both horizontal axes.
    pub horizontal_scale: f64,
}

/// Normalizes the given heightmaps and stacks them along the y axis,
/// separated by tabbed separator strips, optionally framed by anchor pads.
#[profiling::function]
pub fn assemble(heightmaps: &[HeightMap], params: &ShapingParameters) -> MeshResult<Assembly> {
    params.validate()?;

    let first = match heightmaps.first() {
        Some(first) => first,
        None => crate::bail_config!("at least one heightmap is required"),
    };
    if let Some((i, hm)) = heightmaps
        .iter()
        .enumerate()
        .find(|(_, hm)| hm.width() != first.width())
    {
        crate::bail_config!(
            "heightmap {i} is {} samples wide, but the first one is {}",
            hm.width(),
            first.width()
        );
    }

    let (data_min, data_max) = heightmaps
        .iter()
        .map(HeightMap::min_max)
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), (a, b)| {
            (lo.min(a), hi.max(b))
        });
    let h_min = params.min_elevation.unwrap_or(f64::from(data_min));
    let h_max = params.max_elevation.unwrap_or(f64::from(data_max));
    let vscale = params.vertical_scale();
    log::debug!(
        "Assembling {} heightmap(s): elevation range [{h_min}, {h_max}], vertical scale {vscale}",
        heightmaps.len()
    );

    let horizontal_scale = horizontal_scale(first, params.horizontal_size);

    let normalized = heightmaps
        .iter()
        .map(|hm| hm.normalized(h_min, vscale, params.base_height).into_inner())
        .collect_vec();

    let separator = separator_block(first.width(), horizontal_scale, params);
    let mut block = concatenate_rows(Itertools::intersperse(
        normalized.iter().map(|hm| hm.view()),
        separator.view(),
    ))?;

    let (block_min, block_max) = min_max(block.iter().copied()).unwrap_or((0.0, 0.0));
    if block_min < 0.0 {
        crate::bail_config!(
            "elevations reach {block_min} after normalization, below the bottom plane at 0; \
             min_elevation ({h_min}) must not exceed the lowest sample"
        );
    }

    if params.anchor_depth > 0.0 {
        let pad_rows = cells_for(params.anchor_depth, horizontal_scale);
        let pad = Array2::from_elem((pad_rows, block.ncols()), block_max);
        block = concatenate_rows(
            [
                pad.view(),
                separator.view(),
                block.view(),
                separator.view(),
                pad.view(),
            ]
            .into_iter(),
        )?;
    }

    log::debug!(
        "Assembled block is {}x{} samples, {horizontal_scale} units per cell",
        block.ncols(),
        block.nrows()
    );

    Ok(Assembly {
        heightmap: HeightMap::new(block)?,
        horizontal_scale,
    })
}

/// Output units per cell, so that the shorter side of `heightmap` (counted in
/// cells, not samples) spans exactly `horizontal_size`.
pub fn horizontal_scale(heightmap: &HeightMap, horizontal_size: Option<f64>) -> f64 {
    match horizontal_size {
        Some(size) => {
            let cells = (heightmap.width() - 1).min(heightmap.height() - 1);
            size / cells as f64
        }
        None => 1.0,
    }
}

/// Number of whole cells needed to cover `size` output units.
fn cells_for(size: f64, horizontal_scale: f64) -> usize {
    (size / horizontal_scale).ceil() as usize
}

/// A strip of `panel_separation_depth`, with `tab_depth` tabs at both ends
/// of every row.
fn separator_block(width: usize, horizontal_scale: f64, params: &ShapingParameters) -> Array2<f32> {
    let rows = cells_for(params.panel_separation_height, horizontal_scale);
    let tab = cells_for(params.tab_width, horizontal_scale).min(width);

    let mut separator = Array2::from_elem((rows, width), params.panel_separation_depth as f32);
    separator.slice_mut(s![.., ..tab]).fill(params.tab_depth as f32);
    separator.slice_mut(s![.., width - tab..]).fill(params.tab_depth as f32);
    separator
}

fn concatenate_rows<'a>(
    parts: impl Iterator<Item = ndarray::ArrayView2<'a, f32>>,
) -> MeshResult<Array2<f32>> {
    let parts = parts.collect_vec();
    ndarray::concatenate(Axis(0), &parts)
        .map_err(|err| MeshError::config(format!("cannot stack heightmaps: {err}")))
}
