// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary STL output.
//!
//! ```text
//! UINT8[80]    – Header, holds the object name. Never starts with "solid"
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count, always 0
//! end
//! ```

use std::io::Write;

use rayon::prelude::*;

use crate::mesh::assembly::validate_object_name;
use crate::mesh::facets::{facet_count, row_facets, FACET_SIZE};
use crate::prelude::*;

/// STL binary header size in bytes.
pub const HEADER_SIZE: usize = 80;

/// Writes heightmaps as binary STL. Rows are generated on the rayon thread
/// pool unless `parallel` is disabled; the output is the same either way.
#[derive(Clone, Debug)]
pub struct FacetWriter {
    pub parallel: bool,
    /// When set, rows are generated on a dedicated pool of this many threads
    /// instead of the global one.
    pub num_threads: Option<usize>,
}

impl Default for FacetWriter {
    fn default() -> Self {
        Self {
            parallel: true,
            num_threads: None,
        }
    }
}

impl FacetWriter {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            num_threads: None,
        }
    }

    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            parallel: true,
            num_threads: Some(num_threads),
        }
    }

    /// Writes the closed solid for `heightmap` to `writer` and returns the
    /// number of facets written.
    ///
    /// Nothing is written if the object name is invalid. An I/O error aborts
    /// the write, leaving whatever was already written in `writer`; callers
    /// must discard the destination in that case.
    #[profiling::function]
    pub fn write<W: Write>(
        &self,
        heightmap: &HeightMap,
        horizontal_scale: f64,
        object_name: &str,
        mut writer: W,
    ) -> MeshResult<u32> {
        validate_object_name(object_name)?;
        if !(horizontal_scale.is_finite() && horizontal_scale > 0.0) {
            crate::bail_config!("horizontal scale must be positive, got {horizontal_scale}");
        }
        let expected = facet_count(heightmap.width(), heightmap.height());
        let announced = u32::try_from(expected).map_err(|_| {
            MeshError::config(format!(
                "a {}x{} heightmap needs {expected} facets, more than binary STL can hold",
                heightmap.width(),
                heightmap.height()
            ))
        })?;

        let rows = self.generate_rows(heightmap, horizontal_scale)?;

        let generated = rows.iter().map(|r| r.len()).sum::<usize>() / FACET_SIZE;
        if generated as u64 != expected {
            return Err(MeshError::Consistency {
                expected,
                actual: generated as u64,
            });
        }

        let mut header = [0u8; HEADER_SIZE];
        header[..object_name.len()].copy_from_slice(object_name.as_bytes());
        writer.write_all(&header)?;
        writer.write_all(&announced.to_le_bytes())?;
        for row in &rows {
            writer.write_all(row)?;
        }
        writer.flush()?;

        Ok(announced)
    }

    fn generate_rows(&self, heightmap: &HeightMap, horizontal_scale: f64) -> MeshResult<Vec<Vec<u8>>> {
        let cells_y = heightmap.height() - 1;

        if !self.parallel {
            let mut percent_complete = 0;
            return Ok((0..cells_y)
                .map(|y| {
                    let percent = y * 100 / cells_y;
                    if percent != percent_complete {
                        percent_complete = percent;
                        log::debug!("Generating facets... {percent}% complete");
                    }
                    row_facets(heightmap, y, horizontal_scale)
                })
                .collect());
        }

        let compute = || {
            (0..cells_y)
                .into_par_iter()
                .map(|y| row_facets(heightmap, y, horizontal_scale))
                .collect::<Vec<_>>()
        };

        match self.num_threads {
            Some(num_threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|err| MeshError::config(format!("cannot build thread pool: {err}")))?;
                Ok(pool.install(compute))
            }
            None => Ok(compute()),
        }
    }
}

/// Shorthand for [`FacetWriter::write`].
pub fn write_stl<W: Write>(
    heightmap: &HeightMap,
    horizontal_scale: f64,
    writer: W,
    object_name: &str,
    parallel: bool,
) -> MeshResult<u32> {
    let facet_writer = FacetWriter {
        parallel,
        ..Default::default()
    };
    facet_writer.write(heightmap, horizontal_scale, object_name, writer)
}
