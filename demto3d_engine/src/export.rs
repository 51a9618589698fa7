// Copyright (C) 2022 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io::{BufWriter, Write};
use std::path::Path;

use crate::mesh::assembly::assemble;
use crate::mesh::stl::FacetWriter;
use crate::prelude::*;

/// Lays out `heightmaps` according to `params` and writes the resulting
/// solid to `writer` as binary STL. Returns the number of facets written.
///
/// Configuration errors are reported before anything is written.
pub fn generate<W: Write>(
    heightmaps: &[HeightMap],
    params: &ShapingParameters,
    writer: W,
    facet_writer: &FacetWriter,
) -> MeshResult<u32> {
    let Assembly {
        heightmap,
        horizontal_scale,
    } = assemble(heightmaps, params)?;
    facet_writer.write(&heightmap, horizontal_scale, &params.object_name, writer)
}

/// Same as [`generate`], but writes to a file. The mesh is written to a
/// temporary file next to `path` and only moved into place once complete, so
/// a file at `path` is always a full mesh.
pub fn generate_to_path(
    heightmaps: &[HeightMap],
    params: &ShapingParameters,
    path: impl AsRef<Path>,
    facet_writer: &FacetWriter,
) -> MeshResult<u32> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    params.validate()?;

    // Removed on drop if anything below fails.
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    let count = generate(
        heightmaps,
        params,
        BufWriter::new(file.as_file_mut()),
        facet_writer,
    )?;
    file.persist(path).map_err(|err| MeshError::Io(err.error))?;

    log::info!("File saved as: {}", path.display());
    Ok(count)
}
