// Copyright (C) 2022 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

/// Some useful re-exports.
mod prelude;

/// Job files: which tiles to build and how to shape them.
mod job;

use crate::prelude::*;

fn main() -> Result<()> {
    // Setup logging
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let (job_path, output_path) = match (args.next(), args.next()) {
        (Some(job), Some(output)) => (PathBuf::from(job), PathBuf::from(output)),
        _ => bail!("Usage: demto3d <job.ron> <output.stl>"),
    };

    let job = job::load(&job_path)?;
    let count = job.run(&output_path)?;
    log::info!("Wrote {count} facets to {}", output_path.display());
    Ok(())
}
