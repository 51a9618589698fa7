// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// A heightmap data structure. Dense rectangular grid of elevation samples.
pub mod heightmap;

/// Normalization and multi-panel layout of one or more heightmaps.
pub mod assembly;

/// Per-row generation of the facets that close a heightmap into a solid.
pub mod facets;

/// Binary STL serialization.
pub mod stl;
