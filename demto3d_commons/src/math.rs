// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use float_ord::FloatOrd;

/// Returns the `(min, max)` of a sequence of floats, or `None` when the
/// sequence is empty. NaNs sort above every other value under [`FloatOrd`],
/// so callers should reject them beforehand.
pub fn min_max(values: impl IntoIterator<Item = f32>) -> Option<(f32, f32)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((
            FloatOrd(lo).min(FloatOrd(v)).0,
            FloatOrd(hi).max(FloatOrd(v)).0,
        )),
    })
}
