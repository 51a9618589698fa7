// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ndarray::{Array2, ArrayView2};
use noise::NoiseFn;

use crate::prelude::*;

/// A dense grid of elevation samples. The array is indexed as `[[y, x]]`, so
/// its shape is `(height, width)` and rows run along the x axis.
///
/// A heightmap always has at least two rows and two columns, and every sample
/// is finite. Any no-data sentinel must have been filled in by whoever
/// produced the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
    inner: Array2<f32>,
}

impl HeightMap {
    pub fn new(inner: Array2<f32>) -> MeshResult<HeightMap> {
        let (height, width) = inner.dim();
        if height < 2 || width < 2 {
            crate::bail_config!(
                "heightmaps need at least 2 rows and 2 columns, got {height}x{width}"
            );
        }
        if let Some(((y, x), v)) = inner.indexed_iter().find(|(_, v)| !v.is_finite()) {
            crate::bail_config!("heightmap sample at (x={x}, y={y}) is not finite: {v}");
        }
        Ok(Self { inner })
    }

    /// Builds a heightmap from a list of rows. All rows must have the same
    /// length.
    pub fn from_rows(rows: &[Vec<f32>]) -> MeshResult<HeightMap> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(y) = rows.iter().position(|r| r.len() != width) {
            crate::bail_config!(
                "heightmap rows must all have the same length: row {y} has {} samples, expected {width}",
                rows[y].len()
            );
        }
        let flat = rows.iter().flatten().copied().collect_vec();
        let inner = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|err| MeshError::config(format!("invalid heightmap shape: {err}")))?;
        Self::new(inner)
    }

    pub fn from_perlin(
        width: usize,
        height: usize,
        frequency: f32,
        offset: Vec2,
        amplitude: f32,
    ) -> MeshResult<HeightMap> {
        let perlin = noise::Perlin::new();
        let inner = Array2::from_shape_fn((height, width), |(y, x)| {
            let point = Vec2::new(x as f32 / frequency, y as f32 / frequency) + offset;
            perlin.get([point.x as f64, point.y as f64]) as f32 * amplitude
        });
        Self::new(inner)
    }

    /// Number of samples along the x axis.
    pub fn width(&self) -> usize {
        self.inner.ncols()
    }

    /// Number of samples along the y axis.
    pub fn height(&self) -> usize {
        self.inner.nrows()
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.inner[[y, x]]
    }

    pub fn min_max(&self) -> (f32, f32) {
        // Never empty: `new` rejects grids smaller than 2x2.
        min_max(self.inner.iter().copied()).unwrap_or((0.0, 0.0))
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.inner.view()
    }

    pub fn into_inner(self) -> Array2<f32> {
        self.inner
    }

    /// Moves the lowest sample `h_min` to zero, scales by `vscale` and then
    /// lifts the result by `base`. The order of the three steps is fixed.
    pub fn normalized(&self, h_min: f64, vscale: f64, base: f64) -> HeightMap {
        let inner = self
            .inner
            .mapv(|v| ((f64::from(v) - h_min) * vscale + base) as f32);
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rejects_degenerate_grids() {
        assert!(HeightMap::new(array![[1.0, 2.0, 3.0]]).is_err());
        assert!(HeightMap::new(array![[1.0], [2.0]]).is_err());
        assert!(HeightMap::from_rows(&[]).is_err());
        assert!(HeightMap::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
        let err = HeightMap::new(array![[1.0, f32::NAN], [0.0, 0.0]]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn indexing_and_extremes() {
        let hm = HeightMap::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, -5.0, 6.0]]).unwrap();
        assert_eq!(hm.width(), 3);
        assert_eq!(hm.height(), 2);
        assert_eq!(hm.get(2, 0), 3.0);
        assert_eq!(hm.get(1, 1), -5.0);
        assert_eq!(hm.min_max(), (-5.0, 6.0));
    }

    #[test]
    fn normalization_order() {
        let hm = HeightMap::from_rows(&[vec![10.0, 12.0], vec![14.0, 16.0]]).unwrap();
        let n = hm.normalized(10.0, 0.5, 3.0);
        assert_eq!(n.get(0, 0), 3.0);
        assert_eq!(n.get(1, 0), 4.0);
        assert_eq!(n.get(1, 1), 6.0);
    }

    #[test]
    fn perlin_shape() {
        let hm = HeightMap::from_perlin(7, 5, 3.0, Vec2::ZERO, 10.0).unwrap();
        assert_eq!((hm.width(), hm.height()), (7, 5));
        let (lo, hi) = hm.min_max();
        assert!(lo >= -10.0 * 1.5 && hi <= 10.0 * 1.5);
    }
}
