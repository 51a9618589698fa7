// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Facet generation for a heightmap solid.
//!
//! A grid with `W x H` samples has `W-1 x H-1` cells. The solid is made of:
//! - A top quad per cell, following the terrain.
//! - A bottom quad per cell, at `z = 0`.
//! - North and south walls along `y = 0` and `y = H-1`.
//! - West and east walls along `x = 0` and `x = W-1`.
//!
//! Sample `(x, y)` with elevation `z` becomes the vertex `(x * s, y * s, z)`,
//! where `s` is the horizontal scale. Every quad is emitted as two facets
//! wound counter-clockwise when seen from outside the solid, so the normal
//! given by the right hand rule always points outwards. The stored normals are
//! fixed per side, they are not derived from the terrain slope.
//!
//! Rows are independent: [`row_facets`] only reads the grid, so rows can be
//! generated concurrently and concatenated in order afterwards.

use crate::prelude::*;

/// Size in bytes of a single binary STL facet record.
pub const FACET_SIZE: usize = 50;

/// Total number of facets for a grid of `width x height` samples.
pub fn facet_count(width: usize, height: usize) -> u64 {
    let cells_x = width.saturating_sub(1) as u64;
    let cells_y = height.saturating_sub(1) as u64;
    let top_bottom = 4 * cells_x * cells_y;
    let north_south = 4 * cells_x;
    let east_west = 4 * cells_y;
    top_bottom + north_south + east_west
}

/// Number of facets emitted by [`row_facets`] for row `y`.
pub fn facets_in_row(width: usize, height: usize, y: usize) -> usize {
    let cells_x = width - 1;
    let last_row = height - 2;
    let mut count = 4 + 4 * cells_x;
    if y == 0 {
        count += 2 * cells_x;
    }
    if y == last_row {
        count += 2 * cells_x;
    }
    count
}

/// Returns the serialized facets for the cells in row `y`, plus the walls
/// touching that row.
pub fn row_facets(heightmap: &HeightMap, y: usize, horizontal_scale: f64) -> Vec<u8> {
    let width = heightmap.width();
    let height = heightmap.height();
    let cells_x = width - 1;

    let row = RowBuilder {
        heightmap,
        scale: horizontal_scale,
        bytes: Vec::with_capacity(facets_in_row(width, height, y) * FACET_SIZE),
    };
    row.build(y, cells_x, height - 1)
}

struct RowBuilder<'a> {
    heightmap: &'a HeightMap,
    scale: f64,
    bytes: Vec<u8>,
}

impl<'a> RowBuilder<'a> {
    fn build(mut self, y: usize, cells_x: usize, cells_y: usize) -> Vec<u8> {
        // West wall, x = 0
        self.quad(
            Vec3::NEG_X,
            [
                self.bottom(0, y + 1),
                self.bottom(0, y),
                self.top(0, y),
                self.top(0, y + 1),
            ],
        );
        // East wall, x = W-1
        self.quad(
            Vec3::X,
            [
                self.bottom(cells_x, y),
                self.bottom(cells_x, y + 1),
                self.top(cells_x, y + 1),
                self.top(cells_x, y),
            ],
        );

        for x in 0..cells_x {
            if y == 0 {
                self.quad(
                    Vec3::NEG_Y,
                    [
                        self.bottom(x, 0),
                        self.bottom(x + 1, 0),
                        self.top(x + 1, 0),
                        self.top(x, 0),
                    ],
                );
            }
            // A single row of cells gets both walls.
            if y + 1 == cells_y {
                self.quad(
                    Vec3::Y,
                    [
                        self.bottom(x + 1, cells_y),
                        self.bottom(x, cells_y),
                        self.top(x, cells_y),
                        self.top(x + 1, cells_y),
                    ],
                );
            }
            self.quad(
                Vec3::NEG_Z,
                [
                    self.bottom(x, y),
                    self.bottom(x, y + 1),
                    self.bottom(x + 1, y + 1),
                    self.bottom(x + 1, y),
                ],
            );
            self.quad(
                Vec3::Z,
                [
                    self.top(x, y),
                    self.top(x + 1, y),
                    self.top(x + 1, y + 1),
                    self.top(x, y + 1),
                ],
            );
        }

        self.bytes
    }

    fn top(&self, x: usize, y: usize) -> Vec3 {
        let (px, py) = self.planar(x, y);
        Vec3::new(px, py, self.heightmap.get(x, y))
    }

    fn bottom(&self, x: usize, y: usize) -> Vec3 {
        let (px, py) = self.planar(x, y);
        Vec3::new(px, py, 0.0)
    }

    /// Horizontal position of sample `(x, y)`. Scaled in double precision,
    /// only the result is narrowed to the `f32` the format stores.
    fn planar(&self, x: usize, y: usize) -> (f32, f32) {
        (
            (x as f64 * self.scale) as f32,
            (y as f64 * self.scale) as f32,
        )
    }

    /// Emits the quad `[p0, p1, p2, p3]`, given in counter-clockwise order
    /// as seen from the side `normal` points to, as two facets sharing the
    /// `p0-p2` diagonal.
    fn quad(&mut self, normal: Vec3, [p0, p1, p2, p3]: [Vec3; 4]) {
        push_facet(&mut self.bytes, normal, [p0, p1, p2]);
        push_facet(&mut self.bytes, normal, [p2, p3, p0]);
    }
}

/// Appends one facet record: normal, three vertices and a zero attribute
/// byte count, all little endian.
pub fn push_facet(bytes: &mut Vec<u8>, normal: Vec3, vertices: [Vec3; 3]) {
    for v in std::iter::once(normal).chain(vertices) {
        for c in v.to_array() {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
    }
    bytes.extend_from_slice(&0u16.to_le_bytes());
}
