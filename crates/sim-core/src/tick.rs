use rand::Rng;
use types::{neighbor_offsets, Grid, MAX_AGE};

use crate::SimEngine;

/// Neighbor sums below this kill a living cell.
pub const ISOLATION_THRESHOLD: u32 = 3;
/// Neighbor sums above this age a living cell by one.
pub const CROWDING_THRESHOLD: u32 = 20;

/// Sum of the ages of the up-to-8 Moore neighbors. Cells off the edge
/// contribute nothing.
#[inline]
pub fn neighbor_sum(grid: &Grid, x: u32, y: u32) -> u32 {
    let pos = glam::IVec2::new(x as i32, y as i32);
    neighbor_offsets()
        .iter()
        .filter_map(|&o| grid.get_signed(pos + o))
        .map(u32::from)
        .sum()
}

/// Next age of one cell given its neighbor sum. Draws from `rng` only when
/// the cell is dead.
#[inline]
pub fn next_age<R: Rng + ?Sized>(age: u8, sum: u32, rng: &mut R, growth_rate: f64) -> u8 {
    if age == 0 {
        // Birth probability is not capped; anything >= 1 is a certain birth.
        let p = growth_rate * (sum as f64 / MAX_AGE as f64);
        return if rng.gen::<f64>() < p { 1 } else { 0 };
    }
    if sum < ISOLATION_THRESHOLD {
        0
    } else if sum > CROWDING_THRESHOLD {
        if age >= MAX_AGE { 1 } else { age + 1 }
    } else {
        age
    }
}

/// Compute the next generation of `src` into `dst`. Every cell is evaluated
/// against `src` only.
pub fn evolve_into<R: Rng + ?Sized>(src: &Grid, dst: &mut Grid, rng: &mut R, growth_rate: f64) {
    debug_assert_eq!(src.size(), dst.size());
    let gs = src.size();
    for y in 0..gs {
        for x in 0..gs {
            let sum = neighbor_sum(src, x, y);
            dst.set(x, y, next_age(src.get(x, y), sum, rng, growth_rate));
        }
    }
}

/// Allocating form of [`evolve_into`].
pub fn evolve<R: Rng + ?Sized>(grid: &Grid, rng: &mut R, growth_rate: f64) -> Grid {
    let mut next = Grid::new(grid.size());
    evolve_into(grid, &mut next, rng, growth_rate);
    next
}

impl SimEngine {
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R, growth_rate: f64) {
        // 1. Write next generation into the inactive buffer
        let (read, write) = self.buffers.split();
        evolve_into(read, write, rng, growth_rate);

        // 2. Swap buffers + increment generation
        self.buffers.swap();
        self.generation += 1;
    }
}
