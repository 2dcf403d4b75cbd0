pub mod buffers;
pub mod tick;
pub mod stats;
pub mod events;
pub mod perturb;

pub use stats::{compute_stats, SimStats};
pub use events::{Event, EventKind, EventLog};
pub use perturb::Supernova;
pub use tick::evolve;

use buffers::CellBuffers;
use rand::Rng;
use types::Grid;

/// Owns the double-buffered grid and the generation counter.
pub struct SimEngine {
    buffers: CellBuffers,
    generation: u64,
}

impl SimEngine {
    pub fn new(grid_size: u32) -> Self {
        Self {
            buffers: CellBuffers::new(grid_size),
            generation: 0,
        }
    }

    pub fn from_grid(grid: Grid) -> Self {
        Self {
            buffers: CellBuffers::from_grid(grid),
            generation: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        self.buffers.current()
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        self.buffers.current_mut()
    }

    pub fn grid_size(&self) -> u32 {
        self.buffers.grid_size()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn reset_generation(&mut self) {
        self.generation = 0;
    }

    pub fn buffers_read_is_a(&self) -> bool {
        self.buffers.current_read_is_a()
    }

    /// Drop all cells and reallocate at a new size.
    pub fn resize(&mut self, grid_size: u32) {
        self.buffers.resize(grid_size);
    }

    pub fn seed<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        self.generation = 0;
        perturb::seed_population(self.buffers.current_mut(), rng)
    }

    pub fn supernova<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Supernova {
        perturb::supernova(self.buffers.current_mut(), rng)
    }

    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        perturb::mutate(self.buffers.current_mut(), rng)
    }

    pub fn stats(&self) -> SimStats {
        compute_stats(self.grid(), self.generation)
    }
}
