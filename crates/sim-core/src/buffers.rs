use types::Grid;

/// Ping-pong pair of same-shaped grids. One is read (the current
/// generation), the other is written, then `swap` flips the roles.
pub struct CellBuffers {
    grid_a: Grid,
    grid_b: Grid,
    current_read_is_a: bool,
}

impl CellBuffers {
    pub fn new(grid_size: u32) -> Self {
        Self {
            grid_a: Grid::new(grid_size),
            grid_b: Grid::new(grid_size),
            current_read_is_a: true,
        }
    }

    /// Wrap an existing grid as the current generation.
    pub fn from_grid(grid: Grid) -> Self {
        let grid_b = Grid::new(grid.size());
        Self {
            grid_a: grid,
            grid_b,
            current_read_is_a: true,
        }
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_a.size()
    }

    pub fn current(&self) -> &Grid {
        if self.current_read_is_a {
            &self.grid_a
        } else {
            &self.grid_b
        }
    }

    pub fn current_mut(&mut self) -> &mut Grid {
        if self.current_read_is_a {
            &mut self.grid_a
        } else {
            &mut self.grid_b
        }
    }

    /// Borrow the read grid and the write grid at once.
    pub fn split(&mut self) -> (&Grid, &mut Grid) {
        if self.current_read_is_a {
            (&self.grid_a, &mut self.grid_b)
        } else {
            (&self.grid_b, &mut self.grid_a)
        }
    }

    pub fn swap(&mut self) {
        self.current_read_is_a = !self.current_read_is_a;
    }

    pub fn current_read_is_a(&self) -> bool {
        self.current_read_is_a
    }

    /// Replace both stores with empty grids of a new size.
    pub fn resize(&mut self, grid_size: u32) {
        self.grid_a = Grid::new(grid_size);
        self.grid_b = Grid::new(grid_size);
        self.current_read_is_a = true;
    }
}
