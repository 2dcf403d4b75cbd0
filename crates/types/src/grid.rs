use glam::IVec2;

/// Oldest age a cell can reach before rejuvenating back to 1.
pub const MAX_AGE: u8 = 50;

/// Convert 2D coordinates to linear buffer index.
/// Formula: y * grid_size + x
#[inline]
pub fn grid_index(x: u32, y: u32, grid_size: u32) -> usize {
    (y * grid_size + x) as usize
}

/// Convert linear buffer index back to 2D coordinates.
#[inline]
pub fn grid_coords(index: usize, grid_size: u32) -> (u32, u32) {
    let index = index as u32;
    (index % grid_size, index / grid_size)
}

/// Moore neighborhood: the 8 rectangularly adjacent offsets.
#[inline]
pub fn neighbor_offsets() -> [IVec2; 8] {
    [
        IVec2::new(-1, -1),
        IVec2::new( 0, -1),
        IVec2::new( 1, -1),
        IVec2::new(-1,  0),
        IVec2::new( 1,  0),
        IVec2::new(-1,  1),
        IVec2::new( 0,  1),
        IVec2::new( 1,  1),
    ]
}

/// Square grid of cell ages, row-major.
///
/// Age 0 is a dead cell, 1..=MAX_AGE a living one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: u32,
    cells: Vec<u8>,
}

impl Grid {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            cells: vec![0; (size as usize) * (size as usize)],
        }
    }

    /// Build a grid from row-major ages.
    ///
    /// Panics if `cells.len() != size * size`.
    pub fn from_cells(size: u32, cells: Vec<u8>) -> Self {
        assert_eq!(
            cells.len(),
            (size as usize) * (size as usize),
            "cell count does not match a {size}x{size} grid"
        );
        Self { size, cells }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.cells[grid_index(x, y, self.size)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, age: u8) {
        debug_assert!(age <= MAX_AGE, "age {age} exceeds {MAX_AGE}");
        let idx = grid_index(x, y, self.size);
        self.cells[idx] = age;
    }

    /// Age at a signed position, or `None` outside the grid (no wraparound).
    #[inline]
    pub fn get_signed(&self, pos: IVec2) -> Option<u8> {
        let size = self.size as i32;
        if pos.x < 0 || pos.y < 0 || pos.x >= size || pos.y >= size {
            return None;
        }
        Some(self.get(pos.x as u32, pos.y as u32))
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&age| age > 0).count()
    }
}
