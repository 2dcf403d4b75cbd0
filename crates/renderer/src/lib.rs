pub mod palette;
pub mod raster;
pub mod bloom;

pub use palette::{generate_palette, Palette};
pub use raster::{rasterize, PixelBuffer, Rgba};
pub use bloom::{apply_bloom, BLOOM_INTENSITY};

use types::Grid;

/// Turns a grid and palette into a finished frame.
pub struct Renderer {
    cell_size: u32,
    bloom: bool,
}

impl Renderer {
    pub fn new(cell_size: u32, bloom: bool) -> Self {
        Self { cell_size, bloom }
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn set_cell_size(&mut self, cell_size: u32) {
        self.cell_size = cell_size;
    }

    pub fn bloom(&self) -> bool {
        self.bloom
    }

    pub fn set_bloom(&mut self, bloom: bool) {
        self.bloom = bloom;
    }

    pub fn render_frame(&self, grid: &Grid, palette: &Palette) -> PixelBuffer {
        // Rasterize pass
        let mut buf = rasterize(grid, palette, self.cell_size);

        // Bloom pass (over raster output)
        if self.bloom {
            apply_bloom(&mut buf, BLOOM_INTENSITY);
        }
        buf
    }
}
