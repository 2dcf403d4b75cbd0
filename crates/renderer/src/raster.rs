use bytemuck::{Pod, Zeroable};
use types::Grid;

use crate::palette::Palette;

/// One RGBA8 pixel, laid out exactly as an `Rgba8Unorm` texel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Alpha is ignored.
    pub fn is_black(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

/// Row-major RGBA pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::BLACK)
    }

    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        self.pixels[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Rgba) {
        let idx = self.index(x, y);
        self.pixels[idx] = color;
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// Raw RGBA8 bytes, ready for upload to a texture.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Paint every cell as a `cell_size`² block of its palette color.
pub fn rasterize(grid: &Grid, palette: &Palette, cell_size: u32) -> PixelBuffer {
    let side = grid.size() * cell_size;
    let mut buf = PixelBuffer::new(side, side);
    for y in 0..grid.size() {
        for x in 0..grid.size() {
            let color = palette.color_for_age(grid.get(x, y));
            for dy in 0..cell_size {
                let row = (y * cell_size + dy) * side;
                let start = (row + x * cell_size) as usize;
                buf.pixels[start..start + cell_size as usize].fill(color);
            }
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_is_four_bytes() {
        assert_eq!(std::mem::size_of::<Rgba>(), 4);
    }

    #[test]
    fn as_bytes_is_rgba_order() {
        let mut buf = PixelBuffer::new(2, 1);
        buf.set(1, 0, Rgba::new(1, 2, 3, 4));
        assert_eq!(buf.as_bytes(), &[0, 0, 0, 255, 1, 2, 3, 4]);
    }

    #[test]
    fn cells_fill_their_blocks() {
        let palette = Palette::test_palette();
        let grid = Grid::from_cells(2, vec![0, 1, 5, 20]);
        let buf = rasterize(&grid, &palette, 3);
        assert_eq!((buf.width(), buf.height()), (6, 6));
        for y in 0..6 {
            for x in 0..6 {
                let age = grid.get(x / 3, y / 3);
                assert_eq!(buf.get(x, y), palette.color_for_age(age), "pixel ({x},{y})");
            }
        }
    }

    #[test]
    fn display_is_filled_for_valid_cell_sizes() {
        let palette = Palette::test_palette();
        for cell_size in [2u32, 3, 4, 5, 6] {
            let grid = Grid::new(types::DISPLAY_SIZE / cell_size);
            let buf = rasterize(&grid, &palette, cell_size);
            assert_eq!(buf.width(), types::DISPLAY_SIZE);
        }
    }
}
