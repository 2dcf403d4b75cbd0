use types::neighbor_offsets;

use crate::raster::PixelBuffer;

/// Intensity the simulation applies each frame when bloom is on.
pub const BLOOM_INTENSITY: f32 = 0.3;
/// Per-neighbor attenuation applied on top of the intensity.
const NEIGHBOR_FALLOFF: f64 = 0.05;

/// Single-pass glow. Every lit interior pixel adds its 8 neighbors' colors,
/// scaled by `intensity * 0.05`, read from a pre-bloom snapshot. Channels
/// are summed in floating point and truncated once. The outer one-pixel
/// ring is not touched.
pub fn apply_bloom(buf: &mut PixelBuffer, intensity: f32) {
    let (w, h) = (buf.width(), buf.height());
    if w < 3 || h < 3 {
        return;
    }
    let snapshot = buf.clone();
    let k = intensity as f64 * NEIGHBOR_FALLOFF;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let center = snapshot.get(x, y);
            if center.is_black() {
                continue;
            }
            let mut acc = [center.r as f64, center.g as f64, center.b as f64];
            for o in neighbor_offsets() {
                let n = snapshot.get((x as i32 + o.x) as u32, (y as i32 + o.y) as u32);
                acc[0] += n.r as f64 * k;
                acc[1] += n.g as f64 * k;
                acc[2] += n.b as f64 * k;
            }
            // Truncate once, after the sum.
            let [r, g, b] = acc.map(|c| c.min(255.0) as u8);
            buf.set(x, y, crate::Rgba::new(r, g, b, center.a));
        }
    }
}
