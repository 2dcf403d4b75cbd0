use std::f64::consts::PI;

use glam::DVec3;
use rand::Rng;
use types::PaletteMode;

use crate::raster::Rgba;

pub const YOUNG_LEN: usize = 5;
pub const MATURE_LEN: usize = 15;
pub const OLD_LEN: usize = 30;

const YOUNG_JITTER: i32 = 30;
const MATURE_JITTER: i32 = 25;
const OLD_JITTER: i32 = 20;

/// Color ramps for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub dead: Rgba,
    pub young: [Rgba; YOUNG_LEN],
    pub mature: [Rgba; MATURE_LEN],
    pub old: [Rgba; OLD_LEN],
    /// Phase the ramps were generated at.
    pub cycle: f64,
}

impl Palette {
    pub fn color_for_age(&self, age: u8) -> Rgba {
        match age {
            0 => self.dead,
            1..=4 => self.young[age as usize - 1],
            5..=19 => self.mature[age as usize - 5],
            _ => self.old[(age as usize - 20).min(OLD_LEN - 1)],
        }
    }

    /// Representative swatches for a color legend.
    pub fn legend(&self) -> [(&'static str, Rgba); 4] {
        [
            ("Dead (0)", self.dead),
            ("Young (1-4)", self.young[2]),
            ("Mature (5-19)", self.mature[7]),
            ("Old (20-49)", self.old[15]),
        ]
    }

    /// Distinct, jitter-free ramps for lookup tests.
    #[cfg(test)]
    pub(crate) fn test_palette() -> Self {
        let mut p = Palette {
            dead: Rgba::BLACK,
            young: [Rgba::BLACK; YOUNG_LEN],
            mature: [Rgba::BLACK; MATURE_LEN],
            old: [Rgba::BLACK; OLD_LEN],
            cycle: 0.0,
        };
        for (i, c) in p.young.iter_mut().enumerate() {
            *c = Rgba::opaque(100, i as u8, 0);
        }
        for (i, c) in p.mature.iter_mut().enumerate() {
            *c = Rgba::opaque(150, i as u8, 0);
        }
        for (i, c) in p.old.iter_mut().enumerate() {
            *c = Rgba::opaque(200, i as u8, 0);
        }
        p
    }
}

/// Young, mature and old base colors for a mode at phase `c`, each channel
/// saturated to [0, 255] and truncated.
pub fn base_colors(mode: PaletteMode, c: f64) -> [DVec3; 3] {
    let [young, mature, old] = match mode {
        PaletteMode::Rainbow => [
            DVec3::new(
                127.0 + 127.0 * c.sin(),
                127.0 + 127.0 * (c + 2.0 * PI / 3.0).sin(),
                127.0 + 127.0 * (c + 4.0 * PI / 3.0).sin(),
            ),
            DVec3::new(
                200.0 + 55.0 * c.cos(),
                150.0 + 105.0 * c.sin(),
                100.0 + 155.0 * (c + PI / 2.0).cos(),
            ),
            DVec3::new(
                255.0 - 55.0 * c.sin(),
                100.0 + 100.0 * c.cos(),
                150.0 + 105.0 * (c + PI).sin(),
            ),
        ],
        PaletteMode::Ocean => [
            DVec3::new(0.0, 150.0 + 50.0 * c.sin(), 200.0 + 55.0 * c.cos()),
            DVec3::new(0.0, 180.0 + 75.0 * c.sin(), 150.0 + 50.0 * c.cos()),
            DVec3::new(50.0 + 50.0 * c.sin(), 100.0 + 100.0 * c.cos(), 200.0),
        ],
        PaletteMode::Fire => [
            DVec3::new(200.0 + 55.0 * c.sin(), 100.0 + 50.0 * c.cos(), 0.0),
            DVec3::new(255.0 - 55.0 * c.cos(), 150.0 + 50.0 * c.sin(), 0.0),
            DVec3::new(255.0, 50.0 + 100.0 * c.sin(), 50.0 + 100.0 * c.cos()),
        ],
        PaletteMode::Original => [
            DVec3::new(0.0, 200.0, 0.0),
            DVec3::new(200.0, 200.0, 0.0),
            DVec3::new(255.0, 0.0, 0.0),
        ],
    };
    [young, mature, old].map(|v| v.clamp(DVec3::ZERO, DVec3::splat(255.0)).floor())
}

/// Add independent per-channel noise in `[-variance, variance)`.
fn jitter<R: Rng + ?Sized>(rng: &mut R, rgb: DVec3, variance: i32) -> Rgba {
    let mut channel = |v: f64| -> u8 {
        let base = v.floor() as i32;
        (base + rng.gen_range(-variance..variance)).clamp(0, 255) as u8
    };
    let r = channel(rgb.x);
    let g = channel(rgb.y);
    let b = channel(rgb.z);
    Rgba::opaque(r, g, b)
}

/// Build a full palette at `cycle_phase`. Every ramp entry draws three
/// jitter values from `rng`.
pub fn generate_palette<R: Rng + ?Sized>(rng: &mut R, cycle_phase: f64, mode: PaletteMode) -> Palette {
    let [young_base, mature_base, old_base] = base_colors(mode, cycle_phase);

    let mut young = [Rgba::BLACK; YOUNG_LEN];
    for (i, slot) in young.iter_mut().enumerate() {
        let intensity = 0.5 + i as f64 * 0.1;
        *slot = jitter(rng, young_base * intensity, YOUNG_JITTER);
    }

    let mut mature = [Rgba::BLACK; MATURE_LEN];
    for (i, slot) in mature.iter_mut().enumerate() {
        let f = i as f64 / MATURE_LEN as f64;
        let scale = DVec3::new(0.7 + f * 0.3, 1.0 - f * 0.5, 0.5 + f * 0.5);
        *slot = jitter(rng, mature_base * scale, MATURE_JITTER);
    }

    let mut old = [Rgba::BLACK; OLD_LEN];
    for (i, slot) in old.iter_mut().enumerate() {
        let factor = 1.0 - i as f64 / OLD_LEN as f64 * 0.6;
        *slot = jitter(rng, old_base * factor, OLD_JITTER);
    }

    Palette {
        dead: Rgba::BLACK,
        young,
        mature,
        old,
        cycle: cycle_phase,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn within(actual: u8, expected: i32, variance: i32) -> bool {
        let lo = (expected - variance).max(0);
        let hi = (expected + variance - 1).min(255);
        (lo..=hi).contains(&(actual as i32))
    }

    #[test]
    fn age_lookup_follows_bands() {
        let p = Palette::test_palette();
        assert_eq!(p.color_for_age(0), p.dead);
        assert_eq!(p.color_for_age(1), p.young[0]);
        assert_eq!(p.color_for_age(4), p.young[3]);
        assert_eq!(p.color_for_age(5), p.mature[0]);
        assert_eq!(p.color_for_age(19), p.mature[14]);
        assert_eq!(p.color_for_age(20), p.old[0]);
        assert_eq!(p.color_for_age(49), p.old[29]);
        assert_eq!(p.color_for_age(50), p.old[29]);
        assert_eq!(p.color_for_age(u8::MAX), p.old[29]);
    }

    #[test]
    fn original_ramps_stay_near_scaled_base() {
        let mut rng = SmallRng::seed_from_u64(30);
        let p = generate_palette(&mut rng, 0.0, PaletteMode::Original);
        assert_eq!(p.dead, Rgba::BLACK);
        // young[0]: (0, 200, 0) * 0.5
        assert!(within(p.young[0].r, 0, YOUNG_JITTER));
        assert!(within(p.young[0].g, 100, YOUNG_JITTER));
        // young[4]: (0, 200, 0) * 0.9
        assert!(within(p.young[4].g, 180, YOUNG_JITTER));
        // mature[0]: (200*0.7, 200*1.0, 0)
        assert!(within(p.mature[0].r, 140, MATURE_JITTER));
        assert!(within(p.mature[0].g, 200, MATURE_JITTER));
        // old[0] full red, old[29] darkened to 1 - 0.58 = 0.42
        assert!(within(p.old[0].r, 255, OLD_JITTER));
        assert!(within(p.old[29].r, 107, OLD_JITTER));
        for c in p.young.iter().chain(&p.mature).chain(&p.old) {
            assert_eq!(c.a, 255);
        }
    }

    #[test]
    fn generation_consumes_randomness() {
        let mut rng = SmallRng::seed_from_u64(31);
        let a = generate_palette(&mut rng, 1.0, PaletteMode::Fire);
        let b = generate_palette(&mut rng, 1.0, PaletteMode::Fire);
        assert_ne!(a, b, "repeated calls should advance the rng");

        let mut r1 = SmallRng::seed_from_u64(32);
        let mut r2 = SmallRng::seed_from_u64(32);
        assert_eq!(
            generate_palette(&mut r1, 2.5, PaletteMode::Ocean),
            generate_palette(&mut r2, 2.5, PaletteMode::Ocean)
        );
    }

    #[test]
    fn original_base_ignores_phase() {
        assert_eq!(
            base_colors(PaletteMode::Original, 0.0),
            base_colors(PaletteMode::Original, 3.0)
        );
    }

    #[test]
    fn rainbow_base_cycles_with_phase() {
        let [young0, ..] = base_colors(PaletteMode::Rainbow, 0.0);
        let [young1, ..] = base_colors(PaletteMode::Rainbow, PI / 2.0);
        assert_eq!(young0.x, 127.0);
        assert_eq!(young1.x, 254.0);
    }

    #[test]
    fn base_channels_are_saturated() {
        for mode in PaletteMode::ALL {
            for step in 0..64 {
                for base in base_colors(mode, step as f64 * 0.1) {
                    assert!(base.min_element() >= 0.0 && base.max_element() <= 255.0);
                }
            }
        }
    }

    #[test]
    fn legend_samples_mid_ramp() {
        let p = Palette::test_palette();
        let legend = p.legend();
        assert_eq!(legend[1].1, p.young[2]);
        assert_eq!(legend[3], ("Old (20-49)", p.old[15]));
    }
}
