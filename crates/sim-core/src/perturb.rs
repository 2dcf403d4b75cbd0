use glam::UVec2;
use rand::seq::index;
use rand::Rng;
use tracing::debug;
use types::{grid_coords, Grid};

/// Live cells placed on start: `[200, 600)`.
pub const SEED_COUNT_RANGE: std::ops::Range<usize> = 200..600;
pub const SEED_AGE_RANGE: std::ops::RangeInclusive<u8> = 1..=10;
pub const SUPERNOVA_RADIUS_RANGE: std::ops::Range<u32> = 10..25;
pub const MUTATION_SITES_RANGE: std::ops::RangeInclusive<usize> = 5..=14;
pub const MUTATION_AGE_RANGE: std::ops::RangeInclusive<u8> = 1..=20;

/// Where a supernova hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Supernova {
    pub center: UVec2,
    pub radius: u32,
}

impl Supernova {
    /// True if `(x, y)` is strictly inside the blast circle.
    pub fn covers(&self, x: u32, y: u32) -> bool {
        let dx = x as i64 - self.center.x as i64;
        let dy = y as i64 - self.center.y as i64;
        let r = self.radius as i64;
        dx * dx + dy * dy < r * r
    }

    /// Clear every covered cell. Returns how many living cells were lost.
    pub fn apply(&self, grid: &mut Grid) -> usize {
        let gs = grid.size();
        let mut cleared = 0;
        for y in 0..gs {
            for x in 0..gs {
                if self.covers(x, y) {
                    if grid.get(x, y) > 0 {
                        cleared += 1;
                    }
                    grid.set(x, y, 0);
                }
            }
        }
        cleared
    }
}

/// Clear the grid and scatter a random number of young cells over distinct
/// positions. Returns the number placed.
pub fn seed_population<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> usize {
    grid.clear();
    let requested = rng.gen_range(SEED_COUNT_RANGE);
    let count = requested.min(grid.cell_count());
    let gs = grid.size();
    for idx in index::sample(rng, grid.cell_count(), count).iter() {
        let (x, y) = grid_coords(idx, gs);
        let age = rng.gen_range(SEED_AGE_RANGE);
        grid.set(x, y, age);
    }
    debug!(count, grid_size = gs, "seeded population");
    count
}

/// Pick a random blast and clear it from the grid.
pub fn supernova<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> Supernova {
    let gs = grid.size();
    let center = UVec2::new(rng.gen_range(0..gs), rng.gen_range(0..gs));
    let radius = rng.gen_range(SUPERNOVA_RADIUS_RANGE);
    let blast = Supernova { center, radius };
    let cleared = blast.apply(grid);
    debug!(x = center.x, y = center.y, radius, cleared, "supernova");
    blast
}

/// Reassign the age of living cells at 5-14 random sites. Dead sites are
/// picked but left alone. Returns how many sites were alive.
pub fn mutate<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> usize {
    let gs = grid.size();
    let sites = rng.gen_range(MUTATION_SITES_RANGE);
    let mut mutated = 0;
    for _ in 0..sites {
        let x = rng.gen_range(0..gs);
        let y = rng.gen_range(0..gs);
        if grid.get(x, y) > 0 {
            grid.set(x, y, rng.gen_range(MUTATION_AGE_RANGE));
            mutated += 1;
        }
    }
    debug!(sites, mutated, "mutation");
    mutated
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn seeding_places_200_to_599_cells() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut g = Grid::new(60);
        for _ in 0..50 {
            let n = seed_population(&mut g, &mut rng);
            assert_eq!(g.population(), n);
            assert!(SEED_COUNT_RANGE.contains(&n), "placed {n}");
            assert!(g.cells().iter().all(|&a| a <= 10));
        }
    }

    #[test]
    fn seeding_clears_previous_cells() {
        let mut rng = SmallRng::seed_from_u64(12);
        let mut g = Grid::from_cells(40, vec![30; 1600]);
        seed_population(&mut g, &mut rng);
        assert!(g.cells().iter().all(|&a| a <= 10));
    }

    #[test]
    fn seeding_small_grid_is_capped() {
        let mut rng = SmallRng::seed_from_u64(13);
        let mut g = Grid::new(10);
        assert_eq!(seed_population(&mut g, &mut rng), 100);
    }

    #[test]
    fn supernova_clears_exactly_the_open_disc() {
        let mut g = Grid::from_cells(60, vec![7; 3600]);
        let blast = Supernova { center: UVec2::new(5, 30), radius: 10 };
        blast.apply(&mut g);
        for y in 0..60 {
            for x in 0..60 {
                let dx = x as i64 - 5;
                let dy = y as i64 - 30;
                let expected = if dx * dx + dy * dy < 100 { 0 } else { 7 };
                assert_eq!(g.get(x, y), expected, "cell ({x},{y})");
            }
        }
        // Radius boundary is exclusive.
        assert_eq!(g.get(15, 30), 7);
        assert_eq!(g.get(14, 30), 0);
    }

    #[test]
    fn random_supernova_respects_ranges() {
        let mut rng = SmallRng::seed_from_u64(14);
        let mut g = Grid::from_cells(60, vec![1; 3600]);
        for _ in 0..20 {
            let blast = supernova(&mut g, &mut rng);
            assert!(SUPERNOVA_RADIUS_RANGE.contains(&blast.radius));
            assert!(blast.center.x < 60 && blast.center.y < 60);
            assert_eq!(g.get(blast.center.x, blast.center.y), 0);
        }
    }

    #[test]
    fn mutation_leaves_dead_cells_dead() {
        let mut rng = SmallRng::seed_from_u64(15);
        let mut g = Grid::new(20);
        assert_eq!(mutate(&mut g, &mut rng), 0);
        assert_eq!(g.population(), 0);
    }

    #[test]
    fn mutation_ages_fall_in_range() {
        let mut rng = SmallRng::seed_from_u64(16);
        let mut g = Grid::from_cells(3, vec![45; 9]);
        let mutated = mutate(&mut g, &mut rng);
        assert!(mutated >= 5);
        assert_eq!(g.population(), 9);
        let changed = g.cells().iter().filter(|&&a| a != 45).count();
        assert!(changed > 0);
        assert!(g.cells().iter().all(|&a| a == 45 || (1..=20).contains(&a)));
    }
}
