use serde::Serialize;
use types::{Grid, MAX_AGE};

pub const HISTOGRAM_BUCKETS: usize = MAX_AGE as usize;

/// Population metrics derived from one grid snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimStats {
    pub generation: u64,
    pub population: usize,
    pub density: f64,
    pub avg_age: f64,
    pub entropy: f64,
    /// Bucket `i` counts living cells of age `i + 1`; older ages land in the
    /// last bucket.
    #[serde(serialize_with = "serialize_histogram")]
    pub age_histogram: [u32; HISTOGRAM_BUCKETS],
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            generation: 0,
            population: 0,
            density: 0.0,
            avg_age: 0.0,
            entropy: 0.0,
            age_histogram: [0; HISTOGRAM_BUCKETS],
        }
    }
}

fn serialize_histogram<S: serde::Serializer>(
    histogram: &[u32; HISTOGRAM_BUCKETS],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(histogram.iter())
}

impl SimStats {
    pub fn from_grid(grid: &Grid, generation: u64) -> Self {
        let mut age_histogram = [0u32; HISTOGRAM_BUCKETS];
        let mut population = 0usize;
        let mut total_age = 0u64;

        for &age in grid.cells() {
            if age == 0 {
                continue;
            }
            population += 1;
            total_age += age as u64;
            let idx = (age as usize - 1).min(HISTOGRAM_BUCKETS - 1);
            age_histogram[idx] += 1;
        }

        let total = grid.cell_count().max(1) as f64;
        let density = population as f64 / total;
        let avg_age = if population > 0 {
            total_age as f64 / population as f64
        } else {
            0.0
        };

        SimStats {
            generation,
            population,
            density,
            avg_age,
            entropy: binary_entropy(density),
            age_histogram,
        }
    }
}

/// Shannon entropy of an occupied/empty split with occupancy `p`, in bits.
/// Exactly 0 at the endpoints.
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    -p * p.log2() - (1.0 - p) * (1.0 - p).log2()
}

pub fn compute_stats(grid: &Grid, generation: u64) -> SimStats {
    SimStats::from_grid(grid, generation)
}
