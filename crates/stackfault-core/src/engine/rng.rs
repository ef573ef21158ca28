use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws one seed per job from the caller's generator, in job order.
///
/// Jobs seeded this way can run on any number of threads and still produce
/// the same output for a given master seed.
pub fn job_seeds(rng: &mut impl Rng, count: usize) -> Vec<u64> {
    (0..count).map(|_| rng.r#gen::<u64>()).collect()
}

/// An independent generator for one job.
pub fn job_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
