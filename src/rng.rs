//! explicit RNG construction. Nothing in the crate owns a global generator;
//! every randomized operation takes `&mut impl Rng` and the model derives
//! one generator per worker so a fixed seed and worker count reproduce a
//! step exactly.

use rand_pcg::Pcg32;

/// multiplier from splitmix64, used to spread seed material across state bits
const MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// generator for single-threaded use (tests, shape construction outside a model)
pub fn seeded(seed: u64) -> Pcg32 {
    Pcg32::new(seed.wrapping_mul(MIX), 0xA02B_DBF7_BB3C_0A7)
}

/// generator for one worker of one step. PCG streams keep the per-worker
/// sequences statistically independent even though they share seed material;
/// folding the generation counter into the state gives every step fresh
/// draws without the model mutating any shared RNG.
pub fn worker(seed: u64, generation: u64, worker: u64) -> Pcg32 {
    let state = seed
        .wrapping_add(generation.wrapping_mul(MIX))
        .wrapping_mul(MIX);
    Pcg32::new(state, worker)
}
