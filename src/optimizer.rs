// randomized local search over candidate shapes.
//
// a candidate's energy is the hypothetical full-image score if it were
// applied at its optimal color. Candidates are scored against a scratch
// buffer: covered pixels are snapshotted from the shared canvas, the blend
// happens in the buffer, and the incremental scorer compares the two. The
// live canvas is never written during search.

use rand::Rng;

use crate::bitmap::Bitmap;
use crate::fitness::{compute_color, difference_partial};
use crate::render::{copy_lines, draw_lines};
use crate::shape::{Bounds, Shape, ShapeType};

/// a candidate paired with its energy. `score` is what the canvas score
/// would become if `shape` were applied at alpha `alpha`.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub shape: Shape,
    pub score: f64,
    pub alpha: u8,
}

/// hypothetical score of the canvas with `shape` applied at its solved
/// color. `buffer` is scratch memory the same size as `current`; only the
/// covered pixels are written. A shape that rasterizes to nothing scores
/// `last_score` and therefore never wins.
pub fn energy(
    shape: &Shape,
    alpha: u8,
    target: &Bitmap,
    current: &Bitmap,
    buffer: &mut Bitmap,
    last_score: f64,
) -> f64 {
    profiling::scope!("energy");

    let bounds = Bounds::new(target.width(), target.height());
    let lines = shape.rasterize(bounds);
    let color = compute_color(target, current, &lines, alpha);
    copy_lines(buffer, current, &lines);
    draw_lines(buffer, color, &lines);
    difference_partial(target, current, buffer, last_score, &lines)
}

/// accept-only-improvements local search: mutate, keep strictly better
/// candidates, revert the rest, stop after `max_age` consecutive
/// rejections. `seed.score` must already be the seed's energy.
pub fn hill_climb(
    seed: State,
    max_age: u32,
    target: &Bitmap,
    current: &Bitmap,
    buffer: &mut Bitmap,
    last_score: f64,
    rng: &mut impl Rng,
) -> State {
    profiling::scope!("hill_climb");

    let bounds = Bounds::new(target.width(), target.height());
    let mut state = seed;
    let mut best = state.clone();
    let mut age = 0u32;

    while age < max_age {
        let undo = state.shape.clone();
        state.shape.mutate(bounds, rng);
        let e = energy(&state.shape, state.alpha, target, current, buffer, last_score);
        if e >= best.score {
            state.shape = undo;
            age += 1;
        } else {
            state.score = e;
            best = state.clone();
            age = 0;
        }
    }

    best
}

/// draw `n` random shapes (kinds drawn uniformly from `shape_types`) and
/// keep the first-seen energy minimum as the climbing seed
#[allow(clippy::too_many_arguments)]
fn best_random_state(
    shape_types: &[ShapeType],
    alpha: u8,
    n: u32,
    target: &Bitmap,
    current: &Bitmap,
    buffer: &mut Bitmap,
    last_score: f64,
    rng: &mut impl Rng,
) -> State {
    let bounds = Bounds::new(target.width(), target.height());
    let mut best: Option<State> = None;

    for _ in 0..n.max(1) {
        let kind = shape_types[rng.random_range(0..shape_types.len())];
        let shape = Shape::random(kind, bounds, rng);
        let score = energy(&shape, alpha, target, current, buffer, last_score);
        if best.as_ref().is_none_or(|b| score < b.score) {
            best = Some(State { shape, score, alpha });
        }
    }

    best.expect("n is clamped to at least one seed")
}

/// random-restart hill-climb: `passes` rounds of seed-then-climb, keeping
/// the first-seen best across rounds
#[allow(clippy::too_many_arguments)]
pub fn best_hill_climb_state(
    shape_types: &[ShapeType],
    alpha: u8,
    n: u32,
    max_age: u32,
    passes: u32,
    target: &Bitmap,
    current: &Bitmap,
    buffer: &mut Bitmap,
    last_score: f64,
    rng: &mut impl Rng,
) -> State {
    profiling::scope!("best_hill_climb_state");
    debug_assert!(!shape_types.is_empty(), "need at least one shape kind");

    let mut overall: Option<State> = None;

    for _ in 0..passes.max(1) {
        let seed = best_random_state(shape_types, alpha, n, target, current, buffer, last_score, rng);
        let climbed = hill_climb(seed, max_age, target, current, buffer, last_score, rng);
        if overall.as_ref().is_none_or(|b| climbed.score < b.score) {
            overall = Some(climbed);
        }
    }

    overall.expect("passes is clamped to at least one round")
}
