// pixel-difference scoring and the optimal color solver.
//
// scores are root-mean-square error over all four channels, normalized to
// [0, 1] (lower is better). differenceFull walks the whole image and runs
// O(1) times per step; differencePartial patches the squared-error total
// for just the pixels a candidate touches and runs once per candidate, so
// it is the hot path of the whole engine.

use rayon::prelude::*;

use crate::bitmap::{Bitmap, Rgba};
use crate::scanline::Scanline;

/// full-image RMS difference between two same-sized bitmaps, in [0, 1]
pub fn difference_full(target: &Bitmap, current: &Bitmap) -> f64 {
    profiling::scope!("difference_full");
    debug_assert_eq!(target.width(), current.width());
    debug_assert_eq!(target.height(), current.height());

    // one rayon unit per batch of rows; tiny images stay on one thread
    let row_bytes = (target.width() as usize) * 4;
    let min_rows = (64 * 1024 / row_bytes).max(1);

    let total: u64 = target
        .data()
        .par_chunks(row_bytes * min_rows)
        .zip(current.data().par_chunks(row_bytes * min_rows))
        .map(|(t_rows, c_rows)| {
            let mut sum = 0u64;
            for (t, c) in t_rows.iter().zip(c_rows.iter()) {
                let d = (*t as i32 - *c as i32) as i64;
                sum += (d * d) as u64;
            }
            sum
        })
        .sum();

    let samples = (target.width() as f64) * (target.height() as f64) * 4.0;
    (total as f64 / samples).sqrt() / 255.0
}

/// rebuild the score after only the pixels under `lines` changed from
/// `before` to `after`. Undoes the before-contribution and adds the
/// after-contribution to the squared-error total implied by `last_score`.
/// Empty `lines` returns `last_score` unchanged.
pub fn difference_partial(
    target: &Bitmap,
    before: &Bitmap,
    after: &Bitmap,
    last_score: f64,
    lines: &[Scanline],
) -> f64 {
    profiling::scope!("difference_partial");

    let samples = (target.width() as f64) * (target.height() as f64) * 4.0;
    let mut total = (last_score * 255.0) * (last_score * 255.0) * samples;

    let t = target.data();
    let b = before.data();
    let a = after.data();
    let width = target.width() as usize;

    for line in lines {
        let row = (line.y as usize) * width;
        for x in line.x1..=line.x2 {
            let i = (row + x as usize) * 4;
            for c in 0..4 {
                let dt_before = t[i + c] as i64 - b[i + c] as i64;
                let dt_after = t[i + c] as i64 - a[i + c] as i64;
                total -= (dt_before * dt_before) as f64;
                total += (dt_after * dt_after) as f64;
            }
        }
    }

    (total.max(0.0) / samples).sqrt() / 255.0
}

/// solve for the color that minimizes post-blend error over the covered
/// pixels at translucency `alpha`. Per channel this averages
/// `(t - c) * 255/alpha + c` in 8.8 fixed point and clamps to [0, 255].
/// Zero coverage returns black at the requested alpha; alpha 0 is
/// degenerate and returns transparent black.
pub fn compute_color(target: &Bitmap, current: &Bitmap, lines: &[Scanline], alpha: u8) -> Rgba {
    profiling::scope!("compute_color");

    if alpha == 0 {
        return Rgba::new(0, 0, 0, 0);
    }

    // 257 scales 8-bit channels to 16-bit so the alpha division keeps precision
    let scale = (257.0 * 255.0 / alpha as f64) as i64;

    let mut total_r: i64 = 0;
    let mut total_g: i64 = 0;
    let mut total_b: i64 = 0;
    let mut count: i64 = 0;

    let t = target.data();
    let c = current.data();
    let width = target.width() as usize;

    for line in lines {
        let row = (line.y as usize) * width;
        for x in line.x1..=line.x2 {
            let i = (row + x as usize) * 4;
            total_r += (t[i] as i64 - c[i] as i64) * scale + c[i] as i64 * 257;
            total_g += (t[i + 1] as i64 - c[i + 1] as i64) * scale + c[i + 1] as i64 * 257;
            total_b += (t[i + 2] as i64 - c[i + 2] as i64) * scale + c[i + 2] as i64 * 257;
            count += 1;
        }
    }

    if count == 0 {
        return Rgba::new(0, 0, 0, alpha);
    }

    Rgba::new(
        ((total_r / count) >> 8).clamp(0, 255) as u8,
        ((total_g / count) >> 8).clamp(0, 255) as u8,
        ((total_b / count) >> 8).clamp(0, 255) as u8,
        alpha,
    )
}
