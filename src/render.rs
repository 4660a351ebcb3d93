// the scanline blitter and its partial-snapshot counterpart.
//
// blending is straight-alpha src-over in 16-bit fixed point: each 8-bit
// channel is widened with the *257 trick (255 -> 65535), composited, and
// narrowed back with >> 8. No clipping happens here; callers pass trimmed
// scanlines only.

use crate::bitmap::{Bitmap, Rgba};
use crate::scanline::Scanline;

/// composite `color` over every pixel covered by `lines`
pub fn draw_lines(canvas: &mut Bitmap, color: Rgba, lines: &[Scanline]) {
    profiling::scope!("draw_lines");

    // premultiplied 16-bit source channels
    let widen = |v: u8| -> u32 { (v as u32) | ((v as u32) << 8) };
    let sr = widen(color.r) * color.a as u32 / 255;
    let sg = widen(color.g) * color.a as u32 / 255;
    let sb = widen(color.b) * color.a as u32 / 255;
    let sa = widen(color.a);

    const M: u32 = 65535;
    // destination weight (1 - alpha), scaled so the >> 8 narrowing rounds
    // through the same 257 ramp as the source
    let aa = (M - sa) * 257;

    let width = canvas.width() as usize;
    let data = canvas.data_mut();

    for line in lines {
        let row = (line.y as usize) * width;
        for x in line.x1..=line.x2 {
            let i = (row + x as usize) * 4;
            data[i] = (((data[i] as u32 * aa + sr * M) / M) >> 8) as u8;
            data[i + 1] = (((data[i + 1] as u32 * aa + sg * M) / M) >> 8) as u8;
            data[i + 2] = (((data[i + 2] as u32 * aa + sb * M) / M) >> 8) as u8;
            data[i + 3] = (((data[i + 3] as u32 * aa + sa * M) / M) >> 8) as u8;
        }
    }
}

/// copy the pixels of `src` covered by `lines` into `dst`. Both bitmaps
/// must share dimensions; this is the snapshot half of candidate scoring.
pub fn copy_lines(dst: &mut Bitmap, src: &Bitmap, lines: &[Scanline]) {
    profiling::scope!("copy_lines");
    debug_assert_eq!(dst.width(), src.width());
    debug_assert_eq!(dst.height(), src.height());

    let width = src.width() as usize;
    let s = src.data();
    let d = dst.data_mut();

    for line in lines {
        let start = ((line.y as usize) * width + line.x1 as usize) * 4;
        let end = ((line.y as usize) * width + line.x2 as usize + 1) * 4;
        d[start..end].copy_from_slice(&s[start..end]);
    }
}
