// scan-conversion helpers shared by the shape family.
//
// everything here produces integer pixel coordinates; clipping to the canvas
// happens later in Scanline::trim, so these functions are free to emit
// out-of-range coordinates.

use crate::scanline::Scanline;

/// integer line walk from (x1, y1) to (x2, y2), both endpoints included
pub fn bresenham(x1: i32, y1: i32, x2: i32, y2: i32) -> Vec<(i32, i32)> {
    let dx = (x2 - x1).abs();
    let dy = -(y2 - y1).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };

    let mut points = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    let mut err = dx + dy;
    let mut x = x1;
    let mut y = y1;

    loop {
        points.push((x, y));
        if x == x2 && y == y2 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    points
}

/// scanlines covering the filled interior of a convex polygon: walk every
/// edge with Bresenham and keep the per-row min/max column.
pub fn scanlines_for_polygon(points: &[(i32, i32)]) -> Vec<Scanline> {
    if points.len() < 3 {
        return Vec::new();
    }

    let min_y = points.iter().map(|p| p.1).min().unwrap();
    let max_y = points.iter().map(|p| p.1).max().unwrap();
    let rows = (max_y - min_y + 1) as usize;
    let mut extents: Vec<Option<(i32, i32)>> = vec![None; rows];

    for i in 0..points.len() {
        let (ax, ay) = points[i];
        let (bx, by) = points[(i + 1) % points.len()];
        for (x, y) in bresenham(ax, ay, bx, by) {
            let row = (y - min_y) as usize;
            extents[row] = Some(match extents[row] {
                Some((lo, hi)) => (lo.min(x), hi.max(x)),
                None => (x, x),
            });
        }
    }

    extents
        .into_iter()
        .enumerate()
        .filter_map(|(row, extent)| {
            extent.map(|(lo, hi)| Scanline::new(min_y + row as i32, lo, hi))
        })
        .collect()
}

/// turn a pixel walk (line, polyline, control polygon) into length-1
/// scanlines. Consecutive segments share endpoints, so the walk is sorted
/// and deduplicated first; a pixel covered twice would otherwise be blended
/// and scored twice.
pub fn scanlines_for_path(mut points: Vec<(i32, i32)>) -> Vec<Scanline> {
    points.sort_unstable_by(|a, b| (a.1, a.0).cmp(&(b.1, b.0)));
    points.dedup();
    points
        .into_iter()
        .map(|(x, y)| Scanline::new(y, x, x))
        .collect()
}

/// axis-aligned ellipse fill: one scanline per row, extent from the conic
pub fn ellipse_scanlines(cx: i32, cy: i32, rx: i32, ry: i32) -> Vec<Scanline> {
    let mut lines = Vec::with_capacity((2 * ry + 1) as usize);
    for dy in -ry..=ry {
        let frac = 1.0 - (dy * dy) as f64 / (ry * ry) as f64;
        let dx = (rx as f64 * frac.max(0.0).sqrt()) as i32;
        lines.push(Scanline::new(cy + dy, cx - dx, cx + dx));
    }
    lines
}

/// rotated ellipse fill: sample the boundary once per degree and scan the
/// resulting polygon, which walks the gaps between samples
pub fn rotated_ellipse_scanlines(cx: i32, cy: i32, rx: i32, ry: i32, angle: i32) -> Vec<Scanline> {
    let (sin_a, cos_a) = (angle as f64).to_radians().sin_cos();
    let boundary: Vec<(i32, i32)> = (0..360)
        .map(|t| {
            let (sin_t, cos_t) = (t as f64).to_radians().sin_cos();
            let x = rx as f64 * cos_t;
            let y = ry as f64 * sin_t;
            (
                (cx as f64 + x * cos_a - y * sin_a).round() as i32,
                (cy as f64 + x * sin_a + y * cos_a).round() as i32,
            )
        })
        .collect();
    scanlines_for_polygon(&boundary)
}

/// the four corners of the rectangle `(x1, y1)-(x2, y2)` rotated by
/// `angle_deg` around its center, rounded to pixel coordinates
pub fn rotated_rect_corners(x1: i32, y1: i32, x2: i32, y2: i32, angle_deg: i32) -> [(i32, i32); 4] {
    let (lo_x, hi_x) = (x1.min(x2) as f64, x1.max(x2) as f64);
    let (lo_y, hi_y) = (y1.min(y2) as f64, y1.max(y2) as f64);
    let cx = (lo_x + hi_x) / 2.0;
    let cy = (lo_y + hi_y) / 2.0;
    let (sin, cos) = (angle_deg as f64).to_radians().sin_cos();

    let rotate = |x: f64, y: f64| -> (i32, i32) {
        let dx = x - cx;
        let dy = y - cy;
        (
            (cx + dx * cos - dy * sin).round() as i32,
            (cy + dx * sin + dy * cos).round() as i32,
        )
    };

    [
        rotate(lo_x, lo_y),
        rotate(hi_x, lo_y),
        rotate(hi_x, hi_y),
        rotate(lo_x, hi_y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bresenham_includes_both_endpoints() {
        let pts = bresenham(2, 3, 7, 9);
        assert_eq!(*pts.first().unwrap(), (2, 3));
        assert_eq!(*pts.last().unwrap(), (7, 9));
    }

    #[test]
    fn test_bresenham_degenerate_is_single_pixel() {
        assert_eq!(bresenham(5, 5, 5, 5), vec![(5, 5)]);
    }

    #[test]
    fn test_bresenham_horizontal_run() {
        let pts = bresenham(1, 4, 5, 4);
        assert_eq!(pts, vec![(1, 4), (2, 4), (3, 4), (4, 4), (5, 4)]);
    }

    #[test]
    fn test_polygon_fill_of_axis_rect() {
        // a 4x3 rectangle expressed as a polygon fills every row edge-to-edge
        let lines = scanlines_for_polygon(&[(1, 1), (4, 1), (4, 3), (1, 3)]);
        assert_eq!(
            lines,
            vec![
                Scanline::new(1, 1, 4),
                Scanline::new(2, 1, 4),
                Scanline::new(3, 1, 4),
            ]
        );
    }

    #[test]
    fn test_polygon_rejects_degenerate_input() {
        assert!(scanlines_for_polygon(&[(0, 0), (5, 5)]).is_empty());
    }

    #[test]
    fn test_path_scanlines_are_unique() {
        // two segments sharing the joint pixel (3, 3)
        let mut walk = bresenham(0, 0, 3, 3);
        walk.extend(bresenham(3, 3, 6, 3));
        let lines = scanlines_for_path(walk);
        let joint: Vec<_> = lines.iter().filter(|l| l.y == 3 && l.x1 == 3).collect();
        assert_eq!(joint.len(), 1);
    }

    #[test]
    fn test_rotated_corners_identity_at_zero() {
        let corners = rotated_rect_corners(2, 3, 8, 7, 0);
        assert_eq!(corners, [(2, 3), (8, 3), (8, 7), (2, 7)]);
    }

    #[test]
    fn test_rotated_corners_quarter_turn_preserves_center() {
        let corners = rotated_rect_corners(0, 0, 10, 10, 90);
        let cx: i32 = corners.iter().map(|c| c.0).sum::<i32>() / 4;
        let cy: i32 = corners.iter().map(|c| c.1).sum::<i32>() / 4;
        assert_eq!((cx, cy), (5, 5));
    }
}
