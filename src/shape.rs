// the polymorphic shape family: a tagged variant over nine primitive kinds.
//
// every kind supports random construction inside the canvas, local
// mutation, scanline rasterization, a fixed i32 parameter layout, and an
// SVG fragment. Shapes do not own the canvas; its dimensions travel as a
// small Bounds record passed at construction, mutation and rasterization
// time.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geom::{
    bresenham, ellipse_scanlines, rotated_ellipse_scanlines, rotated_rect_corners,
    scanlines_for_path, scanlines_for_polygon,
};
use crate::scanline::Scanline;

/// placeholder token emitted exactly once per SVG fragment; the caller
/// splices fill/stroke attributes in its place
pub const SVG_STYLE_HOOK: &str = "SVG_STYLE_HOOK";

/// clamping domain for shape parameters, taken from the canvas
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub w: i32,
    pub h: i32,
}

impl Bounds {
    pub fn new(w: u32, h: u32) -> Self {
        debug_assert!(w > 0 && h > 0);
        Bounds {
            w: w as i32,
            h: h as i32,
        }
    }

    #[inline]
    fn clamp_x(&self, x: i32) -> i32 {
        x.clamp(0, self.w - 1)
    }

    #[inline]
    fn clamp_y(&self, y: i32) -> i32 {
        y.clamp(0, self.h - 1)
    }

    #[inline]
    fn max_radius(&self) -> i32 {
        self.w.max(self.h)
    }

    fn random_point(&self, rng: &mut impl Rng) -> (i32, i32) {
        (rng.random_range(0..self.w), rng.random_range(0..self.h))
    }
}

/// closed enumeration of the primitive kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    Rectangle,
    RotatedRectangle,
    Triangle,
    Ellipse,
    RotatedEllipse,
    Circle,
    Line,
    QuadraticBezier,
    Polyline,
}

impl ShapeType {
    pub const ALL: [ShapeType; 9] = [
        ShapeType::Rectangle,
        ShapeType::RotatedRectangle,
        ShapeType::Triangle,
        ShapeType::Ellipse,
        ShapeType::RotatedEllipse,
        ShapeType::Circle,
        ShapeType::Line,
        ShapeType::QuadraticBezier,
        ShapeType::Polyline,
    ];
}

/// one primitive with its parameters inline. Corner pairs are stored as
/// constructed (possibly unordered); rasterization and SVG emission
/// normalize on the fly. Angles are degrees in [0, 360).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Rectangle { x1: i32, y1: i32, x2: i32, y2: i32 },
    RotatedRectangle { x1: i32, y1: i32, x2: i32, y2: i32, angle: i32 },
    Triangle { x1: i32, y1: i32, x2: i32, y2: i32, x3: i32, y3: i32 },
    Ellipse { cx: i32, cy: i32, rx: i32, ry: i32 },
    RotatedEllipse { cx: i32, cy: i32, rx: i32, ry: i32, angle: i32 },
    Circle { cx: i32, cy: i32, r: i32 },
    Line { x1: i32, y1: i32, x2: i32, y2: i32 },
    QuadraticBezier { cx: i32, cy: i32, x1: i32, y1: i32, x2: i32, y2: i32 },
    Polyline { points: Vec<(i32, i32)> },
}

#[inline]
fn jitter(rng: &mut impl Rng, v: i32, amount: i32) -> i32 {
    v + rng.random_range(-amount..=amount)
}

#[inline]
fn turn(rng: &mut impl Rng, angle: i32, amount: i32) -> i32 {
    (angle + rng.random_range(-amount..=amount)).rem_euclid(360)
}

impl Shape {
    /// construct a random shape of the given kind inside `bounds`: a
    /// primary point drawn uniformly, remaining parameters jittered within
    /// a tight radius and clamped back in
    pub fn random(kind: ShapeType, bounds: Bounds, rng: &mut impl Rng) -> Shape {
        let (px, py) = bounds.random_point(rng);
        match kind {
            ShapeType::Rectangle => Shape::Rectangle {
                x1: px,
                y1: py,
                x2: bounds.clamp_x(jitter(rng, px, 16)),
                y2: bounds.clamp_y(jitter(rng, py, 16)),
            },
            ShapeType::RotatedRectangle => Shape::RotatedRectangle {
                x1: px,
                y1: py,
                x2: bounds.clamp_x(jitter(rng, px, 16)),
                y2: bounds.clamp_y(jitter(rng, py, 16)),
                angle: rng.random_range(0..360),
            },
            ShapeType::Triangle => Shape::Triangle {
                x1: px,
                y1: py,
                x2: bounds.clamp_x(jitter(rng, px, 32)),
                y2: bounds.clamp_y(jitter(rng, py, 32)),
                x3: bounds.clamp_x(jitter(rng, px, 32)),
                y3: bounds.clamp_y(jitter(rng, py, 32)),
            },
            ShapeType::Ellipse => Shape::Ellipse {
                cx: px,
                cy: py,
                rx: rng.random_range(1..=32).min(bounds.max_radius()),
                ry: rng.random_range(1..=32).min(bounds.max_radius()),
            },
            ShapeType::RotatedEllipse => Shape::RotatedEllipse {
                cx: px,
                cy: py,
                rx: rng.random_range(1..=32).min(bounds.max_radius()),
                ry: rng.random_range(1..=32).min(bounds.max_radius()),
                angle: rng.random_range(0..360),
            },
            ShapeType::Circle => Shape::Circle {
                cx: px,
                cy: py,
                r: rng.random_range(1..=32).min(bounds.max_radius()),
            },
            ShapeType::Line => Shape::Line {
                x1: px,
                y1: py,
                x2: bounds.clamp_x(jitter(rng, px, 32)),
                y2: bounds.clamp_y(jitter(rng, py, 32)),
            },
            ShapeType::QuadraticBezier => Shape::QuadraticBezier {
                cx: bounds.clamp_x(jitter(rng, px, 32)),
                cy: bounds.clamp_y(jitter(rng, py, 32)),
                x1: bounds.clamp_x(jitter(rng, px, 32)),
                y1: bounds.clamp_y(jitter(rng, py, 32)),
                x2: bounds.clamp_x(jitter(rng, px, 32)),
                y2: bounds.clamp_y(jitter(rng, py, 32)),
            },
            ShapeType::Polyline => Shape::Polyline {
                points: (0..4)
                    .map(|_| {
                        (
                            bounds.clamp_x(jitter(rng, px, 32)),
                            bounds.clamp_y(jitter(rng, py, 32)),
                        )
                    })
                    .collect(),
            },
        }
    }

    /// perturb exactly one parameter group, clamped back into `bounds`.
    /// The type tag and parameter count never change.
    pub fn mutate(&mut self, bounds: Bounds, rng: &mut impl Rng) {
        match self {
            Shape::Rectangle { x1, y1, x2, y2 } => match rng.random_range(0..2) {
                0 => {
                    *x1 = bounds.clamp_x(jitter(rng, *x1, 16));
                    *y1 = bounds.clamp_y(jitter(rng, *y1, 16));
                }
                _ => {
                    *x2 = bounds.clamp_x(jitter(rng, *x2, 16));
                    *y2 = bounds.clamp_y(jitter(rng, *y2, 16));
                }
            },
            Shape::RotatedRectangle { x1, y1, x2, y2, angle } => match rng.random_range(0..3) {
                0 => {
                    *x1 = bounds.clamp_x(jitter(rng, *x1, 16));
                    *y1 = bounds.clamp_y(jitter(rng, *y1, 16));
                }
                1 => {
                    *x2 = bounds.clamp_x(jitter(rng, *x2, 16));
                    *y2 = bounds.clamp_y(jitter(rng, *y2, 16));
                }
                _ => *angle = turn(rng, *angle, 4),
            },
            Shape::Triangle { x1, y1, x2, y2, x3, y3 } => match rng.random_range(0..3) {
                0 => {
                    *x1 = bounds.clamp_x(jitter(rng, *x1, 32));
                    *y1 = bounds.clamp_y(jitter(rng, *y1, 32));
                }
                1 => {
                    *x2 = bounds.clamp_x(jitter(rng, *x2, 32));
                    *y2 = bounds.clamp_y(jitter(rng, *y2, 32));
                }
                _ => {
                    *x3 = bounds.clamp_x(jitter(rng, *x3, 32));
                    *y3 = bounds.clamp_y(jitter(rng, *y3, 32));
                }
            },
            Shape::Ellipse { cx, cy, rx, ry } => match rng.random_range(0..3) {
                0 => {
                    *cx = bounds.clamp_x(jitter(rng, *cx, 16));
                    *cy = bounds.clamp_y(jitter(rng, *cy, 16));
                }
                1 => *rx = jitter(rng, *rx, 16).clamp(1, bounds.max_radius()),
                _ => *ry = jitter(rng, *ry, 16).clamp(1, bounds.max_radius()),
            },
            Shape::RotatedEllipse { cx, cy, rx, ry, angle } => match rng.random_range(0..4) {
                0 => {
                    *cx = bounds.clamp_x(jitter(rng, *cx, 16));
                    *cy = bounds.clamp_y(jitter(rng, *cy, 16));
                }
                1 => *rx = jitter(rng, *rx, 16).clamp(1, bounds.max_radius()),
                2 => *ry = jitter(rng, *ry, 16).clamp(1, bounds.max_radius()),
                _ => *angle = turn(rng, *angle, 4),
            },
            Shape::Circle { cx, cy, r } => match rng.random_range(0..2) {
                0 => {
                    *cx = bounds.clamp_x(jitter(rng, *cx, 16));
                    *cy = bounds.clamp_y(jitter(rng, *cy, 16));
                }
                _ => *r = jitter(rng, *r, 16).clamp(1, bounds.max_radius()),
            },
            Shape::Line { x1, y1, x2, y2 } => match rng.random_range(0..2) {
                0 => {
                    *x1 = bounds.clamp_x(jitter(rng, *x1, 32));
                    *y1 = bounds.clamp_y(jitter(rng, *y1, 32));
                }
                _ => {
                    *x2 = bounds.clamp_x(jitter(rng, *x2, 32));
                    *y2 = bounds.clamp_y(jitter(rng, *y2, 32));
                }
            },
            Shape::QuadraticBezier { cx, cy, x1, y1, x2, y2 } => match rng.random_range(0..3) {
                0 => {
                    *cx = bounds.clamp_x(jitter(rng, *cx, 64));
                    *cy = bounds.clamp_y(jitter(rng, *cy, 64));
                }
                1 => {
                    *x1 = bounds.clamp_x(jitter(rng, *x1, 64));
                    *y1 = bounds.clamp_y(jitter(rng, *y1, 64));
                }
                _ => {
                    *x2 = bounds.clamp_x(jitter(rng, *x2, 64));
                    *y2 = bounds.clamp_y(jitter(rng, *y2, 64));
                }
            },
            Shape::Polyline { points } => {
                let i = rng.random_range(0..points.len());
                points[i] = (
                    bounds.clamp_x(jitter(rng, points[i].0, 64)),
                    bounds.clamp_y(jitter(rng, points[i].1, 64)),
                );
            }
        }
    }

    /// scanlines covering the shape's filled interior (or its thin path),
    /// trimmed to the canvas
    pub fn rasterize(&self, bounds: Bounds) -> Vec<Scanline> {
        profiling::scope!("rasterize");
        let lines = match self {
            Shape::Rectangle { x1, y1, x2, y2 } => {
                let (lo_x, hi_x) = (*x1.min(x2), *x1.max(x2));
                (*y1.min(y2)..=*y1.max(y2))
                    .map(|y| Scanline::new(y, lo_x, hi_x))
                    .collect()
            }
            Shape::RotatedRectangle { x1, y1, x2, y2, angle } => {
                scanlines_for_polygon(&rotated_rect_corners(*x1, *y1, *x2, *y2, *angle))
            }
            Shape::Triangle { x1, y1, x2, y2, x3, y3 } => {
                scanlines_for_polygon(&[(*x1, *y1), (*x2, *y2), (*x3, *y3)])
            }
            Shape::Ellipse { cx, cy, rx, ry } => ellipse_scanlines(*cx, *cy, *rx, *ry),
            Shape::RotatedEllipse { cx, cy, rx, ry, angle } => {
                rotated_ellipse_scanlines(*cx, *cy, *rx, *ry, *angle)
            }
            Shape::Circle { cx, cy, r } => ellipse_scanlines(*cx, *cy, *r, *r),
            Shape::Line { x1, y1, x2, y2 } => scanlines_for_path(bresenham(*x1, *y1, *x2, *y2)),
            Shape::QuadraticBezier { cx, cy, x1, y1, x2, y2 } => {
                // control polygon, not the true curve; at these resolutions
                // the deviation is sub-pixel and the walk is far cheaper
                let mut walk = bresenham(*x1, *y1, *cx, *cy);
                walk.extend(bresenham(*cx, *cy, *x2, *y2));
                scanlines_for_path(walk)
            }
            Shape::Polyline { points } => {
                let mut walk = Vec::new();
                for pair in points.windows(2) {
                    walk.extend(bresenham(pair[0].0, pair[0].1, pair[1].0, pair[1].1));
                }
                scanlines_for_path(walk)
            }
        };
        Scanline::trim(lines, bounds.w as u32, bounds.h as u32)
    }

    #[inline]
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Rectangle { .. } => ShapeType::Rectangle,
            Shape::RotatedRectangle { .. } => ShapeType::RotatedRectangle,
            Shape::Triangle { .. } => ShapeType::Triangle,
            Shape::Ellipse { .. } => ShapeType::Ellipse,
            Shape::RotatedEllipse { .. } => ShapeType::RotatedEllipse,
            Shape::Circle { .. } => ShapeType::Circle,
            Shape::Line { .. } => ShapeType::Line,
            Shape::QuadraticBezier { .. } => ShapeType::QuadraticBezier,
            Shape::Polyline { .. } => ShapeType::Polyline,
        }
    }

    /// parameters as an ordered i32 sequence; layout is fixed per kind
    pub fn raw_params(&self) -> Vec<i32> {
        match self {
            Shape::Rectangle { x1, y1, x2, y2 } => vec![*x1, *y1, *x2, *y2],
            Shape::RotatedRectangle { x1, y1, x2, y2, angle } => vec![*x1, *y1, *x2, *y2, *angle],
            Shape::Triangle { x1, y1, x2, y2, x3, y3 } => vec![*x1, *y1, *x2, *y2, *x3, *y3],
            Shape::Ellipse { cx, cy, rx, ry } => vec![*cx, *cy, *rx, *ry],
            Shape::RotatedEllipse { cx, cy, rx, ry, angle } => vec![*cx, *cy, *rx, *ry, *angle],
            Shape::Circle { cx, cy, r } => vec![*cx, *cy, *r],
            Shape::Line { x1, y1, x2, y2 } => vec![*x1, *y1, *x2, *y2],
            Shape::QuadraticBezier { cx, cy, x1, y1, x2, y2 } => {
                vec![*cx, *cy, *x1, *y1, *x2, *y2]
            }
            Shape::Polyline { points } => points.iter().flat_map(|&(x, y)| [x, y]).collect(),
        }
    }

    /// self-contained SVG element with the style hook token in attribute
    /// position. Béziers emit the true curve here even though the
    /// rasterizer walks the control polygon.
    pub fn svg_fragment(&self) -> String {
        match self {
            Shape::Rectangle { x1, y1, x2, y2 } => {
                let (lo_x, hi_x) = (*x1.min(x2), *x1.max(x2));
                let (lo_y, hi_y) = (*y1.min(y2), *y1.max(y2));
                format!(
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {} />",
                    lo_x,
                    lo_y,
                    hi_x - lo_x + 1,
                    hi_y - lo_y + 1,
                    SVG_STYLE_HOOK
                )
            }
            Shape::RotatedRectangle { x1, y1, x2, y2, angle } => {
                let c = rotated_rect_corners(*x1, *y1, *x2, *y2, *angle);
                format!(
                    "<path d=\"M {} {} L {} {} L {} {} L {} {} Z\" {} />",
                    c[0].0, c[0].1, c[1].0, c[1].1, c[2].0, c[2].1, c[3].0, c[3].1, SVG_STYLE_HOOK
                )
            }
            Shape::Triangle { x1, y1, x2, y2, x3, y3 } => format!(
                "<path d=\"M {} {} L {} {} L {} {} Z\" {} />",
                x1, y1, x2, y2, x3, y3, SVG_STYLE_HOOK
            ),
            Shape::Ellipse { cx, cy, rx, ry } => format!(
                "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" {} />",
                cx, cy, rx, ry, SVG_STYLE_HOOK
            ),
            Shape::RotatedEllipse { cx, cy, rx, ry, angle } => format!(
                "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" transform=\"rotate({} {} {})\" {} />",
                cx, cy, rx, ry, angle, cx, cy, SVG_STYLE_HOOK
            ),
            Shape::Circle { cx, cy, r } => format!(
                "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" {} />",
                cx, cy, r, r, SVG_STYLE_HOOK
            ),
            Shape::Line { x1, y1, x2, y2 } => format!(
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" {} />",
                x1, y1, x2, y2, SVG_STYLE_HOOK
            ),
            Shape::QuadraticBezier { cx, cy, x1, y1, x2, y2 } => format!(
                "<path d=\"M {} {} Q {} {} {} {}\" {} />",
                x1, y1, cx, cy, x2, y2, SVG_STYLE_HOOK
            ),
            Shape::Polyline { points } => {
                let coords = points
                    .iter()
                    .map(|(x, y)| format!("{},{}", x, y))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("<polyline points=\"{}\" {} />", coords, SVG_STYLE_HOOK)
            }
        }
    }
}
