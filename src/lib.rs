//! Greedy geometric primitive fitting.
//!
//! Approximates a raster target image by compositing a sequence of simple,
//! semi-transparent shapes onto a working canvas. Each [`Model::step`] runs
//! a parallel random-restart hill-climb over candidate shapes, picks the
//! one whose addition most reduces the pixel-wise difference to the target,
//! composites it, and emits a [`ShapeResult`].
//!
//! The crate is the optimization engine only. Its surfaces are raw RGBA8
//! bitmaps in and a stream of `ShapeResult`s out; decoding, encoding, SVG
//! document assembly and progress reporting belong to the caller.
//!
//! ```no_run
//! use primtrace::{Bitmap, Model, Rgba, ShapeType};
//!
//! let pixels = vec![0u8; 64 * 64 * 4];
//! let target = Bitmap::from_bytes(64, 64, pixels).unwrap();
//! let mut model = Model::new(target, Rgba::new(255, 255, 255, 255));
//! for _ in 0..100 {
//!     let result = model.step(&ShapeType::ALL, 128, 50, 100, 1);
//!     println!("{:.6} {}", result.score, result.shape.svg_fragment());
//! }
//! ```

pub mod bitmap;
pub mod error;
pub mod fitness;
pub mod geom;
pub mod model;
pub mod optimizer;
pub mod render;
pub mod rng;
pub mod scanline;
pub mod shape;

pub use bitmap::{Bitmap, Rgba};
pub use error::{Error, Result};
pub use model::{Model, ShapeResult};
pub use optimizer::State;
pub use scanline::Scanline;
pub use shape::{Bounds, Shape, ShapeType, SVG_STYLE_HOOK};
