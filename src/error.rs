use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Construction-boundary failures. Everything past construction is either
/// tolerated (degenerate random shapes) or a programmer error caught by
/// debug assertions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("bitmap dimensions must be non-zero, got {width}x{height}")]
    EmptyBitmap { width: u32, height: u32 },

    #[error("pixel buffer length {got} does not match {width}x{height} RGBA8 ({expected} bytes)")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        got: usize,
    },

    #[error("target is {target_width}x{target_height} but initial canvas is {initial_width}x{initial_height}")]
    DimensionMismatch {
        target_width: u32,
        target_height: u32,
        initial_width: u32,
        initial_height: u32,
    },
}
