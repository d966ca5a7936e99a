//! Error types for scalefuse.

use thiserror::Error;

/// Result alias for scalefuse operations.
pub type ScaleFuseResult<T> = std::result::Result<T, ScaleFuseError>;

/// Errors that can occur when building or fusing cost volumes.
#[derive(Debug, Error, PartialEq)]
pub enum ScaleFuseError {
    /// An image or volume dimension is zero or overflows the address space.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The row stride is smaller than the image width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The provided buffer cannot hold the described image or volume.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The left and right images of a stereo pair differ in size.
    #[error("stereo pair size mismatch: left {left_width}x{left_height}, right {right_width}x{right_height}")]
    MismatchedPair {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },
    /// The disparity range leaves no candidate slice (`max_disparity < 1`).
    #[error("invalid disparity range: max_disparity = {max_disparity}")]
    InvalidDisparityRange { max_disparity: usize },
    /// The disparity scale factor is zero, or scales the largest candidate
    /// past what the disparity map can represent.
    #[error("disparity scale must be positive and keep scaled disparities within u16")]
    InvalidDisparityScale,
    /// The blend weight lies outside `[0, 1]` or is not finite.
    #[error("blend weight {alpha} outside [0, 1]")]
    InvalidBlendWeight { alpha: f32 },
    /// The smoothness strength is negative or not finite.
    #[error("smoothness strength {lambda} must be finite and non-negative")]
    InvalidSmoothness { lambda: f64 },
    /// A fusion call received no pyramid levels.
    #[error("pyramid has no levels")]
    EmptyPyramid,
    /// A pyramid level breaks the halving chain expected by fusion.
    #[error("pyramid level {level} breaks the halving chain: {context}")]
    PyramidShape { level: usize, context: &'static str },
    /// The regularization matrix could not be inverted.
    #[error("regularization matrix is singular for {levels} levels, lambda = {lambda}")]
    SingularRegularization { levels: usize, lambda: f64 },
    /// A diagnostic export failed to write.
    #[error("export failed: {reason}")]
    Io { reason: String },
    /// An image file could not be loaded or saved.
    #[cfg(feature = "image-io")]
    #[error("image io failed: {reason}")]
    ImageIo { reason: String },
}
