/// Input-validity errors. These are the only fatal outcomes of a detection
/// call; everything else degrades to an empty result.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("image {width}x{height} is too small for corner detection (need at least {min}x{min})")]
    TooSmall {
        width: usize,
        height: usize,
        min: usize,
    },
}
