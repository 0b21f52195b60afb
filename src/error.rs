use thiserror::Error;

/// Errors reported by the segmentation pipeline.
///
/// Every argument check runs before the pixel buffer is touched, so an `Err`
/// never leaves a half-recoloured image behind.
#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("invalid k-means k value: {0}")]
    InvalidK(usize),

    #[error("cannot cluster an empty feature set")]
    EmptyFeatures,

    #[error("pixel buffer length {0} is not a multiple of 3")]
    MalformedBuffer(usize),

    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        len: usize,
        width: u32,
        height: u32,
    },

    #[error("{labels} labels cannot recolor a buffer of {pixels} pixels")]
    LabelCountMismatch { labels: usize, pixels: usize },

    #[error("palette {name} has {len} colors but k is {k}")]
    PaletteTooSmall {
        name: &'static str,
        len: usize,
        k: usize,
    },

    #[error("image has no pixels")]
    ZeroPixels,

    #[error("image format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("no entropy available for seeding: {0}")]
    Entropy(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SegmentationError>;
