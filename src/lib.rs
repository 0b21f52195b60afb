//! Unsupervised colour segmentation of RGB images.
//!
//! Pixels are clustered by colour with k-means, each cluster is repainted from
//! a named palette, and under the black & white palette the share of white
//! pixels is reported as a cloud-coverage classification.

pub mod coverage;
pub mod error;
pub mod features;
pub mod kmeans;
pub mod output;
pub mod palettes;
pub mod resolve;
pub mod segment;
pub mod wasm;

pub use coverage::{ClassificationResult, CoverageBand, classify};
pub use error::{Result, SegmentationError};
pub use features::{Feature, extract_features};
pub use kmeans::{ClusterModel, DEFAULT_MAX_ITERATIONS, cluster, predict};
pub use output::{OutputFormat, OutputPlan, WriteMode, plan_output};
pub use palettes::{Palette, PaletteKind};
pub use resolve::LabelResolver;
pub use segment::{SegmentConfig, Segmentation, random_seed, segment_file, segment_image, segment_pixels};
