use std::path::Path;

use image::RgbImage;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::coverage::{ClassificationResult, classify};
use crate::error::{Result, SegmentationError};
use crate::features::extract_features;
use crate::kmeans::{ClusterModel, DEFAULT_MAX_ITERATIONS, cluster};
use crate::output::{WriteMode, plan_output, write_planned};
use crate::palettes::{Palette, PaletteKind};
use crate::resolve::LabelResolver;

/// Parameters for one segmentation run.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentConfig {
    pub k: usize,
    /// `None` picks one of the non-binary palettes at random.
    pub palette: Option<PaletteKind>,
    pub normalize: bool,
    /// Seeds centroid initialisation, the palette pick and the `Random` palette.
    pub seed: u64,
    pub max_iterations: usize,
}

impl SegmentConfig {
    pub fn new(k: usize, palette: Option<PaletteKind>, seed: u64) -> Self {
        SegmentConfig {
            k,
            palette,
            normalize: true,
            seed,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Everything a run produced besides the recoloured pixels.
#[derive(Clone, Debug)]
pub struct Segmentation {
    pub model: ClusterModel,
    pub palette: Palette,
    /// Pixels painted white under the binary palette; 0 otherwise.
    pub coverage_count: u64,
    pub classification: ClassificationResult,
}

/// Seed drawn from OS entropy, for runs that do not need to be reproducible.
pub fn random_seed() -> Result<u64> {
    getrandom::u64().map_err(|e| SegmentationError::Entropy(e.to_string()))
}

/// Cluster the colours of `buf` and recolour it in place.
///
/// `buf` is interleaved RGB, row-major, `width * height * 3` bytes. Features
/// are read out of it before the resolver writes palette colours back over
/// the same storage. All argument checks happen first, so on `Err` the
/// buffer is unchanged.
pub fn segment_pixels(
    buf: &mut [u8],
    width: u32,
    height: u32,
    config: &SegmentConfig,
) -> Result<Segmentation> {
    let k = config.k;
    if k < 2 {
        return Err(SegmentationError::InvalidK(k));
    }
    let total = width as usize * height as usize;
    if buf.len() != total * 3 {
        return Err(SegmentationError::DimensionMismatch {
            len: buf.len(),
            width,
            height,
        });
    }
    if total == 0 {
        return Err(SegmentationError::ZeroPixels);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let kind = match config.palette {
        Some(kind) => kind,
        None => PaletteKind::choose_random(&mut rng),
    };
    kind.check_k(k)?;

    info!(
        "segmenting {width}x{height} image: k={k}, palette={kind}, normalize={}, seed={}",
        config.normalize, config.seed
    );

    let features = extract_features(buf, config.normalize)?;
    let model = cluster(&features, k, config.max_iterations, &mut rng)?;
    drop(features);

    let palette = Palette::resolve(kind, k, &mut rng);
    let resolver = LabelResolver::new(&palette, &model);
    let coverage_count = resolver.recolor(model.labels(), buf)?;

    let classification = if kind.is_binary() {
        classify(coverage_count, total as u64)?
    } else {
        ClassificationResult::feature_extraction()
    };
    info!(
        "segmentation done after {} iterations, white pixels={coverage_count}",
        model.iterations()
    );

    Ok(Segmentation {
        model,
        palette,
        coverage_count,
        classification,
    })
}

/// [`segment_pixels`] over a decoded image.
pub fn segment_image(img: &mut RgbImage, config: &SegmentConfig) -> Result<Segmentation> {
    let (width, height) = img.dimensions();
    segment_pixels(img, width, height, config)
}

/// Decode `input`, segment it, and write the result according to `mode`.
///
/// The output format is checked before decoding; the input is only renamed
/// or overwritten once segmentation has succeeded.
pub fn segment_file(input: &Path, mode: WriteMode, config: &SegmentConfig) -> Result<Segmentation> {
    let plan = plan_output(input, mode)?;

    let mut img = image::open(input)?.to_rgb8();
    let segmentation = segment_image(&mut img, config)?;

    if let Some(plan) = plan {
        write_planned(&plan, &img)?;
    }
    Ok(segmentation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checks_run_before_buffer_is_touched() {
        let original = vec![10u8, 20, 30, 40, 50, 60];

        let mut buf = original.clone();
        let err = segment_pixels(&mut buf, 2, 1, &SegmentConfig::new(1, None, 0)).unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidK(1)));
        assert_eq!(buf, original);

        let err = segment_pixels(&mut buf, 3, 1, &SegmentConfig::new(2, None, 0)).unwrap_err();
        assert!(matches!(err, SegmentationError::DimensionMismatch { len: 6, .. }));
        assert_eq!(buf, original);

        let config = SegmentConfig::new(12, Some(PaletteKind::PiYG), 0);
        let err = segment_pixels(&mut buf, 2, 1, &config).unwrap_err();
        assert!(matches!(err, SegmentationError::PaletteTooSmall { .. }));
        assert_eq!(buf, original);
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        let mut buf: Vec<u8> = Vec::new();
        let err = segment_pixels(&mut buf, 0, 5, &SegmentConfig::new(2, None, 0)).unwrap_err();
        assert!(matches!(err, SegmentationError::ZeroPixels));
    }

    #[test]
    fn unnamed_palette_is_never_binary() {
        let buf = vec![0u8, 0, 0, 200, 200, 200, 90, 10, 10, 250, 250, 250];
        for seed in 0..10 {
            let mut b = buf.clone();
            let seg = segment_pixels(&mut b, 2, 2, &SegmentConfig::new(2, None, seed)).unwrap();
            assert!(!seg.palette.kind().is_binary());
            assert_eq!(seg.classification, ClassificationResult::feature_extraction());
        }
    }
}
