use log::debug;
use palette::Srgb;

use crate::error::{Result, SegmentationError};
use crate::kmeans::ClusterModel;
use crate::palettes::{BLACK, Palette, WHITE};

/// Maps cluster labels to display colours.
///
/// Cluster ids carry no meaning of their own, so for the binary palette the
/// resolver asks the model which label lies nearest to pure black once, up
/// front. That label is painted black and every other label white.
#[derive(Debug, Clone)]
pub struct LabelResolver<'a> {
    palette: &'a Palette,
    black_label: Option<usize>,
}

impl<'a> LabelResolver<'a> {
    pub fn new(palette: &'a Palette, model: &ClusterModel) -> Self {
        let black_label = palette.kind().is_binary().then(|| {
            let label = model.predict(&[0.0, 0.0, 0.0]);
            debug!("black/white palette: label {label} is nearest to black");
            label
        });
        LabelResolver {
            palette,
            black_label,
        }
    }

    /// Label painted black, when the binary palette is in use.
    pub fn black_label(&self) -> Option<usize> {
        self.black_label
    }

    pub fn color_for(&self, label: usize) -> Srgb<u8> {
        match self.black_label {
            Some(black) if label == black => BLACK,
            Some(_) => WHITE,
            None => self.palette.color(label),
        }
    }

    /// Overwrite `buf` (3 bytes per pixel) with the colour of each pixel's label
    /// and return how many pixels came out white under the binary palette.
    ///
    /// `buf` may be the very buffer the features were extracted from.
    pub fn recolor(&self, labels: &[usize], buf: &mut [u8]) -> Result<u64> {
        if buf.len() != labels.len() * 3 {
            return Err(SegmentationError::LabelCountMismatch {
                labels: labels.len(),
                pixels: buf.len() / 3,
            });
        }

        let counting = self.black_label.is_some();
        let mut coverage = 0u64;
        for (&label, px) in labels.iter().zip(buf.chunks_exact_mut(3)) {
            let rgb = self.color_for(label);
            px.copy_from_slice(&[rgb.red, rgb.green, rgb.blue]);

            if counting && rgb == WHITE {
                coverage += 1;
            }
        }

        Ok(coverage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Feature, extract_features};
    use crate::kmeans::{DEFAULT_MAX_ITERATIONS, cluster};
    use crate::palettes::PaletteKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn near_black_and_white() -> Vec<Feature> {
        let mut v = vec![[0.01, 0.01, 0.01]; 5];
        v.extend(vec![[0.99, 0.99, 0.99]; 5]);
        v
    }

    #[test]
    fn near_black_pixels_paint_black_for_any_seed() {
        let features = near_black_and_white();
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let model = cluster(&features, 2, DEFAULT_MAX_ITERATIONS, &mut rng).unwrap();
            let palette = Palette::resolve(PaletteKind::BlackWhite, 2, &mut rng);
            let resolver = LabelResolver::new(&palette, &model);

            let mut buf = vec![7u8; features.len() * 3];
            let white = resolver.recolor(model.labels(), &mut buf).unwrap();

            assert_eq!(white, 5);
            assert!(buf[..15].iter().all(|&b| b == 0));
            assert!(buf[15..].iter().all(|&b| b == 255));
        }
    }

    #[test]
    fn non_binary_palettes_do_not_count_coverage() {
        let raw = [250u8, 250, 250, 5, 5, 5, 250, 250, 250];
        let features = extract_features(&raw, true).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let model = cluster(&features, 2, DEFAULT_MAX_ITERATIONS, &mut rng).unwrap();
        let palette = Palette::resolve(PaletteKind::Paired, 2, &mut rng);
        let resolver = LabelResolver::new(&palette, &model);
        assert_eq!(resolver.black_label(), None);

        let mut buf = raw.to_vec();
        assert_eq!(resolver.recolor(model.labels(), &mut buf).unwrap(), 0);
        for (px, &label) in buf.chunks_exact(3).zip(model.labels()) {
            let c = palette.color(label);
            assert_eq!(px, &[c.red, c.green, c.blue]);
        }
    }

    #[test]
    fn binary_palette_with_more_clusters_paints_rest_white() {
        let features = vec![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [0.0, 0.0, 0.9], [1.0, 1.0, 1.0]];
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let model = cluster(&features, 4, DEFAULT_MAX_ITERATIONS, &mut rng).unwrap();
        let palette = Palette::resolve(PaletteKind::BlackWhite, 4, &mut rng);
        let resolver = LabelResolver::new(&palette, &model);

        let mut buf = vec![0u8; 12];
        let white = resolver.recolor(model.labels(), &mut buf).unwrap();
        assert_eq!(white, 3);
        assert_eq!(&buf[..3], &[0, 0, 0]);
    }

    #[test]
    fn mismatched_buffer_is_left_untouched() {
        let features = near_black_and_white();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let model = cluster(&features, 2, DEFAULT_MAX_ITERATIONS, &mut rng).unwrap();
        let palette = Palette::resolve(PaletteKind::Set3, 2, &mut rng);
        let resolver = LabelResolver::new(&palette, &model);

        let mut buf = vec![9u8; 6];
        assert!(matches!(
            resolver.recolor(model.labels(), &mut buf),
            Err(SegmentationError::LabelCountMismatch { labels: 10, pixels: 2 })
        ));
        assert!(buf.iter().all(|&b| b == 9));
    }
}
