use serde::Serialize;

use crate::error::{Result, SegmentationError};

/// Cloud coverage bands. Upper edges are inclusive and the lowest band also
/// takes a ratio of exactly zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoverageBand {
    /// `[0, 0.25]`
    Cloudy0To25,
    /// `(0.25, 0.50]`
    Cloudy26To50,
    /// `(0.50, 0.75]`
    Cloudy51To75,
    /// `(0.75, 1.0]`
    Cloudy76To100,
}

impl CoverageBand {
    pub fn from_ratio(ratio: f64) -> CoverageBand {
        if ratio <= 0.25 {
            CoverageBand::Cloudy0To25
        } else if ratio <= 0.50 {
            CoverageBand::Cloudy26To50
        } else if ratio <= 0.75 {
            CoverageBand::Cloudy51To75
        } else {
            CoverageBand::Cloudy76To100
        }
    }
}

/// The JSON object handed to downstream classification tooling.
///
/// Field names and order are a wire contract. In coverage mode exactly one
/// `cloudy_*` flag is 1 and `_cloud_coverage` carries the ratio (the leading
/// underscore marks it as metadata rather than a label). In feature-extraction
/// mode every `cloudy_*` flag is 0, `features` is 1 and the ratio is absent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub cloudy_0_25: u8,
    pub cloudy_26_50: u8,
    pub cloudy_51_75: u8,
    pub cloudy_76_100: u8,
    pub features: u8,
    #[serde(rename = "_cloud_coverage", skip_serializing_if = "Option::is_none")]
    pub cloud_coverage: Option<f64>,
}

impl ClassificationResult {
    /// Result of a run that did not use the binary palette.
    pub fn feature_extraction() -> Self {
        ClassificationResult {
            cloudy_0_25: 0,
            cloudy_26_50: 0,
            cloudy_51_75: 0,
            cloudy_76_100: 0,
            features: 1,
            cloud_coverage: None,
        }
    }

    pub fn from_ratio(ratio: f64) -> Self {
        let band = CoverageBand::from_ratio(ratio);
        ClassificationResult {
            cloudy_0_25: (band == CoverageBand::Cloudy0To25) as u8,
            cloudy_26_50: (band == CoverageBand::Cloudy26To50) as u8,
            cloudy_51_75: (band == CoverageBand::Cloudy51To75) as u8,
            cloudy_76_100: (band == CoverageBand::Cloudy76To100) as u8,
            features: 0,
            cloud_coverage: Some(ratio),
        }
    }

    pub fn is_coverage(&self) -> bool {
        self.cloud_coverage.is_some()
    }

    pub fn band(&self) -> Option<CoverageBand> {
        self.cloud_coverage.map(CoverageBand::from_ratio)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Bucket `white_pixels / total_pixels` into a coverage band.
pub fn classify(white_pixels: u64, total_pixels: u64) -> Result<ClassificationResult> {
    if total_pixels == 0 {
        return Err(SegmentationError::ZeroPixels);
    }
    let ratio = white_pixels as f64 / total_pixels as f64;
    Ok(ClassificationResult::from_ratio(ratio))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hot_flags(r: &ClassificationResult) -> u8 {
        r.cloudy_0_25 + r.cloudy_26_50 + r.cloudy_51_75 + r.cloudy_76_100
    }

    #[test]
    fn exactly_one_band_is_hot() {
        for total in [1u64, 3, 4, 7, 100] {
            for count in 0..=total {
                let r = classify(count, total).unwrap();
                assert_eq!(hot_flags(&r), 1, "count={count} total={total}");
                assert_eq!(r.features, 0);
            }
        }
    }

    #[test]
    fn upper_edges_are_inclusive() {
        assert_eq!(classify(0, 4).unwrap().cloudy_0_25, 1);
        assert_eq!(classify(1, 4).unwrap().cloudy_0_25, 1);
        assert_eq!(classify(2, 4).unwrap().cloudy_26_50, 1);
        assert_eq!(classify(3, 4).unwrap().cloudy_51_75, 1);
        assert_eq!(classify(4, 4).unwrap().cloudy_76_100, 1);
        assert_eq!(classify(26, 100).unwrap().cloudy_26_50, 1);
    }

    #[test]
    fn zero_pixels_is_an_error() {
        assert!(matches!(classify(0, 0), Err(SegmentationError::ZeroPixels)));
    }

    #[test]
    fn coverage_json_shape() {
        let json = classify(2, 4).unwrap().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"cloudy_0_25":0,"cloudy_26_50":1,"cloudy_51_75":0,"cloudy_76_100":0,"features":0,"_cloud_coverage":0.5}"#
        );
    }

    #[test]
    fn feature_extraction_json_shape() {
        let r = ClassificationResult::feature_extraction();
        assert!(!r.is_coverage());
        assert_eq!(r.band(), None);
        assert_eq!(
            r.to_json().unwrap(),
            r#"{"cloudy_0_25":0,"cloudy_26_50":0,"cloudy_51_75":0,"cloudy_76_100":0,"features":1}"#
        );
    }
}
