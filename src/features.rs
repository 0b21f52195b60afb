use crate::error::{Result, SegmentationError};

/// One pixel's colour as a point in 3-D feature space.
pub type Feature = [f32; 3];

/// Convert an interleaved RGB buffer into one feature per pixel, in buffer order.
///
/// With `normalize` each channel is scaled to `[0, 1]`; otherwise the raw byte
/// value is kept as a float in `[0, 255]`.
pub fn extract_features(raw: &[u8], normalize: bool) -> Result<Vec<Feature>> {
    if raw.len() % 3 != 0 {
        return Err(SegmentationError::MalformedBuffer(raw.len()));
    }

    let divisor = if normalize { 255.0 } else { 1.0 };
    let features = raw
        .chunks_exact(3)
        .map(|chunk| {
            [
                chunk[0] as f32 / divisor,
                chunk[1] as f32 / divisor,
                chunk[2] as f32 / divisor,
            ]
        })
        .collect();

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_channels_stay_in_unit_range() {
        let raw = [0u8, 128, 255, 10, 20, 30];
        let features = extract_features(&raw, true).unwrap();

        assert_eq!(features.len(), 2);
        assert_eq!(features[0][0], 0.0);
        assert_eq!(features[0][2], 1.0);
        for f in &features {
            assert!(f.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn raw_channels_keep_byte_magnitude() {
        let features = extract_features(&[1, 2, 255], false).unwrap();
        assert_eq!(features, vec![[1.0, 2.0, 255.0]]);
    }

    #[test]
    fn rejects_partial_pixel() {
        let err = extract_features(&[1, 2, 3, 4], true).unwrap_err();
        assert!(matches!(err, SegmentationError::MalformedBuffer(4)));
    }

    #[test]
    fn empty_buffer_gives_no_features() {
        assert!(extract_features(&[], true).unwrap().is_empty());
    }
}
