use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::output::encode_png;
use crate::palettes::PaletteKind;
use crate::segment::{SegmentConfig, segment_image};

/// Segment an encoded image in the browser.
///
/// Steps performed:
/// 1. Decode `input` (any format the `image` crate reads) and drop alpha.
/// 2. Cluster pixel colours into `k` groups and repaint each group with
///    `palette`. Unknown palette names fall back to `Set3`; an empty name picks
///    a random non-binary palette.
/// 3. PNG-encode the result.
///
/// Returns `{ image: Uint8Array, palette: string[], classification: string }`,
/// plus `coverage: number` when the `BW` palette was used.
#[wasm_bindgen]
pub fn segment(input: Vec<u8>, k: usize, palette: String, seed: Option<u64>) -> Result<Object, JsValue> {
    let js_err = |e: crate::SegmentationError| JsValue::from_str(&e.to_string());

    let mut img = image::load_from_memory(&input)
        .map_err(|e| JsValue::from_str(&format!("Unable to decode image: {e}")))?
        .to_rgb8();

    let kind = if palette.is_empty() {
        None
    } else {
        Some(PaletteKind::from_name(&palette))
    };
    let seed = match seed {
        Some(seed) => seed,
        None => crate::segment::random_seed().map_err(js_err)?,
    };

    let config = SegmentConfig::new(k, kind, seed);
    let segmentation = segment_image(&mut img, &config).map_err(js_err)?;
    let encoded = encode_png(&img).map_err(js_err)?;
    let classification = segmentation.classification.to_json().map_err(js_err)?;

    let palette_js = Array::new();
    for hex in segmentation.palette.to_hex() {
        palette_js.push(&JsValue::from_str(&hex));
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("image"), &Uint8Array::from(encoded.as_slice()))?;
    Reflect::set(&result, &JsValue::from_str("palette"), &palette_js)?;
    Reflect::set(&result, &JsValue::from_str("classification"), &JsValue::from_str(&classification))?;
    if let Some(ratio) = segmentation.classification.cloud_coverage {
        Reflect::set(&result, &JsValue::from_str("coverage"), &JsValue::from_f64(ratio))?;
    }

    Ok(result)
}
