//! Per-page processing: decoder output → annotated detection records.
//!
//! For one page image this runs, in order:
//!
//! 1. the [`SymbolDecoder`] on a grayscale copy of the page,
//! 2. [`dedup_detections`] with a seen-set local to this page,
//! 3. for each survivor, [`padded_crop_rect`] + [`encode_crop`] and
//!    [`classify_location`],
//!
//! and numbers the survivors densely from 0.

use crate::error::PageError;
use crate::output::DetectionRecord;
use crate::pipeline::decode::SymbolDecoder;
use crate::pipeline::encode::encode_crop;
use crate::pipeline::geometry::{classify_location, padded_crop_rect};
use crate::pipeline::normalize::dedup_detections;
use image::DynamicImage;
use tracing::debug;

/// Detect, deduplicate and annotate every symbol on one page.
///
/// `page_num` is 1-based and copied into every record.
pub fn process_page(
    image: &DynamicImage,
    page_num: usize,
    decoder: &dyn SymbolDecoder,
    padding_ratio: f64,
) -> Result<Vec<DetectionRecord>, PageError> {
    let (width, height) = (image.width(), image.height());
    let gray = image.to_luma8();

    let raw = decoder
        .decode(&gray)
        .map_err(|detail| PageError::DecodeFailed {
            page: page_num,
            detail,
        })?;
    let found = raw.len();
    let unique = dedup_detections(raw);
    debug!(
        "Page {}: {} symbols decoded, {} after dedup ({})",
        page_num,
        found,
        unique.len(),
        decoder.name()
    );

    unique
        .into_iter()
        .enumerate()
        .map(|(index, (data, det))| {
            let crop = padded_crop_rect(&det.rect, width, height, padding_ratio);
            let image_base64 =
                encode_crop(image, &crop).map_err(|e| PageError::CropEncodeFailed {
                    page: page_num,
                    index,
                    detail: e.to_string(),
                })?;

            Ok(DetectionRecord {
                index,
                symbol_type: det.symbol_type,
                data,
                rect: det.rect,
                location: classify_location(&det.rect, width, height),
                image_base64,
                quality: det.quality,
                page: page_num,
            })
        })
        .collect()
}
