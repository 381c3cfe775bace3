//! Crop encoding: padded region of a page → base64 PNG string.
//!
//! The crop is taken from the original (colour) page image, not the
//! grayscale copy handed to the decoder, and written as PNG so the preview
//! is lossless. Standard base64 with padding keeps it embeddable in JSON
//! and in `data:image/png;base64,` URIs.

use crate::output::Rect;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Crop `region` out of `img` and encode it as a base64 PNG.
///
/// `region` must lie inside the image (see
/// [`crate::pipeline::geometry::padded_crop_rect`]). An empty region is an
/// error: PNG cannot represent a zero-sized image.
pub fn encode_crop(img: &DynamicImage, region: &Rect) -> Result<String, image::ImageError> {
    if region.is_empty() {
        return Err(image::ImageError::Parameter(
            image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ),
        ));
    }

    let crop = img.crop_imm(region.x, region.y, region.width, region.height);
    let crop = match crop {
        // PNG has no floating-point sample formats.
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb8(crop.to_rgb8()),
        DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba8(crop.to_rgba8()),
        other => other,
    };

    let mut buf = Vec::new();
    crop.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} crop → {} bytes base64",
        region.width,
        region.height,
        b64.len()
    );
    Ok(b64)
}
