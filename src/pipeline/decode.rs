//! Symbol decoding: the pluggable boundary between page pixels and payloads.
//!
//! Turning pixels into `(symbology, payload, rectangle)` tuples is delegated
//! to a [`SymbolDecoder`] backend. The rest of the pipeline only ever sees
//! [`RawDetection`] values, so backends can be swapped without touching
//! dedup, geometry or assembly.
//!
//! ## Backends
//!
//! | Backend | Feature | Symbologies | Payload |
//! |---------|---------|-------------|---------|
//! | [`RxingDecoder`] | always | QR, Data Matrix, Aztec, PDF417, EAN/UPC, Code 39/93/128, ITF, Codabar | decoded text |
//! | `RqrrDecoder` | `rqrr` | QR | raw bytes (may be non-UTF-8) |
//!
//! Backends return an empty vector, not an error, when a page simply has no
//! codes on it.

use crate::error::BarcodeError;
use crate::output::Rect;
use image::GrayImage;
use rxing::{BarcodeFormat, Exceptions, RXingResult};
use std::sync::Arc;
use tracing::debug;

/// Backend names accepted by [`decoder_from_name`].
pub const DECODER_NAMES: &[&str] = &["rxing", "rqrr"];

/// One symbol as reported by a decoder, before normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Symbology name, e.g. `QRCODE`, `EAN13`, `CODE128`.
    pub symbol_type: String,
    /// Payload bytes exactly as decoded.
    pub payload: Vec<u8>,
    /// Bounding rectangle in page pixel coordinates.
    pub rect: Rect,
    /// Backend-specific confidence, if any.
    pub quality: Option<f64>,
}

/// A barcode/QR decoding backend.
///
/// Implementations must be `Send + Sync`: one decoder instance is shared by
/// every request the service handles.
pub trait SymbolDecoder: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Find every symbol on a grayscale page image.
    ///
    /// Errors are backend failures, described as a human-readable string;
    /// "nothing found" is `Ok(vec![])`.
    fn decode(&self, image: &GrayImage) -> Result<Vec<RawDetection>, String>;
}

/// Look up a decoder backend by name (case-insensitive).
///
/// `rqrr` is only available when the crate is built with the `rqrr` feature.
pub fn decoder_from_name(name: &str) -> Result<Arc<dyn SymbolDecoder>, BarcodeError> {
    match name.to_ascii_lowercase().as_str() {
        "rxing" => Ok(Arc::new(RxingDecoder)),
        #[cfg(feature = "rqrr")]
        "rqrr" => Ok(Arc::new(RqrrDecoder)),
        #[cfg(not(feature = "rqrr"))]
        "rqrr" => Err(BarcodeError::InvalidConfig(
            "the rqrr decoder is not compiled in; rebuild with --features rqrr".to_string(),
        )),
        other => Err(BarcodeError::InvalidConfig(format!(
            "unknown decoder '{}' (expected one of: {})",
            other,
            DECODER_NAMES.join(", ")
        ))),
    }
}

// ── rxing ────────────────────────────────────────────────────────────────

/// Multi-format decoder backed by [`rxing`].
///
/// Linear symbologies report only the two end points of the scan line, so
/// the rectangle is the bounding box of the result points widened to at
/// least one pixel in each direction.
#[derive(Debug, Default, Clone, Copy)]
pub struct RxingDecoder;

impl SymbolDecoder for RxingDecoder {
    fn name(&self) -> &'static str {
        "rxing"
    }

    fn decode(&self, image: &GrayImage) -> Result<Vec<RawDetection>, String> {
        let (width, height) = image.dimensions();
        let luma = image.as_raw().clone();

        let results = match rxing::helpers::detect_multiple_in_luma(luma, width, height) {
            Ok(results) => results,
            Err(Exceptions::NotFoundException(_)) => Vec::new(),
            Err(e) => return Err(e.to_string()),
        };

        let detections: Vec<RawDetection> = results
            .iter()
            .map(|r| rxing_detection(r, width, height))
            .collect();
        debug!("rxing: {} symbols on {}x{} page", detections.len(), width, height);
        Ok(detections)
    }
}

fn rxing_detection(result: &RXingResult, width: u32, height: u32) -> RawDetection {
    let points: Vec<(f32, f32)> = result.getPoints().iter().map(|p| (p.x, p.y)).collect();
    RawDetection {
        symbol_type: symbology_name(result.getBarcodeFormat()),
        payload: result.getText().as_bytes().to_vec(),
        rect: bounding_rect(&points, width, height),
        quality: None,
    }
}

/// zbar-style symbology names, which is what upstream consumers key on.
fn symbology_name(format: &BarcodeFormat) -> String {
    let name = match format {
        BarcodeFormat::QR_CODE => "QRCODE",
        BarcodeFormat::DATA_MATRIX => "DATAMATRIX",
        BarcodeFormat::AZTEC => "AZTEC",
        BarcodeFormat::PDF_417 => "PDF417",
        BarcodeFormat::EAN_13 => "EAN13",
        BarcodeFormat::EAN_8 => "EAN8",
        BarcodeFormat::UPC_A => "UPCA",
        BarcodeFormat::UPC_E => "UPCE",
        BarcodeFormat::CODE_39 => "CODE39",
        BarcodeFormat::CODE_93 => "CODE93",
        BarcodeFormat::CODE_128 => "CODE128",
        BarcodeFormat::ITF => "I25",
        BarcodeFormat::CODABAR => "CODABAR",
        other => return format!("{other:?}"),
    };
    name.to_string()
}

/// Integer bounding box of decoder result points, clipped to the image.
pub(crate) fn bounding_rect(points: &[(f32, f32)], width: u32, height: u32) -> Rect {
    if points.is_empty() || width == 0 || height == 0 {
        return Rect::default();
    }

    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
    for &(x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    let clamp = |v: f32, hi: u32| -> u32 { v.max(0.0).min(hi as f32) as u32 };
    let x0 = clamp(min_x.floor(), width - 1);
    let y0 = clamp(min_y.floor(), height - 1);
    let x1 = clamp(max_x.ceil(), width).max(x0 + 1);
    let y1 = clamp(max_y.ceil(), height).max(y0 + 1);

    Rect::new(x0, y0, x1 - x0, y1 - y0)
}

// ── rqrr ─────────────────────────────────────────────────────────────────

/// QR-only decoder backed by [`rqrr`], reporting the raw payload bytes.
///
/// Grids that are located but fail error correction are dropped.
#[cfg(feature = "rqrr")]
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

#[cfg(feature = "rqrr")]
impl SymbolDecoder for RqrrDecoder {
    fn name(&self) -> &'static str {
        "rqrr"
    }

    fn decode(&self, image: &GrayImage) -> Result<Vec<RawDetection>, String> {
        let (width, height) = image.dimensions();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| image.get_pixel(x as u32, y as u32).0[0],
        );

        let mut detections = Vec::new();
        for grid in prepared.detect_grids() {
            let mut payload = Vec::new();
            if let Err(e) = grid.decode_to(&mut payload) {
                debug!("rqrr: skipping undecodable grid: {}", e);
                continue;
            }
            let points: Vec<(f32, f32)> = grid
                .bounds
                .iter()
                .map(|p| (p.x as f32, p.y as f32))
                .collect();
            detections.push(RawDetection {
                symbol_type: "QRCODE".to_string(),
                payload,
                rect: bounding_rect(&points, width, height),
                quality: None,
            });
        }
        debug!("rqrr: {} symbols on {}x{} page", detections.len(), width, height);
        Ok(detections)
    }
}
