//! Configuration types for barcode detection.
//!
//! All detection behaviour is controlled through [`DetectionConfig`], built
//! via its [`DetectionConfigBuilder`]. The defaults reproduce the service's
//! documented behaviour: 300 DPI rasterisation, at most 3 PDF pages, and a
//! crop margin of 10 % of the symbol's shorter side.

use crate::error::BarcodeError;
use crate::pipeline::decode::{RxingDecoder, SymbolDecoder};
use crate::pipeline::render::{PdfiumRasterizer, Rasterizer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Rendering DPI for PDF pages.
pub const DEFAULT_DPI: u32 = 300;

/// Maximum number of PDF pages that are rasterised and scanned.
pub const DEFAULT_MAX_PAGES: usize = 3;

/// Crop margin as a fraction of the symbol's shorter side.
pub const DEFAULT_PADDING_RATIO: f64 = 0.1;

/// Configuration for a detection request.
///
/// Built via [`DetectionConfig::builder()`] or using
/// [`DetectionConfig::default()`].
///
/// # Example
/// ```rust
/// use barscan::{DetectionConfig, PageFailurePolicy};
///
/// let config = DetectionConfig::builder()
///     .dpi(200)
///     .max_pages(5)
///     .page_failure(PageFailurePolicy::Skip)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_pages, 5);
/// ```
#[derive(Clone)]
pub struct DetectionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 300.
    ///
    /// Dense 1D barcodes need roughly 2 px per module to decode reliably;
    /// 300 DPI covers barcodes printed at common label sizes.
    pub dpi: u32,

    /// Number of leading PDF pages to scan. Default: 3.
    ///
    /// Pages after the cap are never rendered or decoded. This bounds the
    /// worst-case latency of a request; it is not reported as an error.
    pub max_pages: usize,

    /// Crop margin around each symbol, as a fraction of its shorter side. Default: 0.1.
    pub padding_ratio: f64,

    /// What to do when one page fails to decode. Default: [`PageFailurePolicy::Abort`].
    pub page_failure: PageFailurePolicy,

    /// Pre-constructed decoder backend. `None` uses [`RxingDecoder`].
    pub decoder: Option<Arc<dyn SymbolDecoder>>,

    /// Pre-constructed rasterizer. `None` uses [`PdfiumRasterizer`].
    pub rasterizer: Option<Arc<dyn Rasterizer>>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            max_pages: DEFAULT_MAX_PAGES,
            padding_ratio: DEFAULT_PADDING_RATIO,
            page_failure: PageFailurePolicy::default(),
            decoder: None,
            rasterizer: None,
        }
    }
}

impl fmt::Debug for DetectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionConfig")
            .field("dpi", &self.dpi)
            .field("max_pages", &self.max_pages)
            .field("padding_ratio", &self.padding_ratio)
            .field("page_failure", &self.page_failure)
            .field("decoder", &self.decoder.as_ref().map(|d| d.name()))
            .field("rasterizer", &self.rasterizer.as_ref().map(|r| r.name()))
            .finish()
    }
}

impl DetectionConfig {
    /// Create a new builder for `DetectionConfig`.
    pub fn builder() -> DetectionConfigBuilder {
        DetectionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured decoder, or the default backend.
    pub fn resolve_decoder(&self) -> Arc<dyn SymbolDecoder> {
        match self.decoder {
            Some(ref d) => Arc::clone(d),
            None => Arc::new(RxingDecoder),
        }
    }

    /// The configured rasterizer, or the pdfium backend.
    pub fn resolve_rasterizer(&self) -> Arc<dyn Rasterizer> {
        match self.rasterizer {
            Some(ref r) => Arc::clone(r),
            None => Arc::new(PdfiumRasterizer::from_env()),
        }
    }
}

/// Builder for [`DetectionConfig`].
#[derive(Debug)]
pub struct DetectionConfigBuilder {
    config: DetectionConfig,
}

impl DetectionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = n;
        self
    }

    pub fn padding_ratio(mut self, ratio: f64) -> Self {
        self.config.padding_ratio = ratio;
        self
    }

    pub fn page_failure(mut self, policy: PageFailurePolicy) -> Self {
        self.config.page_failure = policy;
        self
    }

    pub fn decoder(mut self, decoder: Arc<dyn SymbolDecoder>) -> Self {
        self.config.decoder = Some(decoder);
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.config.rasterizer = Some(rasterizer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DetectionConfig, BarcodeError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(BarcodeError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.max_pages == 0 {
            return Err(BarcodeError::InvalidConfig(
                "max_pages must be ≥ 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&c.padding_ratio) {
            return Err(BarcodeError::InvalidConfig(format!(
                "padding ratio must be within 0.0–1.0, got {}",
                c.padding_ratio
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Behaviour when a single page fails during decoding or crop extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFailurePolicy {
    /// Fail the whole request with the first page error. (default)
    #[default]
    Abort,
    /// Drop the failed page's codes, keep the other pages, and list the
    /// failure in [`crate::output::DetectionResponse::errors`].
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let c = DetectionConfig::default();
        assert_eq!(c.dpi, 300);
        assert_eq!(c.max_pages, 3);
        assert!((c.padding_ratio - 0.1).abs() < f64::EPSILON);
        assert_eq!(c.page_failure, PageFailurePolicy::Abort);
        assert!(c.decoder.is_none());
        assert!(c.rasterizer.is_none());
    }

    #[test]
    fn test_dpi_is_clamped() {
        let c = DetectionConfig::builder().dpi(10_000).build().unwrap();
        assert_eq!(c.dpi, 600);
        let c = DetectionConfig::builder().dpi(1).build().unwrap();
        assert_eq!(c.dpi, 72);
    }

    #[test]
    fn test_zero_pages_rejected() {
        let err = DetectionConfig::builder().max_pages(0).build().unwrap_err();
        assert!(matches!(err, BarcodeError::InvalidConfig(_)));
    }

    #[test]
    fn test_padding_out_of_range_rejected() {
        assert!(DetectionConfig::builder().padding_ratio(-0.1).build().is_err());
        assert!(DetectionConfig::builder().padding_ratio(1.5).build().is_err());
        assert!(DetectionConfig::builder().padding_ratio(f64::NAN).build().is_err());
        assert!(DetectionConfig::builder().padding_ratio(0.0).build().is_ok());
    }

    #[test]
    fn test_default_decoder_is_rxing() {
        let c = DetectionConfig::default();
        assert_eq!(c.resolve_decoder().name(), "rxing");
    }

    #[test]
    fn test_debug_names_backends() {
        let c = DetectionConfig::builder()
            .decoder(Arc::new(RxingDecoder))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("rxing"), "got: {dbg}");
    }

    #[test]
    fn test_policy_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&PageFailurePolicy::Skip).unwrap(), "\"skip\"");
    }
}
