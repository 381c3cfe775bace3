//! PDF rasterisation: render the leading pages of a document to images.
//!
//! [`Rasterizer`] is the capability the pipeline consumes;
//! [`PdfiumRasterizer`] implements it with `pdfium-render`. Calls are
//! blocking and CPU-bound; the async entry points in [`crate::detect`] run
//! the whole pipeline inside `tokio::task::spawn_blocking`.
//!
//! Only the first `max_pages` pages are rendered. The remaining pages are
//! never touched, which keeps the cost of a 500-page upload the same as a
//! 3-page one.

use crate::error::BarcodeError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// PDF points per inch; pdfium page sizes are expressed in points.
const POINTS_PER_INCH: f32 = 72.0;

/// Parameters for one rasterisation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    /// Target resolution.
    pub dpi: u32,
    /// Render at most this many leading pages.
    pub max_pages: usize,
}

/// Turns paginated document bytes into one raster image per page.
pub trait Rasterizer: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Render pages in document order, stopping after `options.max_pages`.
    ///
    /// Unreadable documents are reported as
    /// [`BarcodeError::DocumentDecodeFailed`].
    fn rasterize(
        &self,
        bytes: &[u8],
        options: &RasterOptions,
    ) -> Result<Vec<DynamicImage>, BarcodeError>;
}

/// [`Rasterizer`] backed by the pdfium library.
///
/// Binds to `library_path` when set, otherwise to the system libpdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library_path: Option<PathBuf>,
}

impl PdfiumRasterizer {
    /// Bind to the pdfium library in the given directory (or file).
    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    /// Honour `PDFIUM_LIB_PATH` when set.
    pub fn from_env() -> Self {
        match std::env::var_os("PDFIUM_LIB_PATH") {
            Some(p) if !p.is_empty() => Self::with_library_path(p),
            _ => Self::default(),
        }
    }

    fn bind(&self) -> Result<Pdfium, BarcodeError> {
        let bindings = match self.library_path {
            Some(ref path) => {
                let lib = if path.is_dir() {
                    Pdfium::pdfium_platform_library_name_at_path(path)
                } else {
                    path.clone()
                };
                Pdfium::bind_to_library(lib)
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| BarcodeError::PdfiumBindingFailed(format!("{:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    fn rasterize(
        &self,
        bytes: &[u8],
        options: &RasterOptions,
    ) -> Result<Vec<DynamicImage>, BarcodeError> {
        let pdfium = self.bind()?;

        let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(|e| {
            BarcodeError::DocumentDecodeFailed {
                detail: format!("{:?}", e),
            }
        })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        let wanted = total_pages.min(options.max_pages);
        info!(
            "PDF loaded: {} pages, rendering {} at {} DPI",
            total_pages, wanted, options.dpi
        );

        let render_config =
            PdfRenderConfig::new().scale_page_by_factor(options.dpi as f32 / POINTS_PER_INCH);

        let mut images = Vec::with_capacity(wanted);
        for idx in 0..wanted {
            let page = pages
                .get(idx as u16)
                .map_err(|e| BarcodeError::DocumentDecodeFailed {
                    detail: format!("page {}: {:?}", idx + 1, e),
                })?;

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                BarcodeError::DocumentDecodeFailed {
                    detail: format!("page {}: rasterisation failed: {:?}", idx + 1, e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_library_path_is_kept() {
        let r = PdfiumRasterizer::with_library_path("/opt/pdfium/lib");
        assert_eq!(r.library_path, Some(PathBuf::from("/opt/pdfium/lib")));
        assert_eq!(r.name(), "pdfium");
    }

    #[test]
    fn test_missing_library_is_a_binding_error() {
        let r = PdfiumRasterizer::with_library_path("/definitely/not/here/libpdfium.so");
        let err = r
            .rasterize(
                b"%PDF-1.4",
                &RasterOptions {
                    dpi: 300,
                    max_pages: 3,
                },
            )
            .unwrap_err();
        assert!(matches!(err, BarcodeError::PdfiumBindingFailed(_)), "got: {err:?}");
        assert!(!err.is_client_error());
    }
}
