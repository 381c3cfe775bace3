//! HTTP boundary: status codes and JSON bodies for the detection service.
//!
//! This module is transport-agnostic. It decides *what* a request returns;
//! the `barscan-server` binary only moves bytes between axum and these
//! functions. Error bodies use the `{"detail": "..."}` shape the upstream
//! client already parses.
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | success (including "no codes") | 200 | [`DetectionResponse`] |
//! | [`BarcodeError::is_client_error`] | 400 | `{"detail": <error message>}` |
//! | anything else | 500 | `{"detail": "Unexpected error: <short message>"}` |

use crate::config::DetectionConfig;
use crate::detect::detect;
use crate::error::BarcodeError;
use crate::output::DetectionResponse;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "file";

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "barcode-detection";

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

/// Static liveness payload.
pub fn health() -> HealthStatus {
    HealthStatus {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    }
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// A failed request, ready to be rendered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub status: u16,
    pub body: ErrorBody,
}

impl From<BarcodeError> for ServiceError {
    fn from(err: BarcodeError) -> Self {
        if err.is_client_error() {
            warn!("Rejected upload: {}", err);
            ServiceError {
                status: 400,
                body: ErrorBody {
                    detail: err.to_string(),
                },
            }
        } else {
            error!("Detection failed: {}", err);
            ServiceError {
                status: 500,
                body: ErrorBody {
                    detail: format!("Unexpected error: {}", first_line(&err.to_string())),
                },
            }
        }
    }
}

/// Keep server-side diagnostics to one line; hints for operators stay in the logs.
fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or(s)
}

/// One part of a multipart form as read by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: Option<String>,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Pick the upload out of a multipart form.
///
/// The first part named [`UPLOAD_FIELD`] wins; other parts are ignored.
/// Returns `(original filename, contents)`.
pub fn select_upload(
    fields: impl IntoIterator<Item = FormField>,
) -> Option<(Option<String>, Vec<u8>)> {
    fields
        .into_iter()
        .find(|f| f.name.as_deref() == Some(UPLOAD_FIELD))
        .map(|f| (f.file_name, f.bytes))
}

/// Handle `POST /detect` once the multipart body has been read.
///
/// `upload` is `None` when the request had no `file` field.
pub async fn handle_detect(
    upload: Option<(Option<String>, Vec<u8>)>,
    config: &DetectionConfig,
) -> Result<DetectionResponse, ServiceError> {
    let (filename, bytes) = upload.ok_or_else(|| BarcodeError::MissingUpload {
        field: UPLOAD_FIELD.to_string(),
    })?;
    Ok(detect(bytes, filename, config).await?)
}
