//! HTTP server binary for barscan.
//!
//! Routes:
//! - `POST /detect` — multipart upload (field `file`) → detection JSON
//! - `GET  /health` — static liveness payload
//!
//! Status-code and body decisions live in `barscan::service`; this file only
//! wires them to axum.

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use barscan::service::{self, ErrorBody, FormField, ServiceError};
use barscan::{decoder_from_name, DetectionConfig, DetectionResponse, PageFailurePolicy};
use clap::builder::PossibleValuesParser;
use clap::Parser;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Barcode detection HTTP service.
#[derive(Parser, Debug)]
#[command(name = "barscan-server", version, about = "Barcode detection HTTP service")]
struct Cli {
    /// Interface to bind.
    #[arg(long, env = "BARSCAN_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "BARSCAN_PORT", default_value_t = 8000)]
    port: u16,

    /// Maximum upload size in MiB.
    #[arg(long, env = "BARSCAN_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,

    /// Rendering DPI for PDF pages (72–600).
    #[arg(long, env = "BARSCAN_DPI", default_value_t = barscan::DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Maximum number of PDF pages to scan per upload.
    #[arg(long, env = "BARSCAN_MAX_PAGES", default_value_t = barscan::DEFAULT_MAX_PAGES)]
    max_pages: usize,

    /// Crop margin as a fraction of the symbol's shorter side.
    #[arg(long, env = "BARSCAN_PADDING", default_value_t = barscan::DEFAULT_PADDING_RATIO)]
    padding: f64,

    /// Symbol decoder backend (`rqrr` needs the `rqrr` feature).
    #[arg(
        long,
        env = "BARSCAN_DECODER",
        default_value = "rxing",
        value_parser = PossibleValuesParser::new(barscan::DECODER_NAMES.iter().copied())
    )]
    decoder: String,

    /// Report failed pages in the response instead of failing the request.
    #[arg(long, env = "BARSCAN_SKIP_FAILED_PAGES")]
    skip_failed_pages: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BARSCAN_VERBOSE")]
    verbose: bool,
}

#[derive(Clone)]
struct AppState {
    config: Arc<DetectionConfig>,
}

/// axum rendering of a [`ServiceError`].
struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.body)).into_response()
    }
}

fn bad_request(detail: String) -> ApiError {
    ApiError(ServiceError {
        status: 400,
        body: ErrorBody { detail },
    })
}

async fn detect_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DetectionResponse>, ApiError> {
    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Malformed upload: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("Failed to read upload: {e}")))?;
        fields.push(FormField {
            name,
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    let upload = service::select_upload(fields);
    let response = service::handle_detect(upload, &state.config).await?;
    Ok(Json(response))
}

async fn health_handler() -> Json<service::HealthStatus> {
    Json(service::health())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let policy = if cli.skip_failed_pages {
        PageFailurePolicy::Skip
    } else {
        PageFailurePolicy::Abort
    };
    let config = DetectionConfig::builder()
        .dpi(cli.dpi)
        .max_pages(cli.max_pages)
        .padding_ratio(cli.padding)
        .page_failure(policy)
        .decoder(decoder_from_name(&cli.decoder)?)
        .build()
        .context("Invalid configuration")?;
    info!("Detection config: {:?}", config);

    let state = AppState {
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/detect", post(detect_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(cli.max_upload_mb * 1024 * 1024))
        .with_state(state);

    // ── Serve ────────────────────────────────────────────────────────────
    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", cli.host, cli.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
