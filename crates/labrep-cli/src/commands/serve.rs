//! Serve command - HTTP front end for report extraction.
//!
//! `POST /extract` takes OCR text, `POST /upload` takes raw image bytes.
//! Both answer with the report JSON; OCR problems are reported as HTTP
//! errors, never as a report full of "Not found".

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Args;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use labrep_core::{OcrError, ReportParser, ReportResult, TextRecognizer};

use super::{build_parser, load_config, load_engine};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind (default from config)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (default from config)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Serve text extraction only, without loading OCR models
    #[arg(long)]
    no_ocr: bool,
}

/// State shared by all handlers.
#[derive(Clone)]
pub struct ServeState {
    parser: Arc<ReportParser>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl ServeState {
    pub fn new(parser: ReportParser, recognizer: Option<Arc<dyn TextRecognizer>>) -> Self {
        Self {
            parser: Arc::new(parser),
            recognizer,
        }
    }
}

/// Failures at the HTTP boundary.
#[derive(Debug)]
pub enum ServeError {
    /// Server runs without an OCR engine.
    OcrUnavailable,
    /// The upload is not a decodable image.
    InvalidImage(String),
    /// The OCR engine failed.
    Ocr(String),
}

impl From<OcrError> for ServeError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::InvalidImage(reason) => ServeError::InvalidImage(reason),
            other => ServeError::Ocr(other.to_string()),
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServeError::OcrUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "OCR engine not available.")
            }
            ServeError::InvalidImage(_) => (StatusCode::BAD_REQUEST, "Unsupported image data."),
            ServeError::Ocr(_) => (StatusCode::INTERNAL_SERVER_ERROR, "OCR processing failed."),
        };
        (status, message).into_response()
    }
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let parser = build_parser(&config)?;

    let recognizer: Option<Arc<dyn TextRecognizer>> = if args.no_ocr {
        None
    } else {
        match load_engine(args.model_dir.as_deref(), &config) {
            Ok(engine) => Some(Arc::new(engine)),
            Err(e) => {
                warn!("{}; /upload will answer 503", e);
                None
            }
        }
    };

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;

    let app = build_router(ServeState::new(parser, recognizer), config.server.max_body_bytes);

    info!("Running on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router with all endpoints.
pub fn build_router(state: ServeState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/extract", post(extract_text))
        .route("/upload", post(upload_image))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Handler for `POST /extract`: body is OCR text.
pub async fn extract_text(State(state): State<ServeState>, body: String) -> Json<ReportResult> {
    let result = state.parser.parse(&body);
    info!(
        "POST /extract: {} bytes, {} fields matched",
        body.len(),
        result.matches.len()
    );
    Json(result.report)
}

/// Handler for `POST /upload`: the request body is the raw image file
/// (PNG, JPEG, TIFF, ...), not a multipart form. A multipart body is not a
/// decodable image, so form-upload clients get `400 Unsupported image data.`
pub async fn upload_image(
    State(state): State<ServeState>,
    body: Bytes,
) -> Result<Json<ReportResult>, ServeError> {
    let Some(recognizer) = state.recognizer.clone() else {
        return Err(ServeError::OcrUnavailable);
    };

    let ocr = tokio::task::spawn_blocking(move || recognizer.recognize_bytes(&body))
        .await
        .map_err(|e| ServeError::Ocr(e.to_string()))?
        .map_err(|e| {
            error!("OCR error: {}", e);
            ServeError::from(e)
        })?;

    let result = state.parser.parse(&ocr.text);
    info!(
        "POST /upload: OCR {}ms, {} fields matched",
        ocr.processing_time_ms,
        result.matches.len()
    );
    Ok(Json(result.report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use labrep_core::{ExtractedField, OcrResult};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    struct StubRecognizer(&'static str);

    impl TextRecognizer for StubRecognizer {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
            Ok(OcrResult {
                boxes: Vec::new(),
                text: self.0.to_string(),
                processing_time_ms: 1,
                image_size: (image.width(), image.height()),
            })
        }
    }

    struct FailingRecognizer;

    impl TextRecognizer for FailingRecognizer {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn recognize(&self, _image: &DynamicImage) -> Result<OcrResult, OcrError> {
            Err(OcrError::Recognition("engine crashed".to_string()))
        }
    }

    fn png_bytes() -> Bytes {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(4, 4)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        Bytes::from(buf.into_inner())
    }

    fn state_with(recognizer: Option<Arc<dyn TextRecognizer>>) -> ServeState {
        ServeState::new(ReportParser::new(), recognizer)
    }

    #[tokio::test]
    async fn test_extract_text() {
        let body = "REPORTED : 12/11/2022\nCREATININE 0.9 0.6-1.3 mg/dL".to_string();
        let Json(report) = extract_text(State(state_with(None)), body).await;

        assert_eq!(report.reported_date, ExtractedField::found("12/11/2022"));
        assert_eq!(report.month, ExtractedField::found("november"));
        assert_eq!(report.serum_creatinine, ExtractedField::found("0.9"));
    }

    #[tokio::test]
    async fn test_upload_runs_ocr() {
        let state = state_with(Some(Arc::new(StubRecognizer(
            "Reported Date: 05/03/2024\nCreatinine- Serum 1.2",
        ))));

        let Json(report) = upload_image(State(state), png_bytes()).await.unwrap();
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "reportedDate": "05/03/2024",
                "month": "march",
                "serumCreatinine": "1.2"
            })
        );
    }

    #[tokio::test]
    async fn test_upload_with_no_matches_is_success() {
        let state = state_with(Some(Arc::new(StubRecognizer("illegible"))));

        let Json(report) = upload_image(State(state), png_bytes()).await.unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_upload_ocr_failure_is_500() {
        let state = state_with(Some(Arc::new(FailingRecognizer)));

        let err = upload_image(State(state), png_bytes()).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_upload_garbage_is_400() {
        let state = state_with(Some(Arc::new(StubRecognizer(""))));

        let err = upload_image(State(state), Bytes::from_static(b"plain text"))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_multipart_body_is_400() {
        let state = state_with(Some(Arc::new(StubRecognizer(""))));
        let body = b"--boundary\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"r.png\"\r\n\r\n\x89PNG\r\n--boundary--\r\n";

        let err = upload_image(State(state), Bytes::from_static(body))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_without_engine_is_503() {
        let err = upload_image(State(state_with(None)), png_bytes()).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
