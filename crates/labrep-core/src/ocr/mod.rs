//! OCR boundary.
//!
//! The extraction core only consumes text. Engines implement
//! [`TextRecognizer`] and are created once by the caller, then passed by
//! reference to whatever needs them.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::{PureOcrEngine, create_engine_from_dir};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use image::DynamicImage;

/// Capability to turn an image into text.
pub trait TextRecognizer: Send + Sync {
    /// Engine identifier used in logs.
    fn name(&self) -> &'static str;

    /// Recognize text in a decoded image.
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError>;

    /// Decode image bytes (any format the `image` crate detects) and recognize them.
    fn recognize_bytes(&self, bytes: &[u8]) -> Result<OcrResult, OcrError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;
        self.recognize(&image)
    }

    /// Open an image file and recognize it.
    fn recognize_file(&self, path: &Path) -> crate::Result<OcrResult> {
        let image = image::open(path)?;
        Ok(self.recognize(&image)?)
    }
}

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Full text (boxes joined with newlines).
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Build a result from unordered boxes, sorting them into reading order.
    pub fn from_boxes(
        mut boxes: Vec<TextBox>,
        row_tolerance: f32,
        image_size: (u32, u32),
        processing_time_ms: u64,
    ) -> Self {
        sort_by_reading_order(&mut boxes, row_tolerance);
        let text = boxes
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            boxes,
            text,
            processing_time_ms,
            image_size,
        }
    }
}

/// Sort boxes top-to-bottom, then left-to-right within a row.
///
/// Boxes whose top edges fall in the same `row_tolerance` band share a row.
pub fn sort_by_reading_order(boxes: &mut [TextBox], row_tolerance: f32) {
    let tolerance = if row_tolerance > 0.0 { row_tolerance } else { 1.0 };

    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();

        let row_a = (ay / tolerance) as i32;
        let row_b = (by / tolerance) as i32;

        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}
