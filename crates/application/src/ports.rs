use std::path::Path;

use fotolab_domain::{
    AnalysisReport, ColorMatrix, DecodedImage, EditInstruction, PreviewFrame, PreviewMetrics,
    PreviewRequest,
};

use crate::ApplicationError;

/// Best-effort camera/capture record. Every field is optional and the
/// default value is the empty record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureMetadata {
    pub make: Option<String>,
    pub model: Option<String>,
    pub date_time_original: Option<String>,
    pub modify_date: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub orientation: Option<u16>,
    pub iso: Option<u32>,
    /// Formatted exposure, e.g. `1/250` for sub-second values.
    pub exposure_time: Option<String>,
    /// Rounded to one decimal place.
    pub f_number: Option<f32>,
    /// Rounded to whole millimetres.
    pub focal_length_mm: Option<u32>,
    pub lens_model: Option<String>,
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
}

impl CaptureMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg { quality: u8 },
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub source_path: String,
    pub matrix: ColorMatrix,
    pub format: ExportFormat,
    /// When set, the encoded bytes are also written to this path.
    pub output_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
    pub output_path: Option<String>,
}

pub trait ImageDecoder {
    fn decode_for_preview(&self, path: &Path) -> Result<DecodedImage, ApplicationError>;
}

/// Metadata boundary. Implementations return `Ok` with a possibly-empty
/// record for absent or corrupt metadata; only file I/O may fail.
pub trait MetadataReader {
    fn read_metadata(&self, path: &Path) -> Result<CaptureMetadata, ApplicationError>;
}

/// AI boundary: image analysis and natural-language edit translation.
pub trait EditAnalyzer {
    fn analyze_image(
        &self,
        image_path: &Path,
        prompt: &str,
    ) -> Result<AnalysisReport, ApplicationError>;

    fn edits_from_prompt(&self, prompt: &str) -> Result<Vec<EditInstruction>, ApplicationError>;
}

/// Renderer boundary: fire-and-forget submission, polled frames.
pub trait PreviewPipeline {
    fn submit_preview(&self, request: PreviewRequest) -> Result<(), ApplicationError>;

    fn try_receive_preview(&self) -> Result<Option<PreviewFrame>, ApplicationError>;

    fn metrics(&self) -> Result<PreviewMetrics, ApplicationError>;
}

/// Export boundary: bake the matrix into the source image and encode it.
pub trait ImageExporter {
    fn export(&self, request: &ExportRequest) -> Result<ExportArtifact, ApplicationError>;
}

pub trait Clock {
    fn now_timestamp_string(&self) -> String;
}
