mod error;
mod ports;
mod service;
mod use_cases;

pub use error::ApplicationError;
pub use ports::{
    CaptureMetadata, Clock, EditAnalyzer, ExportArtifact, ExportFormat, ExportRequest,
    ImageDecoder, ImageExporter, MetadataReader, PreviewPipeline,
};
pub use service::{EditorService, HistoryState, LoadedImage};
pub use use_cases::{
    ApplyEditsCommand, ApplyPromptCommand, ExportImageCommand, OpenImageCommand,
    PollPreviewCommand, PreviewMetricsQuery, RedoCommand, SuggestEditsCommand, UndoCommand,
};
