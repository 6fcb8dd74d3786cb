use std::path::Path;

use fotolab_domain::{
    compile_filters, compose, AnalysisReport, ColorFilter, DecodedImage, EditHistory,
    EditInstruction, PreviewFrame, PreviewMetrics, PreviewRequest, SliderValues,
};

use crate::{
    ApplicationError, ApplyEditsCommand, ApplyPromptCommand, CaptureMetadata, Clock, EditAnalyzer,
    ExportArtifact, ExportImageCommand, ExportRequest, ImageDecoder, ImageExporter,
    MetadataReader, OpenImageCommand, PollPreviewCommand, PreviewMetricsQuery, PreviewPipeline,
    RedoCommand, SuggestEditsCommand, UndoCommand,
};

/// The image currently being edited, with its best-effort metadata.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: String,
    pub decoded: DecodedImage,
    pub metadata: CaptureMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryState {
    pub edit_count: usize,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Owns the in-memory edit session: the loaded image plus the edit history.
///
/// Every mutation runs to completion on the calling thread; the preview
/// pipeline is resubmitted after each one so the renderer always reflects
/// the current slider values.
pub struct EditorService {
    decoder: Box<dyn ImageDecoder>,
    metadata: Box<dyn MetadataReader>,
    analyzer: Box<dyn EditAnalyzer>,
    preview: Box<dyn PreviewPipeline>,
    exporter: Box<dyn ImageExporter>,
    clock: Box<dyn Clock>,
    image: Option<LoadedImage>,
    history: EditHistory,
    preview_size: (u32, u32),
}

impl EditorService {
    pub fn new(
        decoder: Box<dyn ImageDecoder>,
        metadata: Box<dyn MetadataReader>,
        analyzer: Box<dyn EditAnalyzer>,
        preview: Box<dyn PreviewPipeline>,
        exporter: Box<dyn ImageExporter>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            decoder,
            metadata,
            analyzer,
            preview,
            exporter,
            clock,
            image: None,
            history: EditHistory::new(),
            preview_size: (0, 0),
        }
    }

    /// Start a fresh session on the given image. Decode failures propagate;
    /// metadata failures degrade to the empty record with a warning.
    pub fn open_image(&mut self, command: OpenImageCommand) -> Result<LoadedImage, ApplicationError> {
        if command.path.trim().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "image path must not be empty".to_string(),
            ));
        }

        let path = Path::new(&command.path);
        let decoded = self.decoder.decode_for_preview(path)?;
        let metadata = match self.metadata.read_metadata(path) {
            Ok(metadata) => metadata,
            Err(error) => {
                log::warn!("metadata extraction failed for {}: {error}", command.path);
                CaptureMetadata::default()
            }
        };

        let loaded = LoadedImage {
            path: command.path,
            decoded,
            metadata,
        };
        self.image = Some(loaded.clone());
        self.history.clear();
        self.preview_size = (command.preview_width, command.preview_height);
        self.resubmit_preview()?;
        Ok(loaded)
    }

    /// Append a batch of instructions as one history entry and refresh the
    /// preview. Returns the resulting slider values.
    pub fn apply_edits(
        &mut self,
        command: ApplyEditsCommand,
    ) -> Result<SliderValues, ApplicationError> {
        for edit in &command.edits {
            edit.validate()?;
        }
        self.history.apply(&command.edits);
        self.resubmit_preview()?;
        Ok(self.history.slider_values())
    }

    /// Step back one history entry. Returns whether anything changed.
    pub fn undo(&mut self, _command: UndoCommand) -> Result<bool, ApplicationError> {
        let applied = self.history.undo();
        if applied {
            self.resubmit_preview()?;
        }
        Ok(applied)
    }

    /// Step forward one history entry. Returns whether anything changed.
    pub fn redo(&mut self, _command: RedoCommand) -> Result<bool, ApplicationError> {
        let applied = self.history.redo();
        if applied {
            self.resubmit_preview()?;
        }
        Ok(applied)
    }

    /// Run the analyzer over the loaded image. The report is returned as-is;
    /// nothing is applied to the history.
    pub fn suggest_edits(
        &self,
        command: SuggestEditsCommand,
    ) -> Result<AnalysisReport, ApplicationError> {
        let image = self.require_image()?;
        self.analyzer
            .analyze_image(Path::new(&image.path), &command.prompt)
    }

    /// Translate a text prompt into instructions and apply them as a single
    /// undo step. Returns the applied instructions.
    pub fn apply_prompt(
        &mut self,
        command: ApplyPromptCommand,
    ) -> Result<Vec<EditInstruction>, ApplicationError> {
        let edits = self.analyzer.edits_from_prompt(&command.prompt)?;
        for edit in &edits {
            edit.validate()?;
        }
        self.history.apply(&edits);
        self.resubmit_preview()?;
        Ok(edits)
    }

    /// Bake the current filters into the source image and encode it. The
    /// default output name is `edited-<timestamp>.<ext>`.
    pub fn export_image(
        &self,
        command: ExportImageCommand,
    ) -> Result<ExportArtifact, ApplicationError> {
        let image = self.require_image()?;
        let matrix = compose(&compile_filters(&self.history.slider_values()));
        let output_path = command.output_path.unwrap_or_else(|| {
            format!(
                "edited-{}.{}",
                self.clock.now_timestamp_string(),
                command.format.extension()
            )
        });

        self.exporter.export(&ExportRequest {
            source_path: image.path.clone(),
            matrix,
            format: command.format,
            output_path: Some(output_path),
        })
    }

    /// Preview a transient slider state (mid-drag) without touching history.
    pub fn preview_transient(&self, values: &SliderValues) -> Result<(), ApplicationError> {
        self.submit_for(values)
    }

    pub fn poll_preview(
        &self,
        _command: PollPreviewCommand,
    ) -> Result<Option<PreviewFrame>, ApplicationError> {
        self.preview.try_receive_preview()
    }

    pub fn preview_metrics(
        &self,
        _query: PreviewMetricsQuery,
    ) -> Result<PreviewMetrics, ApplicationError> {
        self.preview.metrics()
    }

    pub fn loaded_image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    pub fn edits(&self) -> &[EditInstruction] {
        self.history.edits()
    }

    pub fn slider_values(&self) -> SliderValues {
        self.history.slider_values()
    }

    pub fn filters(&self) -> Vec<ColorFilter> {
        compile_filters(&self.history.slider_values())
    }

    pub fn history_state(&self) -> HistoryState {
        HistoryState {
            edit_count: self.history.edits().len(),
            undo_depth: self.history.undo_depth(),
            redo_depth: self.history.redo_depth(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    fn require_image(&self) -> Result<&LoadedImage, ApplicationError> {
        self.image
            .as_ref()
            .ok_or_else(|| ApplicationError::NotFound("no image loaded in session".to_string()))
    }

    fn resubmit_preview(&self) -> Result<(), ApplicationError> {
        let values = self.history.slider_values();
        self.submit_for(&values)
    }

    fn submit_for(&self, values: &SliderValues) -> Result<(), ApplicationError> {
        let Some(image) = &self.image else {
            return Ok(());
        };
        let (width, height) = self.preview_size;
        if width == 0 || height == 0 {
            return Ok(());
        }

        let matrix = compose(&compile_filters(values));
        self.preview.submit_preview(PreviewRequest {
            source_path: image.path.clone(),
            matrix,
            target_width: width,
            target_height: height,
        })
    }
}
