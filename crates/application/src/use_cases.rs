use fotolab_domain::EditInstruction;

use crate::ExportFormat;

#[derive(Debug, Clone)]
pub struct OpenImageCommand {
    pub path: String,
    /// Preview canvas size. Zero in either dimension disables preview
    /// submission for the session (headless CLI use).
    pub preview_width: u32,
    pub preview_height: u32,
}

#[derive(Debug, Clone)]
pub struct ApplyEditsCommand {
    pub edits: Vec<EditInstruction>,
}

#[derive(Debug, Clone, Default)]
pub struct UndoCommand;

#[derive(Debug, Clone, Default)]
pub struct RedoCommand;

#[derive(Debug, Clone)]
pub struct SuggestEditsCommand {
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct ApplyPromptCommand {
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct ExportImageCommand {
    pub format: ExportFormat,
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PollPreviewCommand;

#[derive(Debug, Clone, Default)]
pub struct PreviewMetricsQuery;
