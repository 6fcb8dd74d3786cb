mod edit;
mod error;
mod filter;
mod history;
mod image;
mod preview;

pub use edit::{AdjustmentKind, AnalysisReport, EditInstruction, SliderValues};
pub use error::DomainError;
pub use filter::{compile_filters, compose, ColorFilter, ColorMatrix, LUMA_B, LUMA_G, LUMA_R};
pub use history::EditHistory;
pub use image::{detect_image_kind, DecodedImage, ImageKind};
pub use preview::{PreviewFrame, PreviewMetrics, PreviewRequest};
