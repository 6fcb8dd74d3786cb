pub mod ai;
pub mod clock;
pub mod export;
pub mod metadata;
pub mod presenters;
pub mod preview;

pub use ai::MockEditAnalyzer;
pub use clock::SystemClock;
pub use export::ImageCrateExporter;
pub use metadata::ExifMetadataReader;
pub use preview::BackgroundPreviewPipeline;

use std::path::Path;

use fotolab_application::{ApplicationError, ImageDecoder};
use fotolab_domain::{detect_image_kind, DecodedImage, ImageKind};

#[derive(Debug, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode_for_preview(&self, path: &Path) -> Result<DecodedImage, ApplicationError> {
        match detect_image_kind(path) {
            kind @ (ImageKind::Jpeg | ImageKind::Png) => {
                let image = image::io::Reader::open(path)
                    .map_err(|error| ApplicationError::Decode(error.to_string()))?
                    .with_guessed_format()
                    .map_err(|error| ApplicationError::Decode(error.to_string()))?
                    .decode()
                    .map_err(|error| ApplicationError::Decode(error.to_string()))?;

                Ok(DecodedImage {
                    width: image.width(),
                    height: image.height(),
                    kind,
                })
            }
            ImageKind::Unsupported => Err(ApplicationError::Decode(format!(
                "unsupported image format: {:?}",
                path
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    #[test]
    fn decodes_dimensions_of_a_jpeg() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("sample.jpg");
        let pixels = ImageBuffer::from_pixel(320, 200, Rgb([90_u8, 60_u8, 30_u8]));
        pixels.save(&path).expect("save jpeg");

        let decoded = ImageCrateDecoder
            .decode_for_preview(&path)
            .expect("decode should work");
        assert_eq!(decoded.width, 320);
        assert_eq!(decoded.height, 200);
        assert_eq!(decoded.kind, ImageKind::Jpeg);
    }

    #[test]
    fn rejects_unsupported_extensions() {
        let result = ImageCrateDecoder.decode_for_preview(Path::new("clip.mp4"));
        assert!(matches!(result, Err(ApplicationError::Decode(_))));
    }
}
