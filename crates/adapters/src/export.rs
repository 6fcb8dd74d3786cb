//! Full-resolution export: bake the collapsed color matrix into the source
//! pixels and encode PNG or JPEG.

use std::fs;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::io::Reader as ImageReader;
use image::{ColorType, ImageEncoder, RgbImage};

use fotolab_application::{
    ApplicationError, ExportArtifact, ExportFormat, ExportRequest, ImageExporter,
};
use fotolab_domain::ColorMatrix;

#[derive(Debug, Default)]
pub struct ImageCrateExporter;

impl ImageExporter for ImageCrateExporter {
    fn export(&self, request: &ExportRequest) -> Result<ExportArtifact, ApplicationError> {
        if let ExportFormat::Jpeg { quality } = request.format {
            if quality == 0 || quality > 100 {
                return Err(ApplicationError::InvalidInput(format!(
                    "jpeg quality must be in 1..=100, got {quality}"
                )));
            }
        }

        let image = ImageReader::open(&request.source_path)
            .map_err(|error| ApplicationError::Io(error.to_string()))?
            .with_guessed_format()
            .map_err(|error| ApplicationError::Decode(error.to_string()))?
            .decode()
            .map_err(|error| ApplicationError::Decode(error.to_string()))?;

        let mut rgba = image.to_rgba8();
        if !request.matrix.is_identity() {
            bake_matrix(&mut rgba, &request.matrix);
        }
        let (width, height) = rgba.dimensions();

        let mut bytes = Vec::new();
        match request.format {
            ExportFormat::Png => {
                PngEncoder::new(&mut bytes)
                    .write_image(rgba.as_raw(), width, height, ColorType::Rgba8)
                    .map_err(|error| ApplicationError::Export(error.to_string()))?;
            }
            ExportFormat::Jpeg { quality } => {
                // JPEG carries no alpha channel.
                let mut rgb = RgbImage::new(width, height);
                for (x, y, pixel) in rgba.enumerate_pixels() {
                    rgb.put_pixel(x, y, image::Rgb([pixel[0], pixel[1], pixel[2]]));
                }
                JpegEncoder::new_with_quality(&mut bytes, quality)
                    .write_image(rgb.as_raw(), width, height, ColorType::Rgb8)
                    .map_err(|error| ApplicationError::Export(error.to_string()))?;
            }
        }

        if let Some(output_path) = &request.output_path {
            if let Some(parent) = Path::new(output_path).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .map_err(|error| ApplicationError::Io(error.to_string()))?;
                }
            }
            fs::write(output_path, &bytes)
                .map_err(|error| ApplicationError::Io(error.to_string()))?;
        }

        Ok(ExportArtifact {
            bytes,
            width,
            height,
            format: request.format,
            output_path: request.output_path.clone(),
        })
    }
}

fn bake_matrix(rgba: &mut image::RgbaImage, matrix: &ColorMatrix) {
    for pixel in rgba.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let out = matrix.transform_rgba([
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ]);
        pixel.0 = [
            quantize(out[0]),
            quantize(out[1]),
            quantize(out[2]),
            quantize(out[3]),
        ];
    }
}

fn quantize(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    use super::*;

    fn write_source(dir: &TempDir, color: [u8; 3]) -> String {
        let path = dir.path().join("source.png");
        let pixels = ImageBuffer::from_pixel(16, 8, Rgb(color));
        pixels.save(&path).expect("save png");
        path.to_string_lossy().to_string()
    }

    #[test]
    fn png_export_with_identity_matrix_preserves_pixels() {
        let dir = TempDir::new().expect("tempdir");
        let source_path = write_source(&dir, [120, 80, 40]);

        let artifact = ImageCrateExporter
            .export(&ExportRequest {
                source_path,
                matrix: ColorMatrix::identity(),
                format: ExportFormat::Png,
                output_path: None,
            })
            .expect("export should work");

        assert_eq!(artifact.width, 16);
        assert_eq!(artifact.height, 8);
        let decoded = image::load_from_memory(&artifact.bytes).expect("decode exported bytes");
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0).0, [120, 80, 40, 255]);
    }

    #[test]
    fn brightness_matrix_lightens_exported_pixels() {
        let dir = TempDir::new().expect("tempdir");
        let source_path = write_source(&dir, [100, 100, 100]);

        let artifact = ImageCrateExporter
            .export(&ExportRequest {
                source_path,
                matrix: ColorMatrix::brightness(0.5),
                format: ExportFormat::Png,
                output_path: None,
            })
            .expect("export should work");

        let decoded = image::load_from_memory(&artifact.bytes).expect("decode");
        assert_eq!(decoded.to_rgba8().get_pixel(4, 4).0, [150, 150, 150, 255]);
    }

    #[test]
    fn jpeg_export_writes_the_requested_file() {
        let dir = TempDir::new().expect("tempdir");
        let source_path = write_source(&dir, [10, 200, 90]);
        let output_path = dir
            .path()
            .join("out")
            .join("edited.jpg")
            .to_string_lossy()
            .to_string();

        let artifact = ImageCrateExporter
            .export(&ExportRequest {
                source_path,
                matrix: ColorMatrix::identity(),
                format: ExportFormat::Jpeg { quality: 92 },
                output_path: Some(output_path.clone()),
            })
            .expect("export should work");

        assert_eq!(artifact.output_path.as_deref(), Some(output_path.as_str()));
        let written = std::fs::read(&output_path).expect("written file");
        assert_eq!(written, artifact.bytes);
        // JFIF magic
        assert_eq!(&written[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn lower_jpeg_quality_produces_smaller_output() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("noise.png");
        let pixels = ImageBuffer::from_fn(64, 64, |x, y| {
            Rgb([
                (x * 13 % 251) as u8,
                (y * 31 % 241) as u8,
                ((x + y) * 7 % 239) as u8,
            ])
        });
        pixels.save(&path).expect("save png");
        let source_path = path.to_string_lossy().to_string();

        let high = ImageCrateExporter
            .export(&ExportRequest {
                source_path: source_path.clone(),
                matrix: ColorMatrix::identity(),
                format: ExportFormat::Jpeg { quality: 95 },
                output_path: None,
            })
            .expect("export high");
        let low = ImageCrateExporter
            .export(&ExportRequest {
                source_path,
                matrix: ColorMatrix::identity(),
                format: ExportFormat::Jpeg { quality: 20 },
                output_path: None,
            })
            .expect("export low");

        assert!(low.bytes.len() < high.bytes.len());
    }

    #[test]
    fn zero_quality_is_rejected() {
        let result = ImageCrateExporter.export(&ExportRequest {
            source_path: "missing.png".to_string(),
            matrix: ColorMatrix::identity(),
            format: ExportFormat::Jpeg { quality: 0 },
            output_path: None,
        });
        assert!(matches!(result, Err(ApplicationError::InvalidInput(_))));
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let result = ImageCrateExporter.export(&ExportRequest {
            source_path: "definitely-missing.png".to_string(),
            matrix: ColorMatrix::identity(),
            format: ExportFormat::Png,
            output_path: None,
        });
        assert!(matches!(result, Err(ApplicationError::Io(_))));
    }
}
