use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Unsupported,
}

/// Dimensions and detected kind of a decoded source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub kind: ImageKind,
}

pub fn detect_image_kind(path: &Path) -> ImageKind {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return ImageKind::Unsupported;
    };

    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => ImageKind::Jpeg,
        "png" => ImageKind::Png,
        _ => ImageKind::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_kind_detection_works() {
        assert_eq!(detect_image_kind(Path::new("a.jpg")), ImageKind::Jpeg);
        assert_eq!(detect_image_kind(Path::new("a.PNG")), ImageKind::Png);
        assert_eq!(
            detect_image_kind(Path::new("a.webp")),
            ImageKind::Unsupported
        );
        assert_eq!(detect_image_kind(Path::new("a")), ImageKind::Unsupported);
    }
}
