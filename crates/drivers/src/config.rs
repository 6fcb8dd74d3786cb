#[derive(Debug, Clone)]
pub struct AppConfig {
    pub export_dir: String,
    pub jpeg_quality: u8,
    pub window_width: usize,
    pub window_height: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_dir: "exports".to_string(),
            jpeg_quality: 92,
            window_width: 1080,
            window_height: 720,
        }
    }
}
