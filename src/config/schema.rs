use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub base_url: String,
    pub capture_tool: PathBuf,
    pub api_key: String,
    pub compression_level: u8,
    pub save_to_disk: bool,
    pub save_directory: PathBuf,
    pub default_service: String,
    pub image_format: String,
    pub verbose: bool,
    pub raw_file: bool,
    pub notify: bool,
    pub annotation_font: String,
    pub annotation_color: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.e-z.host/files".to_owned(),
            capture_tool: PathBuf::from("/usr/bin/grimblast"),
            api_key: String::new(),
            compression_level: 0,
            save_to_disk: true,
            save_directory: default_save_directory(),
            default_service: "ezhost".to_owned(),
            image_format: "png".to_owned(),
            verbose: false,
            raw_file: false,
            notify: true,
            annotation_font: "fonts/Inter-Regular.ttf".to_owned(),
            annotation_color: "white".to_owned(),
        }
    }
}

impl AppConfig {
    pub fn format(&self) -> ImageFormat {
        ImageFormat::from_name(&self.image_format).unwrap_or(ImageFormat::Png)
    }
}

fn default_save_directory() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join("Screenshots"))
        .unwrap_or_else(|| PathBuf::from("Screenshots"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }
}
