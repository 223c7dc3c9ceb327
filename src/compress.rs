use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;

use crate::config::ImageFormat;
use crate::error::{AppError, AppResult};

/// Re-encodes captured image bytes. For jpeg the level maps straight onto
/// encoder quality; webp and png have no lossy knob here, so they get a
/// structural re-encode that drops whatever the capture tool left behind.
pub fn compress_image(data: &[u8], format: ImageFormat, level: u8) -> AppResult<Vec<u8>> {
    let decoded = image::load_from_memory(data)
        .map_err(|error| AppError::Encode(format!("decode captured image: {error}")))?;

    let mut output = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let rgb = decoded.to_rgb8();
            // Level 0 means format conversion only, at the encoder default.
            let encoder = if level == 0 {
                JpegEncoder::new(&mut output)
            } else {
                JpegEncoder::new_with_quality(&mut output, level.clamp(1, 100))
            };
            encoder
                .encode(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ColorType::Rgb8.into(),
                )
                .map_err(|error| AppError::Encode(format!("encode jpeg: {error}")))?;
        }
        ImageFormat::Webp => {
            let rgba = decoded.to_rgba8();
            WebPEncoder::new_lossless(&mut output)
                .encode(
                    rgba.as_raw(),
                    rgba.width(),
                    rgba.height(),
                    image::ColorType::Rgba8.into(),
                )
                .map_err(|error| AppError::Encode(format!("encode webp: {error}")))?;
        }
        ImageFormat::Png => {
            decoded
                .write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)
                .map_err(|error| AppError::Encode(format!("encode png: {error}")))?;
        }
    }
    Ok(output)
}

pub fn encode_rgba(width: u32, height: u32, rgba: &[u8]) -> AppResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(width, height, rgba.to_vec()).ok_or_else(|| {
        AppError::Encode("clipboard pixel buffer does not match its dimensions".to_owned())
    })?;
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(|error| AppError::Encode(format!("encode clipboard image: {error}")))?;
    Ok(buffer.into_inner())
}
