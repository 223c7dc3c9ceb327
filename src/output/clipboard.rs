use arboard::Clipboard;

use crate::error::{AppError, AppResult};

pub struct ClipboardImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub struct ClipboardOutput;

trait ClipboardBackend {
    fn set_text(&mut self, text: String) -> Result<(), String>;
    fn get_image(&mut self) -> Result<Option<ClipboardImage>, String>;
}

struct ArboardClipboardBackend {
    inner: Clipboard,
}

impl ClipboardBackend for ArboardClipboardBackend {
    fn set_text(&mut self, text: String) -> Result<(), String> {
        self.inner.set_text(text).map_err(|error| error.to_string())
    }

    fn get_image(&mut self) -> Result<Option<ClipboardImage>, String> {
        match self.inner.get_image() {
            Ok(image) => {
                let width = u32::try_from(image.width)
                    .map_err(|_| "image width out of range".to_owned())?;
                let height = u32::try_from(image.height)
                    .map_err(|_| "image height out of range".to_owned())?;
                Ok(Some(ClipboardImage {
                    width,
                    height,
                    rgba: image.bytes.into_owned(),
                }))
            }
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(error) => Err(error.to_string()),
        }
    }
}

impl ClipboardOutput {
    pub fn write_text(text: &str) -> AppResult<()> {
        Self::write_text_with(text, Self::backend)
    }

    pub fn read_image() -> AppResult<ClipboardImage> {
        Self::read_image_with(Self::backend)
    }

    fn backend() -> AppResult<Box<dyn ClipboardBackend>> {
        let inner = Clipboard::new()
            .map_err(|error| AppError::Clipboard(format!("clipboard init failed: {error}")))?;
        Ok(Box::new(ArboardClipboardBackend { inner }) as Box<dyn ClipboardBackend>)
    }

    fn write_text_with<F>(text: &str, mut make_backend: F) -> AppResult<()>
    where
        F: FnMut() -> AppResult<Box<dyn ClipboardBackend>>,
    {
        let mut backend = make_backend()?;
        backend
            .set_text(text.to_owned())
            .map_err(|error| AppError::Clipboard(format!("clipboard write failed: {error}")))
    }

    fn read_image_with<F>(mut make_backend: F) -> AppResult<ClipboardImage>
    where
        F: FnMut() -> AppResult<Box<dyn ClipboardBackend>>,
    {
        let mut backend = make_backend()?;
        match backend.get_image() {
            Ok(Some(image)) => Ok(image),
            Ok(None) => Err(AppError::ClipboardEmpty),
            Err(error) => Err(AppError::Clipboard(format!(
                "clipboard read failed: {error}"
            ))),
        }
    }
}
