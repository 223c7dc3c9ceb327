use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;

use crate::bootstrap::AppPaths;
use crate::capture::{generate_filename, run_capture, CaptureMode, CaptureRequest};
use crate::compress::{compress_image, encode_rgba};
use crate::config::{store_api_key, AppConfig, ImageFormat};
use crate::error::AppResult;
use crate::history::HistoryStore;
use crate::output::{ClipboardImage, ClipboardOutput};
use crate::ui::{prompt_api_key, with_spinner, Notifier};
use crate::upload::UploadClient;

const SUPPORTED_SERVICE: &str = "ezhost";
const NOTIFY_TITLE: &str = "e-z.gg";
// Gives the compositor a moment to commit the clipboard selection before we
// read it, e.g. when the command fires from a hotkey.
const CLIPBOARD_SETTLE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub mode: CaptureMode,
    pub file_name: Option<String>,
    pub service: Option<String>,
}

/// Deletes the captured file once the upload attempt is over, whichever way
/// it went, when the user opted out of keeping shots on disk.
struct CaptureCleanup {
    path: Option<PathBuf>,
}

impl CaptureCleanup {
    fn new(path: &Path, save_to_disk: bool) -> Self {
        Self {
            path: (!save_to_disk).then(|| path.to_path_buf()),
        }
    }
}

impl Drop for CaptureCleanup {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if path.exists() {
                if let Err(error) = std::fs::remove_file(&path) {
                    tracing::warn!("failed to remove {}: {error}", path.display());
                }
            }
        }
    }
}

pub async fn capture_and_upload(
    config: &mut AppConfig,
    paths: &AppPaths,
    history: &HistoryStore,
    notifier: &Notifier,
    options: CaptureOptions,
) -> AppResult<()> {
    capture_and_upload_with(
        config,
        paths,
        history,
        notifier,
        options,
        |tool, request| async move { run_capture(&tool, &request).await },
        ClipboardOutput::write_text,
        prompt_api_key,
    )
    .await
}

async fn capture_and_upload_with<Cap, CapFut, W, P>(
    config: &mut AppConfig,
    paths: &AppPaths,
    history: &HistoryStore,
    notifier: &Notifier,
    options: CaptureOptions,
    capture: Cap,
    write_clipboard: W,
    prompt: P,
) -> AppResult<()>
where
    Cap: Fn(PathBuf, CaptureRequest) -> CapFut,
    CapFut: Future<Output = AppResult<()>>,
    W: Fn(&str) -> AppResult<()>,
    P: Fn() -> AppResult<String>,
{
    ensure_api_key(config, paths, &prompt)?;

    let file_name = match options.file_name {
        Some(name) => name,
        None => generate_filename(
            &config.save_directory,
            config.format().extension(),
            Local::now(),
        ),
    };
    let output_file = if config.save_to_disk {
        config.save_directory.join(&file_name)
    } else {
        PathBuf::from(&file_name)
    };

    let request = CaptureRequest {
        mode: options.mode,
        output_file: output_file.clone(),
    };
    with_spinner(
        "Capturing screenshot...",
        capture(config.capture_tool.clone(), request),
    )
    .await?;
    tracing::info!("screenshot captured to {}", output_file.display());
    if config.verbose {
        println!("Screenshot captured successfully");
    }

    // The capture already happened on purpose: region selection is the
    // user-visible part, the upload target is decided afterwards.
    if let Some(service) = options.service.as_deref() {
        if service != SUPPORTED_SERVICE {
            println!("Unsupported upload service: {service}");
            return Ok(());
        }
    }

    let _cleanup = CaptureCleanup::new(&output_file, config.save_to_disk);

    let bytes = std::fs::read(&output_file)?;
    let bytes = if config.compression_level > 0 {
        compress_image(&bytes, config.format(), config.compression_level)?
    } else {
        bytes
    };

    finish_upload(config, history, notifier, &write_clipboard, &file_name, bytes).await
}

pub async fn clipboard_upload(
    config: &mut AppConfig,
    paths: &AppPaths,
    history: &HistoryStore,
    notifier: &Notifier,
) -> AppResult<()> {
    tokio::time::sleep(CLIPBOARD_SETTLE).await;
    let image = ClipboardOutput::read_image()?;
    clipboard_upload_with(
        config,
        paths,
        history,
        notifier,
        image,
        ClipboardOutput::write_text,
        prompt_api_key,
    )
    .await
}

async fn clipboard_upload_with<W, P>(
    config: &mut AppConfig,
    paths: &AppPaths,
    history: &HistoryStore,
    notifier: &Notifier,
    image: ClipboardImage,
    write_clipboard: W,
    prompt: P,
) -> AppResult<()>
where
    W: Fn(&str) -> AppResult<()>,
    P: Fn() -> AppResult<String>,
{
    ensure_api_key(config, paths, &prompt)?;

    let png = encode_rgba(image.width, image.height, &image.rgba)?;
    let format = config.format();
    let bytes = if format != ImageFormat::Png || config.compression_level > 0 {
        compress_image(&png, format, config.compression_level)?
    } else {
        png
    };

    let file_name = generate_filename(&config.save_directory, format.extension(), Local::now());
    finish_upload(config, history, notifier, &write_clipboard, &file_name, bytes).await
}

async fn finish_upload<W>(
    config: &AppConfig,
    history: &HistoryStore,
    notifier: &Notifier,
    write_clipboard: &W,
    file_name: &str,
    bytes: Vec<u8>,
) -> AppResult<()>
where
    W: Fn(&str) -> AppResult<()>,
{
    let client = UploadClient::new(config.base_url.clone())?;
    let response = with_spinner(
        "Uploading...",
        client.upload(&config.api_key, file_name, config.format().mime(), bytes),
    )
    .await?;
    tracing::info!("file uploaded successfully");

    if config.verbose {
        println!("File uploaded successfully!");
        println!("File URL: {}", response.image_url_display());
        println!("Raw URL: {}", response.raw_url_display());
        println!("Delete URL: {}", response.deletion_url_display());
    }

    let url = response.selected_url(config.raw_file);
    write_clipboard(&url)?;
    println!("File URL copied to clipboard!");

    let uploaded_name = url.rsplit('/').next().unwrap_or(&url);
    notifier.notify(NOTIFY_TITLE, &format!("Successfully uploaded {uploaded_name}"))?;

    history.append(&url)?;
    Ok(())
}

fn ensure_api_key<P>(config: &mut AppConfig, paths: &AppPaths, prompt: &P) -> AppResult<()>
where
    P: Fn() -> AppResult<String>,
{
    if !config.api_key.trim().is_empty() {
        return Ok(());
    }

    let key = prompt()?;
    store_api_key(paths, config, key)?;
    tracing::info!("api key saved to {}", paths.config_file.display());
    Ok(())
}

pub fn show_history(history: &HistoryStore) -> AppResult<()> {
    let urls = history.list()?;
    if urls.is_empty() {
        println!("No upload history found.");
        return Ok(());
    }
    println!("Upload History:");
    for url in urls {
        println!("{url}");
    }
    Ok(())
}

pub fn clear_history(history: &HistoryStore) -> AppResult<()> {
    if history.clear()? {
        println!("Upload history cleared.");
    } else {
        println!("No upload history to clear.");
    }
    Ok(())
}
