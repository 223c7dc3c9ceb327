use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Partial,
    Fullscreen,
    Window,
}

impl CaptureMode {
    pub fn tool_target(self) -> &'static str {
        match self {
            CaptureMode::Partial => "area",
            CaptureMode::Fullscreen => "screen",
            CaptureMode::Window => "active",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub mode: CaptureMode,
    pub output_file: PathBuf,
}

/// Runs `<tool> save <target> <output>` and checks that the tool actually
/// produced a file. A cancelled region selection surfaces here as a
/// non-zero exit from the tool.
pub async fn run_capture(tool: &Path, request: &CaptureRequest) -> AppResult<()> {
    if let Some(parent) = request.output_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tool = tool.to_path_buf();
    let target = request.mode.tool_target();
    let output_file = request.output_file.clone();
    tracing::debug!("running {} save {target} {}", tool.display(), output_file.display());

    let output = tokio::task::spawn_blocking(move || {
        Command::new(&tool)
            .arg("save")
            .arg(target)
            .arg(&output_file)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
    })
    .await
    .map_err(|error| AppError::Capture(format!("capture task failed to join: {error}")))?
    .map_err(|error| AppError::Capture(format!("failed to run capture tool: {error}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Capture(format!(
            "capture tool exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let produced = std::fs::metadata(&request.output_file)
        .map(|meta| meta.len() > 0)
        .unwrap_or(false);
    if !produced {
        return Err(AppError::Capture(format!(
            "capture tool reported success but wrote nothing to {}",
            request.output_file.display()
        )));
    }

    Ok(())
}
