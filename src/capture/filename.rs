use std::path::Path;

use chrono::{DateTime, Local};

/// Names shots `screenshot_HH:MM.<ext>`; when that name is already taken in
/// the save directory the seconds are appended so back-to-back shots within
/// a minute stay distinct.
pub fn generate_filename(save_directory: &Path, extension: &str, now: DateTime<Local>) -> String {
    let short = format!("screenshot_{}.{extension}", now.format("%H:%M"));
    if save_directory.join(&short).exists() {
        return format!("screenshot_{}.{extension}", now.format("%H:%M:%S"));
    }
    short
}
