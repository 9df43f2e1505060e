// region:    --- Imports
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::info;
// endregion: --- Imports

// region:    --- Image Storage
const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Keeps filenames shell- and path-safe: strips any directory components and
/// replaces everything outside [A-Za-z0-9._-] with an underscore.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Timestamp prefix avoids collisions between uploads with the same name.
pub fn stamped_filename(filename: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}{}",
        now.format("%Y%m%d_%H%M%S_"),
        sanitize_filename(filename)
    )
}

/// Writes an uploaded image under `dir` and returns the stored filename.
pub async fn save_image(dir: &Path, filename: &str, bytes: &[u8]) -> Result<String, ApiError> {
    if !allowed_file(filename) {
        return Err(ApiError::Upload(
            "images only (png, jpg, jpeg, gif)".to_string(),
        ));
    }
    let stored = stamped_filename(filename, Utc::now());
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(&stored), bytes).await?;
    info!("{:<12} --> Saved image {}", "Uploads", stored);
    Ok(stored)
}
// endregion: --- Image Storage
