use std::path::Path;

use crate::models::{MediaFile, MediaKind};

pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "png", "jpeg", "bmp", "tif"];
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];

/// Classify a path by its extension (case-insensitive).
///
/// Returns `None` for anything outside the recognized image/video set.
pub fn classify(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else {
        None
    }
}

/// List the recognized media files directly inside `input_dir`.
///
/// Not recursive. Entries come back in directory iteration order.
pub fn list_media(input_dir: &Path) -> std::io::Result<Vec<MediaFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(kind) = classify(&path) {
            files.push(MediaFile { path, kind });
        }
    }
    tracing::debug!(dir = %input_dir.display(), count = files.len(), "listed media");
    Ok(files)
}
