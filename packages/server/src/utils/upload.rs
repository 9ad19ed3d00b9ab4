use crate::config::SubmissionConfig;

/// File classes accepted for competition entries. Videos get a larger size
/// ceiling than everything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileClass {
    Image,
    Document,
    Video,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm"];

/// Classify a lowercase extension against the allow-list.
pub fn classify_extension(extension: &str) -> Option<FileClass> {
    if IMAGE_EXTENSIONS.contains(&extension) {
        Some(FileClass::Image)
    } else if DOCUMENT_EXTENSIONS.contains(&extension) {
        Some(FileClass::Document)
    } else if VIDEO_EXTENSIONS.contains(&extension) {
        Some(FileClass::Video)
    } else {
        None
    }
}

/// Extract the lowercase extension of an uploaded filename.
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Per-file ceiling for a class.
pub fn max_bytes_for(class: FileClass, config: &SubmissionConfig) -> u64 {
    match class {
        FileClass::Video => config.max_video_bytes,
        FileClass::Image | FileClass::Document => config.max_file_bytes,
    }
}

/// Validate an uploaded filename (flat name, sane length).
pub fn validate_filename(filename: &str) -> Result<&str, &'static str> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err("Filename cannot be empty");
    }
    if trimmed.chars().count() > 255 {
        return Err("Filename is too long");
    }
    if trimmed.contains('\0') || trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err("Invalid filename: control characters are not allowed");
    }
    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err("Invalid filename: path separators are not allowed");
    }
    if trimmed.starts_with('.') {
        return Err("Invalid filename: hidden files are not allowed");
    }

    Ok(trimmed)
}
