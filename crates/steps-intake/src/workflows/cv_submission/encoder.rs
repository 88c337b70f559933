use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::domain::AttachedFile;

/// Turns an attachment into text a reviewer can use without access to the object store.
#[derive(Debug, Clone, Copy)]
pub struct FileEncoder {
    inline_limit_bytes: usize,
}

impl FileEncoder {
    pub fn new(inline_limit_bytes: usize) -> Self {
        Self { inline_limit_bytes }
    }

    pub fn inline_limit_bytes(&self) -> usize {
        self.inline_limit_bytes
    }

    pub fn fits_inline(&self, file: &AttachedFile) -> bool {
        file.size() > 0 && file.size() <= self.inline_limit_bytes
    }

    /// Data URL when the file fits under the inline limit, otherwise a plain description.
    pub fn encode(&self, file: &AttachedFile) -> String {
        if !self.fits_inline(file) {
            return self.describe(file);
        }

        let mime = if file.content_type.trim().is_empty() {
            "application/octet-stream"
        } else {
            file.content_type.trim()
        };
        format!("data:{mime};base64,{}", STANDARD.encode(&file.bytes))
    }

    /// Text-only stand-in naming the file so staff can request it from the applicant.
    pub fn describe(&self, file: &AttachedFile) -> String {
        let name = if file.file_name.trim().is_empty() {
            "unnamed file"
        } else {
            file.file_name.trim()
        };
        let kind = if file.content_type.trim().is_empty() {
            "unknown type"
        } else {
            file.content_type.trim()
        };
        format!(
            "CV attachment '{name}' ({}, {kind}) could not be delivered. Please contact the applicant directly for their CV.",
            human_size(file.size())
        )
    }
}

pub(crate) fn human_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let value = bytes as f64;
    if value >= MIB {
        format!("{:.1} MB", value / MIB)
    } else if value >= KIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{bytes} bytes")
    }
}
